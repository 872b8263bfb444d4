use crate::cli::ChatArgs;
use crate::client::render::{ render_message, LOADING_INDICATOR };
use crate::client::{ ChatSession, ChatState, ChatTransport, ClientError, HttpTransport };

use futures::future::OptionFuture;
use log::{ error, info, warn };
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{ AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader };
use tokio::task::JoinHandle;

const QUIT_COMMAND: &str = "/quit";
const BUSY_NOTICE: &str = "(still waiting for the previous reply, input ignored)";
const INVALID_INPUT_NOTICE: &str = "(input is not valid UTF-8, line ignored)";

pub async fn run(args: &ChatArgs) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut transport = HttpTransport::new(&args.proxy_url, args.timeout_secs.map(Duration::from_secs))?;
    if let Some(health_url) = &args.health_url {
        transport = transport.with_health_url(health_url)?;
    }
    match transport.health().await {
        Ok(()) => info!("Connected to proxy at {}", transport.endpoint()),
        Err(e) => warn!("Proxy health check failed ({}), continuing anyway", e),
    }

    let input = BufReader::new(tokio::io::stdin());
    let mut output = tokio::io::stdout();
    run_session(input, &mut output, Arc::new(transport)).await?;
    Ok(())
}

/// Reads one utterance per line until EOF or `/quit`. The outbound request runs
/// in its own task so input keeps flowing; lines typed meanwhile are dropped.
pub async fn run_session<R, W>(
    input: R,
    output: &mut W,
    transport: Arc<dyn ChatTransport>
) -> std::io::Result<ChatSession>
    where R: AsyncBufRead + Unpin, W: AsyncWrite + Unpin
{
    let mut session = ChatSession::new();
    let mut segments = input.split(b'\n');
    let mut pending: Option<JoinHandle<Result<String, ClientError>>> = None;
    let mut input_closed = false;
    let mut printed = 0;

    emit(output, &session.render()).await?;

    while !input_closed || pending.is_some() {
        tokio::select! {
            segment = segments.next_segment(), if !input_closed => {
                let segment = match segment {
                    Ok(segment) => segment,
                    Err(e) => {
                        error!("Failed to read input: {}", e);
                        if let Some(handle) = pending.take() {
                            session.resolve(settle(handle).await);
                            flush_new(output, &session, printed).await?;
                        }
                        return Err(e);
                    }
                };
                let Some(bytes) = segment else {
                    input_closed = true;
                    continue;
                };
                let line = match String::from_utf8(bytes) {
                    Ok(line) => line,
                    Err(e) => {
                        warn!("Skipping input line that is not valid UTF-8: {}", e);
                        emit(output, INVALID_INPUT_NOTICE).await?;
                        continue;
                    }
                };
                let line = line.trim_end_matches('\r');

                if line.trim() == QUIT_COMMAND {
                    input_closed = true;
                } else {
                    let was_busy = session.state() == ChatState::AwaitingResponse;
                    match session.submit(line) {
                        Some(utterance) => {
                            let transport = transport.clone();
                            pending = Some(tokio::spawn(async move {
                                transport.send(&utterance).await
                            }));
                        }
                        None if was_busy && !line.trim().is_empty() => {
                            emit(output, BUSY_NOTICE).await?;
                        }
                        None => {}
                    }
                }
            }
            Some(joined) = OptionFuture::from(pending.as_mut()), if pending.is_some() => {
                pending = None;
                session.resolve(joined.map_err(ClientError::from).and_then(|outcome| outcome));
            }
        }

        printed = flush_new(output, &session, printed).await?;
    }

    Ok(session)
}

async fn settle(handle: JoinHandle<Result<String, ClientError>>) -> Result<String, ClientError> {
    handle.await.map_err(ClientError::from).and_then(|outcome| outcome)
}

/// Prints messages appended since `printed`, plus the loading line while awaiting.
async fn flush_new<W: AsyncWrite + Unpin>(
    output: &mut W,
    session: &ChatSession,
    printed: usize
) -> std::io::Result<usize> {
    for message in &session.store().messages()[printed..] {
        emit(output, &render_message(message)).await?;
    }
    if session.store().len() > printed && session.state() == ChatState::AwaitingResponse {
        emit(output, LOADING_INDICATOR).await?;
    }
    Ok(session.store().len())
}

async fn emit<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> std::io::Result<()> {
    output.write_all(text.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await
}

