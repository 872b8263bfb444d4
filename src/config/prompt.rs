use std::error::Error;
use std::fmt;
use std::fs;
use std::path::{ Path, PathBuf };
use std::sync::Arc;
use log::info;

#[derive(Debug)]
pub enum PromptError {
    Empty(PathBuf),
    IoError(PathBuf, std::io::Error),
}

impl fmt::Display for PromptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptError::Empty(path) =>
                write!(f, "System prompt file '{}' is empty", path.display()),
            PromptError::IoError(path, e) =>
                write!(f, "Failed to read system prompt file '{}': {}", path.display(), e),
        }
    }
}

impl Error for PromptError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PromptError::IoError(_, e) => Some(e),
            PromptError::Empty(_) => None,
        }
    }
}

/// Fixed system instruction sent with every completion. Loaded once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemPrompt {
    text: String,
}

impl SystemPrompt {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PromptError> {
        let path = path.as_ref();
        let text = fs
            ::read_to_string(path)
            .map_err(|e| PromptError::IoError(path.to_path_buf(), e))?;
        if text.trim().is_empty() {
            return Err(PromptError::Empty(path.to_path_buf()));
        }
        info!("Loaded system prompt from {} ({} bytes)", path.display(), text.len());
        Ok(Self { text })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

pub fn load_system_prompt(path: &str) -> Result<Arc<SystemPrompt>, Box<dyn Error + Send + Sync>> {
    Ok(Arc::new(SystemPrompt::load(path)?))
}
