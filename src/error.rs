use thiserror::Error;

use crate::pricing::PricingError;

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Pricing error: {0}")]
    Pricing(#[from] PricingError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    #[error("Session expired")]
    AuthExpired,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Config error: {0}")]
    Config(String),
}

impl ConsoleError {
    /// Text shown in the toast/banner for a failed operation.
    pub fn user_message(&self) -> String {
        match self {
            ConsoleError::Backend { status, message } => {
                if message.trim().is_empty() {
                    status_message(*status)
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("HTTP {}", status))
                } else {
                    message.clone()
                }
            }
            ConsoleError::AuthExpired => "Token expired. Please login again.".to_string(),
            ConsoleError::InvalidCredentials => "Email or password incorrect".to_string(),
            ConsoleError::Http(_) => "Network error. Please try again.".to_string(),
            other => other.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ConsoleError::Backend { status, .. } => Some(*status),
            ConsoleError::AuthExpired => Some(401),
            ConsoleError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Fallback messages for error responses without a readable body.
pub fn status_message(status: u16) -> Option<&'static str> {
    match status {
        400 => Some("Bad request. Please check your input."),
        401 => Some("Unauthorized. Please login again."),
        403 => Some("Access forbidden. Please check your permissions."),
        404 => Some("Resource not found"),
        500 => Some("Internal server error. Please try again later."),
        _ => None,
    }
}

pub type Result<T> = std::result::Result<T, ConsoleError>;
