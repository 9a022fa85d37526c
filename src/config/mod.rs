pub mod settings;

pub use settings::{API_URL_ENV, ApiConfig, LoggingConfig, SessionConfig, Settings};
