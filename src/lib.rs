pub mod api;
pub mod config;
pub mod console;
pub mod dashboard;
pub mod error;
pub mod http_client;
pub mod notify;
pub mod pricing;
pub mod session;
pub mod store;
pub mod subscription;
pub mod toggle;
pub mod users;

pub use console::Console;
pub use error::{ConsoleError, Result};
