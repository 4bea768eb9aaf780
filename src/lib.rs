//! MediDoc document structuring service
//!
//! A Rust service that turns uploaded PDF documents into structured JSON:
//! text is extracted page by page, forwarded to a hosted chat-completion
//! model with a fixed extraction instruction, and the model's output is
//! normalized so the caller always receives valid JSON.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod state;
pub mod testing;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use state::AppState;
