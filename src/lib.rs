//! docshift
//!
//! Upload service for Word exercise documents: converts them into an Excel
//! workbook of exercises and questions, or into a zip of their code files,
//! and serves the upload page that drives both.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;
pub mod ui;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use handlers::create_router;
pub use state::AppState;
