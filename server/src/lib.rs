//! HTTP relay that creates Google Docs and Sheets on behalf of users signed
//! in through Google OAuth.

pub mod api;
pub mod app;
pub mod config;
pub mod drive;
pub mod error;

pub use app::{build_router, AppState};
pub use config::Config;
