//! CLI command implementations.

mod config;
mod doctor;
mod serve;
mod verify;

pub use config::run_config;
pub use doctor::run_doctor;
pub use serve::{router, run_serve, AppState};
pub use verify::run_verify;
