//! Veritas - crisis claim verification
//!
//! Fact-checks claims circulating during emergencies with a reasoning model
//! that may run a single web search before answering.
//!
//! # Overview
//!
//! Veritas allows you to:
//! - Verify a claim from the command line or over HTTP
//! - Get a typed verdict with confidence, summary, and public guidance
//! - See which sources the verdict rests on
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management and the verification prompt
//! - `search` - Web search provider abstraction (Tavily)
//! - `agent` - Tool-augmented conversation loop
//! - `verification` - Result types and model output normalization
//! - `verifier` - Claim in, verification out
//!
//! # Example
//!
//! ```rust,no_run
//! use veritas::config::Settings;
//! use veritas::verifier::Verifier;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load_from(None)?;
//!     let verifier = Verifier::new(&settings)?;
//!
//!     let verification = verifier
//!         .verify_claim("The Main Street bridge is closed due to flooding")
//!         .await?;
//!     println!("{}", verification.result.status);
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod config;
pub mod error;
pub mod openai;
pub mod search;
pub mod verification;
pub mod verifier;

#[cfg(test)]
mod testing;

pub use error::{Result, VeritasError};
