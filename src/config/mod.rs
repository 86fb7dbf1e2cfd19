//! Configuration module for Veritas.
//!
//! Handles loading application settings and holds the verification prompt.

mod prompts;
mod settings;

pub use prompts::{render_verification_prompt, VERIFICATION_PROMPT, VERIFICATION_PROMPT_VERSION};
pub use settings::{
    resolve_key, GeneralSettings, ModelSettings, SearchSettings, ServerSettings, Settings,
    MAX_SEARCH_RESULTS,
};
