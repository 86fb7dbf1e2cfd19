//! Pre-flight checks before verifications.
//!
//! Fails fast when an API key is missing instead of letting the first
//! verification fail midway.

use crate::config::{resolve_key, Settings};
use crate::error::Result;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Verification needs both the model and the search key.
    Verify,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Verify => {
            resolve_key(settings.model.api_key.as_deref(), &settings.model.api_key_env)?;
            resolve_key(settings.search.api_key.as_deref(), &settings.search.api_key_env)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_with_inline_keys() {
        let mut settings = Settings::default();
        settings.model.api_key = Some("model-key".to_string());
        settings.search.api_key = Some("search-key".to_string());
        assert!(check(Operation::Verify, &settings).is_ok());
    }

    #[test]
    fn test_verify_missing_search_key() {
        let mut settings = Settings::default();
        settings.model.api_key = Some("model-key".to_string());
        settings.search.api_key_env = "VERITAS_TEST_MISSING_SEARCH_KEY".to_string();
        let err = check(Operation::Verify, &settings).unwrap_err();
        assert!(err.to_string().contains("VERITAS_TEST_MISSING_SEARCH_KEY"));
    }
}
