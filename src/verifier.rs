//! Claim verification entry point.
//!
//! Wires the agent loop to the normalizer: claim in, typed verification out.

use crate::agent::{AgentLoop, ConversationModel, OpenAIChatModel, ToolCallRecord};
use crate::config::Settings;
use crate::error::{Result, VeritasError};
use crate::search::{create_provider, SearchProvider};
use crate::verification::{normalize, EnumDeviation, VerificationResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Outcome of verifying one claim.
#[derive(Debug, Clone, Serialize)]
pub struct Verification {
    pub result: VerificationResult,
    /// Enum fields that fell back to a default.
    pub deviations: Vec<EnumDeviation>,
    pub tool_call: Option<ToolCallRecord>,
    pub round_trips: usize,
    pub checked_at: DateTime<Utc>,
}

/// Verifies claims with a reasoning model and web search.
///
/// Cheap to share: every call opens its own session.
pub struct Verifier {
    agent: AgentLoop,
}

impl Verifier {
    /// Create a verifier from settings.
    pub fn new(settings: &Settings) -> Result<Self> {
        let model = Arc::new(OpenAIChatModel::from_settings(&settings.model)?);
        let search = create_provider(&settings.search)?;
        info!(
            "Using model {} with {} search",
            settings.model.model,
            search.name()
        );
        Ok(Self::with_components(model, search)
            .with_max_results(settings.search.effective_max_results()))
    }

    /// Create a verifier with custom components.
    pub fn with_components(
        model: Arc<dyn ConversationModel>,
        search: Arc<dyn SearchProvider>,
    ) -> Self {
        Self {
            agent: AgentLoop::new(model, search),
        }
    }

    pub fn with_max_results(mut self, max: usize) -> Self {
        self.agent = self.agent.with_max_results(max);
        self
    }

    /// Verify a claim.
    ///
    /// The returned `claim` is always the input verbatim. Blank claims are
    /// rejected before any model call.
    #[instrument(skip(self, claim), fields(claim_len = claim.len()))]
    pub async fn verify_claim(&self, claim: &str) -> Result<Verification> {
        if claim.trim().is_empty() {
            return Err(VeritasError::InvalidInput("Claim is required".to_string()));
        }

        let outcome = self.agent.run(claim).await?;

        let normalized = normalize(&outcome.text).map_err(|e| {
            warn!(
                "Model output rejected ({}): {}; snippet: {}",
                e.kind(),
                e,
                e.snippet().unwrap_or_default()
            );
            e
        })?;

        let mut result = normalized.result;
        if result.claim != claim {
            warn!("Model altered the claim text; keeping the submitted claim");
            result.claim = claim.to_string();
        }

        info!(
            "Verified claim: status={}, confidence={}, {} source(s)",
            result.status,
            result.confidence,
            result.sources.len()
        );

        Ok(Verification {
            result,
            deviations: normalized.deviations,
            tool_call: outcome.tool_call,
            round_trips: outcome.round_trips,
            checked_at: Utc::now(),
        })
    }
}
