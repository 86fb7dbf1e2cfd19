//! Verify command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::verifier::Verifier;
use anyhow::Result;

/// Run the verify command.
pub async fn run_verify(
    claim: &str,
    json: bool,
    model: Option<String>,
    mut settings: Settings,
) -> Result<()> {
    if claim.trim().is_empty() {
        anyhow::bail!("Claim is required");
    }

    if let Err(e) = preflight::check(Operation::Verify, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'veritas doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    if let Some(model) = model {
        settings.model.model = model;
    }

    let verifier = Verifier::new(&settings)?;

    let spinner = Output::spinner("Verifying claim...");
    let outcome = verifier.verify_claim(claim).await;
    spinner.finish_and_clear();

    match outcome {
        Ok(verification) => {
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&verification.result.to_wire())?
                );
                return Ok(());
            }

            Output::verification(&verification.result);

            if let Some(call) = &verification.tool_call {
                Output::info(&format!(
                    "Searched for \"{}\" ({} result(s))",
                    call.item_name,
                    call.result_urls.len()
                ));
            }
            for deviation in &verification.deviations {
                Output::warning(&format!("Model output adjusted: {}", deviation));
            }
        }
        Err(e) => {
            Output::error(&format!("Verification failed: {}", e.public_message()));
            return Err(e.into());
        }
    }

    Ok(())
}
