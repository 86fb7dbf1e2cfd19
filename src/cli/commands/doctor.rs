//! Doctor command - verify API keys and configuration.

use crate::cli::Output;
use crate::config::{resolve_key, Settings, MAX_SEARCH_RESULTS};
use console::style;
use std::path::Path;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings, config_path: &Path) -> anyhow::Result<()> {
    Output::header("Veritas Doctor");
    println!();
    println!("Checking API keys and configuration...\n");

    let mut checks = Vec::new();

    println!("{}", style("Reasoning Model").bold());
    let model_checks = vec![
        check_api_key(settings.model.api_key.as_deref(), &settings.model.api_key_env),
        CheckResult::ok("Model", &settings.model.model),
        CheckResult::ok("Endpoint", &settings.model.api_base),
    ];
    for check in &model_checks {
        check.print();
    }
    checks.extend(model_checks);

    println!();

    println!("{}", style("Web Search").bold());
    let search_checks = vec![
        check_api_key(settings.search.api_key.as_deref(), &settings.search.api_key_env),
        check_provider(&settings.search.provider),
        check_max_results(settings.search.max_results),
    ];
    for check in &search_checks {
        check.print();
    }
    checks.extend(search_checks);

    println!();

    println!("{}", style("Configuration").bold());
    let config_check = check_config_file(config_path);
    config_check.print();
    checks.push(config_check);

    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before verifying claims.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Veritas is ready to verify claims.");
    }

    Ok(())
}

/// Check that an API key resolves, showing it masked.
fn check_api_key(inline: Option<&str>, env_var: &str) -> CheckResult {
    let source = if inline.is_some_and(|k| !k.trim().is_empty()) {
        "config"
    } else {
        "env"
    };

    match resolve_key(inline, env_var) {
        Ok(key) => CheckResult::ok(
            env_var,
            &format!("configured via {} ({})", source, mask_key(&key)),
        ),
        Err(e) => CheckResult::error(
            env_var,
            &e.to_string(),
            &format!("Set with: export {}='...'", env_var),
        ),
    }
}

fn check_provider(provider: &str) -> CheckResult {
    if provider.eq_ignore_ascii_case("tavily") {
        CheckResult::ok("Provider", provider)
    } else {
        CheckResult::error(
            "Provider",
            &format!("unsupported provider '{}'", provider),
            "Set search.provider = \"tavily\"",
        )
    }
}

fn check_max_results(max_results: usize) -> CheckResult {
    if (1..=MAX_SEARCH_RESULTS).contains(&max_results) {
        CheckResult::ok("Max results", &max_results.to_string())
    } else {
        CheckResult::warning(
            "Max results",
            &format!("{} (clamped to 1..={})", max_results, MAX_SEARCH_RESULTS),
            "Set search.max_results between 1 and 3",
        )
    }
}

fn check_config_file(config_path: &Path) -> CheckResult {
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: veritas config init",
        )
    }
}

/// Mask all but the ends of a key.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}
