//! CLI output formatting utilities.

use crate::verification::{Verdict, VerificationResult};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(msg: &str) {
        println!("  {} {}", style("*").cyan(), msg);
    }

    /// Print a verification report.
    pub fn verification(result: &VerificationResult) {
        let presented = result.present();
        let verdict = match presented.verdict {
            Verdict::True => style(result.status.as_str()).green().bold(),
            Verdict::False => style(result.status.as_str()).red().bold(),
            Verdict::PartiallyTrue => style(result.status.as_str()).yellow().bold(),
            Verdict::Unknown => style(result.status.as_str()).dim().bold(),
        };

        Output::header("Verification");
        println!();
        Output::kv("Claim", &result.claim);
        println!("  {}: {}", style("Status").dim(), verdict);
        Output::kv(
            "Confidence",
            &format!("{} ({:.0}%)", result.confidence, presented.confidence * 100.0),
        );
        if let Some(relevance) = result.crisis_relevance {
            Output::kv("Crisis relevance", relevance.as_str());
        }
        Output::kv("Last verified", &result.last_verified);

        println!("\n{}", wrap(&result.summary, 78, "  "));

        if let Some(guidance) = &result.public_guidance {
            println!("\n{}", style("Public guidance").bold());
            println!("{}", wrap(guidance, 78, "  "));
        }

        if !result.sources.is_empty() {
            println!("\n{}", style("Sources").bold());
            for source in &result.sources {
                match &source.title {
                    Some(title) if title != &source.url => Output::list_item(&format!(
                        "{} {}",
                        title,
                        style(&source.url).dim()
                    )),
                    _ => Output::list_item(&source.url),
                }
            }
        }
        println!();
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Greedy word wrap with a fixed indent.
fn wrap(text: &str, width: usize, indent: &str) -> String {
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        if !line.is_empty() && line.chars().count() + 1 + word.chars().count() > width {
            lines.push(format!("{}{}", indent, line));
            line.clear();
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(format!("{}{}", indent, line));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap() {
        assert_eq!(wrap("one two three", 7, "> "), "> one two\n> three");
        assert_eq!(wrap("", 10, "  "), "");
        assert_eq!(wrap("averyveryverylongword", 5, ""), "averyveryverylongword");
    }
}
