//! Verification result types and their wire and presentation shapes.

use serde::{Deserialize, Serialize};
use url::Url;

/// Reduce an enum literal to a comparison key: lowercase, no spaces,
/// underscores or hyphens.
fn enum_key(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Status assigned to a claim by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VerificationStatus {
    Verified,
    False,
    #[serde(rename = "Partially True")]
    PartiallyTrue,
    #[default]
    Unconfirmed,
    Outdated,
}

impl VerificationStatus {
    /// Parse a model-supplied literal, tolerating case and separator noise.
    pub fn parse(value: &str) -> Option<Self> {
        match enum_key(value).as_str() {
            "verified" => Some(Self::Verified),
            "false" => Some(Self::False),
            "partiallytrue" => Some(Self::PartiallyTrue),
            "unconfirmed" => Some(Self::Unconfirmed),
            "outdated" => Some(Self::Outdated),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Verified => "Verified",
            Self::False => "False",
            Self::PartiallyTrue => "Partially True",
            Self::Unconfirmed => "Unconfirmed",
            Self::Outdated => "Outdated",
        }
    }

    /// Simplified verdict shown to the public.
    pub fn verdict(&self) -> Verdict {
        match self {
            Self::Verified => Verdict::True,
            Self::False => Verdict::False,
            Self::PartiallyTrue => Verdict::PartiallyTrue,
            Self::Unconfirmed | Self::Outdated => Verdict::Unknown,
        }
    }
}

impl std::fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Model confidence tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
    #[default]
    Low,
}

impl Confidence {
    pub fn parse(value: &str) -> Option<Self> {
        match enum_key(value).as_str() {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    /// Numeric anchor on the 0..1 scale.
    pub fn score(&self) -> f64 {
        match self {
            Self::High => 0.9,
            Self::Medium => 0.6,
            Self::Low => 0.3,
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How much a claim matters to public safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrisisRelevance {
    High,
    Medium,
    Low,
}

impl CrisisRelevance {
    pub fn parse(value: &str) -> Option<Self> {
        match enum_key(value).as_str() {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl std::fmt::Display for CrisisRelevance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Public-facing verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verdict {
    True,
    False,
    PartiallyTrue,
    Unknown,
}

/// A cited source with a display title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLink {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub url: String,
}

impl SourceLink {
    /// Link whose title is derived from the URL host.
    pub fn from_url(url: &str) -> Self {
        Self {
            title: Some(title_from_url(url)),
            url: url.to_string(),
        }
    }
}

/// Derive a display title from a URL's host.
///
/// `https://www.redcross.org/x` becomes `Redcross.org`. Strings that do not
/// parse as URLs (or have no host) are returned unchanged.
pub fn title_from_url(raw: &str) -> String {
    let parsed = match Url::parse(raw) {
        Ok(url) => url,
        Err(_) => return raw.to_string(),
    };

    match parsed.host_str() {
        Some(host) if !host.is_empty() => {
            let host = host.strip_prefix("www.").unwrap_or(host);
            let mut chars = host.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => raw.to_string(),
            }
        }
        _ => raw.to_string(),
    }
}

/// Normalized verification of one claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub claim: String,
    pub status: VerificationStatus,
    pub confidence: Confidence,
    pub summary: String,
    pub public_guidance: Option<String>,
    pub sources: Vec<SourceLink>,
    pub last_verified: String,
    pub crisis_relevance: Option<CrisisRelevance>,
}

impl VerificationResult {
    /// Wire shape consumed by presentation layers.
    pub fn to_wire(&self) -> WireVerification {
        WireVerification {
            claim: self.claim.clone(),
            status: self.status,
            confidence: self.confidence,
            summary: self.summary.clone(),
            public_guidance: self.public_guidance.clone(),
            sources: self.sources.iter().map(|s| s.url.clone()).collect(),
            last_verified: self.last_verified.clone(),
            crisis_relevance: self.crisis_relevance,
        }
    }

    /// Presentation shape: simplified verdict and numeric confidence.
    pub fn present(&self) -> PresentedVerification {
        PresentedVerification {
            verdict: self.status.verdict(),
            confidence: self.confidence.score(),
            summary: self.summary.clone(),
            sources: self.sources.clone(),
            public_guidance: self.public_guidance.clone(),
            crisis_relevance: self.crisis_relevance,
            last_verified: Some(self.last_verified.clone()).filter(|s| !s.is_empty()),
        }
    }
}

/// `{claim, status, confidence, summary, public_guidance, sources, last_verified, crisis_relevance}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireVerification {
    pub claim: String,
    pub status: VerificationStatus,
    pub confidence: Confidence,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_guidance: Option<String>,
    pub sources: Vec<String>,
    pub last_verified: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crisis_relevance: Option<CrisisRelevance>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentedVerification {
    pub verdict: Verdict,
    pub confidence: f64,
    pub summary: String,
    pub sources: Vec<SourceLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_guidance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crisis_relevance: Option<CrisisRelevance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_verified: Option<String>,
}

/// An enum field the model filled with an unrecognized literal.
///
/// Recoverable: the field takes `fallback` and verification continues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumDeviation {
    pub field: String,
    pub value: String,
    pub fallback: String,
}

impl std::fmt::Display for EnumDeviation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: unrecognized {:?}, using {}",
            self.field, self.value, self.fallback
        )
    }
}
