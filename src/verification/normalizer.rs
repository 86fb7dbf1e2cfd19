//! Turns raw model text into a typed [`VerificationResult`].
//!
//! Cosmetic noise is absorbed: a single enclosing code fence is stripped and
//! unrecognized enum literals fall back to safe defaults. Anything
//! structurally wrong fails: text that is not a JSON object, or an object
//! missing a required field.

use super::types::{
    Confidence, CrisisRelevance, EnumDeviation, SourceLink, VerificationResult,
    VerificationStatus,
};
use crate::config::MAX_SEARCH_RESULTS;
use crate::error::{Result, VeritasError};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;
use tracing::{debug, warn};

const REQUIRED_FIELDS: [&str; 6] = [
    "claim",
    "status",
    "confidence",
    "summary",
    "sources",
    "last_verified",
];

/// Normalizer output: the result plus any enum fields that were degraded.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub result: VerificationResult,
    pub deviations: Vec<EnumDeviation>,
}

fn fence_open() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^```[A-Za-z0-9_+-]*[ \t]*(?:\r?\n)?").expect("valid fence regex"))
}

fn fence_close() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:\r?\n)?```\s*$").expect("valid fence regex"))
}

/// Strip one optional enclosing code fence (with optional language tag).
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let start = fence_open().find(trimmed).map_or(0, |m| m.end());
    let body = &trimmed[start..];
    let end = fence_close().find(body).map_or(body.len(), |m| m.start());
    body[..end].trim()
}

/// Normalize raw model output into a verification result.
///
/// Pure: the same input always yields the same output.
pub fn normalize(raw: &str) -> Result<Normalized> {
    let cleaned = strip_code_fence(raw);

    let value: Value = serde_json::from_str(cleaned)
        .map_err(|e| VeritasError::malformed(format!("not valid JSON: {}", e), raw))?;

    let object = match value {
        Value::Object(map) => map,
        other => {
            return Err(VeritasError::malformed(
                format!("expected a JSON object, got {}", json_type(&other)),
                raw,
            ))
        }
    };

    check_required(&object, raw)?;

    let mut deviations = Vec::new();

    // check_required guarantees these are strings / an array
    let claim = string_field(&object, "claim");
    let summary = string_field(&object, "summary");
    let last_verified = string_field(&object, "last_verified");

    let status_raw = string_field(&object, "status");
    let status = VerificationStatus::parse(&status_raw).unwrap_or_else(|| {
        let fallback = VerificationStatus::default();
        deviations.push(EnumDeviation {
            field: "status".to_string(),
            value: status_raw.clone(),
            fallback: fallback.to_string(),
        });
        fallback
    });

    let confidence_raw = string_field(&object, "confidence");
    let confidence = Confidence::parse(&confidence_raw).unwrap_or_else(|| {
        let fallback = Confidence::default();
        deviations.push(EnumDeviation {
            field: "confidence".to_string(),
            value: confidence_raw.clone(),
            fallback: fallback.to_string(),
        });
        fallback
    });

    let crisis_relevance = match object.get("crisis_relevance") {
        None | Some(Value::Null) => None,
        Some(value) => {
            let literal = value.as_str().map(str::to_string).unwrap_or_else(|| value.to_string());
            let parsed = CrisisRelevance::parse(&literal);
            if parsed.is_none() {
                deviations.push(EnumDeviation {
                    field: "crisis_relevance".to_string(),
                    value: literal,
                    fallback: "unspecified".to_string(),
                });
            }
            parsed
        }
    };

    let public_guidance = object
        .get("public_guidance")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let sources = object
        .get("sources")
        .and_then(Value::as_array)
        .map(|entries| parse_sources(entries.as_slice()))
        .unwrap_or_default();

    for deviation in &deviations {
        warn!("Model output enum deviation: {}", deviation);
    }
    debug!(
        "Normalized verification: status={}, confidence={}, {} source(s)",
        status,
        confidence,
        sources.len()
    );

    Ok(Normalized {
        result: VerificationResult {
            claim,
            status,
            confidence,
            summary,
            public_guidance,
            sources,
            last_verified,
            crisis_relevance,
        },
        deviations,
    })
}

/// Every required field must be present, non-null, and of the right type.
fn check_required(object: &Map<String, Value>, raw: &str) -> Result<()> {
    let missing: Vec<String> = REQUIRED_FIELDS
        .iter()
        .filter(|field| {
            let usable = match object.get(**field) {
                Some(Value::Array(_)) => **field == "sources",
                Some(Value::String(_)) => **field != "sources",
                _ => false,
            };
            !usable
        })
        .map(|field| field.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(VeritasError::incomplete(missing, raw))
    }
}

fn string_field(object: &Map<String, Value>, field: &str) -> String {
    object
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Sources may be bare URL strings or `{url, title?}` objects.
fn parse_sources(entries: &[Value]) -> Vec<SourceLink> {
    let mut sources = Vec::new();

    for entry in entries {
        let link = match entry {
            Value::String(url) if !url.trim().is_empty() => Some(SourceLink::from_url(url.trim())),
            Value::Object(map) => map
                .get("url")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .map(|url| {
                    match map.get("title").and_then(Value::as_str).map(str::trim) {
                        Some(title) if !title.is_empty() => SourceLink {
                            title: Some(title.to_string()),
                            url: url.to_string(),
                        },
                        _ => SourceLink::from_url(url),
                    }
                }),
            _ => None,
        };

        match link {
            Some(link) => sources.push(link),
            None => warn!("Skipping unusable source entry: {}", entry),
        }
    }

    if sources.len() > MAX_SEARCH_RESULTS {
        debug!("Truncating {} sources to {}", sources.len(), MAX_SEARCH_RESULTS);
        sources.truncate(MAX_SEARCH_RESULTS);
    }
    sources
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHELTER_JSON: &str = r#"{"claim":"Emergency shelters are open at Central Hall","status":"Verified","confidence":"High","summary":"Central Hall shelter is operating.","public_guidance":"Bring ID and medication.","sources":["https://www.redcross.org/shelter-status"],"last_verified":"2024-01-01T00:00:00Z","crisis_relevance":"High"}"#;

    #[test]
    fn test_strip_code_fence_variants() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("  ```\n{\"a\":1}\n```  "), "{\"a\":1}");
        assert_eq!(strip_code_fence("```JSON\r\n{\"a\":1}\r\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```json {\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn test_fenced_and_bare_normalize_identically() {
        let fenced = format!("```json\n{}\n```", SHELTER_JSON);
        assert_eq!(normalize(&fenced).unwrap(), normalize(SHELTER_JSON).unwrap());
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let first = normalize(SHELTER_JSON).unwrap();
        let second = normalize(SHELTER_JSON).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_normalize_shelter_payload() {
        let normalized = normalize(SHELTER_JSON).unwrap();
        let result = normalized.result;

        assert!(normalized.deviations.is_empty());
        assert_eq!(result.status, VerificationStatus::Verified);
        assert_eq!(result.confidence, Confidence::High);
        assert_eq!(result.confidence.score(), 0.9);
        assert_eq!(result.crisis_relevance, Some(CrisisRelevance::High));
        assert_eq!(result.public_guidance.as_deref(), Some("Bring ID and medication."));
        assert_eq!(
            result.sources,
            vec![SourceLink {
                title: Some("Redcross.org".to_string()),
                url: "https://www.redcross.org/shelter-status".to_string(),
            }]
        );
    }

    #[test]
    fn test_unknown_status_degrades() {
        let raw = SHELTER_JSON.replace("\"Verified\"", "\"Maybe\"");
        let normalized = normalize(&raw).unwrap();
        assert_eq!(normalized.result.status, VerificationStatus::Unconfirmed);
        assert_eq!(normalized.deviations.len(), 1);
        assert_eq!(normalized.deviations[0].field, "status");
        assert_eq!(normalized.deviations[0].value, "Maybe");
    }

    #[test]
    fn test_unknown_confidence_degrades() {
        let raw = SHELTER_JSON.replace("\"High\",\"summary\"", "\"Very High\",\"summary\"");
        let normalized = normalize(&raw).unwrap();
        assert_eq!(normalized.result.confidence, Confidence::Low);
        assert_eq!(normalized.deviations[0].field, "confidence");
    }

    #[test]
    fn test_unknown_crisis_relevance_dropped() {
        let raw = SHELTER_JSON.replace("\"crisis_relevance\":\"High\"", "\"crisis_relevance\":\"Severe\"");
        let normalized = normalize(&raw).unwrap();
        assert_eq!(normalized.result.crisis_relevance, None);
        assert_eq!(normalized.deviations[0].field, "crisis_relevance");

        // Downstream shapes omit the key rather than carrying null.
        let wire = serde_json::to_value(normalized.result.to_wire()).unwrap();
        assert!(wire.get("crisis_relevance").is_none());
        assert_eq!(wire["status"], "Verified");
        let presented = serde_json::to_value(normalized.result.present()).unwrap();
        assert!(presented.get("crisis_relevance").is_none());
    }

    #[test]
    fn test_missing_sources_is_incomplete() {
        let raw = r#"{"claim":"c","status":"False","confidence":"Low","summary":"s","last_verified":"now"}"#;
        match normalize(raw).unwrap_err() {
            VeritasError::IncompleteModelOutput { fields, .. } => {
                assert_eq!(fields, vec!["sources".to_string()]);
            }
            other => panic!("Expected IncompleteModelOutput, got {:?}", other),
        }
    }

    #[test]
    fn test_wrong_type_fields_are_incomplete() {
        let raw = r#"{"claim":"c","status":"False","confidence":"Low","summary":null,"sources":"https://a.org","last_verified":"now"}"#;
        match normalize(raw).unwrap_err() {
            VeritasError::IncompleteModelOutput { fields, .. } => {
                assert_eq!(fields, vec!["summary".to_string(), "sources".to_string()]);
            }
            other => panic!("Expected IncompleteModelOutput, got {:?}", other),
        }
    }

    #[test]
    fn test_unparseable_text_is_malformed() {
        let err = normalize("The claim appears to be true.").unwrap_err();
        assert_eq!(err.kind(), "malformed_model_output");

        let err = normalize("[1, 2, 3]").unwrap_err();
        assert_eq!(err.kind(), "malformed_model_output");

        let err = normalize("").unwrap_err();
        assert_eq!(err.kind(), "malformed_model_output");
    }

    #[test]
    fn test_prose_around_json_is_not_recovered() {
        let raw = format!("Here is my answer:\n{}", SHELTER_JSON);
        assert_eq!(normalize(&raw).unwrap_err().kind(), "malformed_model_output");
    }

    #[test]
    fn test_source_entries() {
        let raw = SHELTER_JSON.replace(
            r#"["https://www.redcross.org/shelter-status"]"#,
            r#"[{"url":"https://fema.gov/x","title":"FEMA"},{"url":"https://www.ready.gov/"},"",42,"not a url","https://a.org","https://b.org"]"#,
        );
        let sources = normalize(&raw).unwrap().result.sources;
        assert_eq!(sources.len(), 3);
        assert_eq!(sources[0].title.as_deref(), Some("FEMA"));
        assert_eq!(sources[1].title.as_deref(), Some("Ready.gov"));
        assert_eq!(sources[2].title.as_deref(), Some("not a url"));
        assert_eq!(sources[2].url, "not a url");
    }

    #[test]
    fn test_blank_public_guidance_is_none() {
        let raw = SHELTER_JSON.replace("Bring ID and medication.", "  ");
        assert_eq!(normalize(&raw).unwrap().result.public_guidance, None);
    }
}
