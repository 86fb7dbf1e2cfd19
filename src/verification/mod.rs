//! Verification results and the normalizer that produces them from model text.

mod normalizer;
mod types;

pub use normalizer::{normalize, strip_code_fence, Normalized};
pub use types::{
    title_from_url, Confidence, CrisisRelevance, EnumDeviation, PresentedVerification,
    SourceLink, Verdict, VerificationResult, VerificationStatus, WireVerification,
};
