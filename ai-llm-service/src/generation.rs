//! Text-generation capability consumed by the query pipeline.
//!
//! The pipeline depends on [`TextGeneration`] only, so tests and alternative
//! backends can stand in for [`LlmServiceProfiles`](crate::service_profiles::LlmServiceProfiles).

use futures::future::BoxFuture;

use crate::error_handler::AiLlmError;

/// Which model profile should serve a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Low-latency model, used for structured extraction.
    Fast,
    /// Higher-quality model, used for prose.
    Slow,
}

/// One generation call.
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub profile: Profile,
    pub system: Option<&'a str>,
    pub prompt: &'a str,
    /// JSON schema description; when present the backend runs in JSON mode.
    pub schema_hint: Option<&'a str>,
}

impl<'a> GenerationRequest<'a> {
    pub fn text(profile: Profile, system: Option<&'a str>, prompt: &'a str) -> Self {
        Self {
            profile,
            system,
            prompt,
            schema_hint: None,
        }
    }

    pub fn structured(system: Option<&'a str>, prompt: &'a str, schema_hint: &'a str) -> Self {
        Self {
            profile: Profile::Fast,
            system,
            prompt,
            schema_hint: Some(schema_hint),
        }
    }
}

/// Asynchronous LLM completion.
pub trait TextGeneration: Send + Sync {
    fn generate_text<'a>(
        &'a self,
        request: GenerationRequest<'a>,
    ) -> BoxFuture<'a, Result<String, AiLlmError>>;
}

/// System message with the JSON schema appended, as sent in JSON mode.
pub fn system_with_schema(system: Option<&str>, schema_hint: &str) -> String {
    let mut out = String::new();
    if let Some(s) = system {
        out.push_str(s.trim());
        out.push_str("\n\n");
    }
    out.push_str("Respond with a single JSON object and nothing else. Schema:\n");
    out.push_str(schema_hint.trim());
    out
}
