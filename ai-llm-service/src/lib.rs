//! Shared LLM service: Ollama and OpenAI-compatible providers, unified errors,
//! health checks, and fast/slow/embedding profiles.

pub mod config;
pub mod error_handler;
pub mod generation;
pub mod health_service;
pub mod service_profiles;
pub mod services;

pub use error_handler::AiLlmError;
pub use generation::{GenerationRequest, Profile, TextGeneration};
pub use service_profiles::LlmServiceProfiles;
