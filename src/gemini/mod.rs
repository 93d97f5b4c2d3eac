//! Gemini API transport, model registry, and rate-limit fallback.

pub mod client;
pub mod fallback;
pub mod models;

pub use client::{GeminiClient, GenerationRequest};
pub use fallback::{GenerateBackend, generate_with_fallback};
pub use models::{DEFAULT_MODEL_KEY, available_keys, fallback_order, resolve_model};
