//! Grammar correction adapters. Implement GrammarCorrector.
//!
//! LLM providers (Groq/OpenAI-compatible, Gemini), an offline rule-based
//! cleanup, and a fallback chain over them.

pub mod basic;
pub mod fallback;
pub mod gemini_adapter;
pub mod openai_adapter;
pub mod prompt;

pub use basic::BasicCorrector;
pub use fallback::FallbackCorrector;
pub use gemini_adapter::GeminiCorrector;
pub use openai_adapter::OpenAiCorrector;
