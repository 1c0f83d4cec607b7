//! Donation assistant: answers donation questions with a local LLM, grounded
//! in a small JSON knowledge base of drop-off locations, rules and items.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`knowledge`] | Knowledge base types and the JSON file store |
//! | [`assistant`] | Prompt assembly, readiness check, query dispatch |
//! | [`llm`] | Chat backend trait and the Ollama client |
//! | [`core`] | Config, logging, errors |

pub mod assistant;
pub mod core;
pub mod knowledge;
pub mod llm;
