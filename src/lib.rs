//! Domain Enrichment API Library
//!
//! This library turns a company domain and a selection of business-attribute
//! fields into a structured company record, using one of several pluggable
//! providers (OpenAI, Claude, or a self-hosted Perplexica search service).
//!
//! # Modules
//!
//! - `api`: API definitions.
//! - `core`: Core enrichment logic.
//! - `integrations`: External provider integrations.
//! - `chat_transport`: Chat-session transport (OpenAI and Anthropic wire formats).
//! - `config`: Configuration management.
//! - `domain`: Domain normalization and extraction.
//! - `enrichment`: Enrichment orchestration and batch enrichment.
//! - `errors`: Error handling types.
//! - `extractor`: JSON extraction from free-text provider answers.
//! - `fields`: Field catalog.
//! - `handlers`: HTTP request handlers.
//! - `models`: Request and result models.
//! - `prompt`: Research brief construction.
//! - `providers`: Provider adapters.

pub mod api;
pub mod core;
pub mod integrations;

// Re-export primary modules for shared use in tests and other binaries
pub mod chat_transport;
pub mod config;
pub mod domain;
pub mod enrichment;
pub mod errors;
pub mod extractor;
pub mod fields;
pub mod handlers;
pub mod models;
pub mod prompt;
pub mod providers;
