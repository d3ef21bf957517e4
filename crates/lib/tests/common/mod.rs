#![allow(dead_code)]
//! # Common Test Utilities
//!
//! Shared helpers for the library tests. Providers and seeded databases live in the
//! `medquery-test-utils` crate so the server tests can use them too.

use dotenvy::dotenv;
use medquery::{
    providers::{ai::AiProvider, db::storage::Storage},
    PromptClient, PromptClientBuilder,
};
use std::sync::Once;

static INIT: Once = Once::new();

/// Initializes the tracing subscriber and loads .env for tests.
pub fn setup_tracing() {
    INIT.call_once(|| {
        dotenv().ok();
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Builds a client from the given providers with default pipeline settings.
pub fn build_client(ai: impl AiProvider + 'static, storage: impl Storage + 'static) -> PromptClient {
    PromptClientBuilder::new()
        .ai_provider(Box::new(ai))
        .storage_provider(Box::new(storage))
        .build()
        .expect("both providers are set")
}
