//! Common types and utilities shared across Drover crates.
//!
//! This crate defines shared configuration structs, observability helpers,
//! and the error types used throughout the Drover workspace. It is
//! intentionally lightweight so that all crates can depend on it without
//! introducing heavy transitive costs.
//!
//! # Overview
//!
//! - [`BrowserConfig`]: Browser session configuration
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`DroverError`] and [`Result`]: Shared error handling
use serde::{Deserialize, Serialize};

pub mod observability;

/// Configuration for a browser session.
///
/// Deserialized from the `browser` section of the workspace config; every
/// field has a serde default so a bare `browser: {}` section is valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Run the browser without a visible window.
    #[serde(default)]
    pub headless: bool,
    /// URL of an already-running WebDriver service.
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,
    /// Per-operation timeouts.
    #[serde(default)]
    pub timeouts: BrowserTimeouts,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: false,
            webdriver_url: default_webdriver_url(),
            timeouts: BrowserTimeouts::default(),
        }
    }
}

fn default_webdriver_url() -> String {
    "http://localhost:9515".to_string()
}

/// Per-operation timeout budget, in seconds.
///
/// Timeouts are the only cancellation mechanism for in-flight page waits;
/// a bounded wait that elapses reports a negative result, it does not abort
/// the session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BrowserTimeouts {
    /// Budget for a page load to reach a stable, non-challenge DOM.
    #[serde(default = "default_page_load_secs")]
    pub page_load_secs: u64,
    /// Budget for an element to become clickable.
    #[serde(default = "default_element_secs")]
    pub element_secs: u64,
    /// Budget for the document body to appear before input discovery.
    #[serde(default = "default_input_discovery_secs")]
    pub input_discovery_secs: u64,
}

impl Default for BrowserTimeouts {
    fn default() -> Self {
        Self {
            page_load_secs: default_page_load_secs(),
            element_secs: default_element_secs(),
            input_discovery_secs: default_input_discovery_secs(),
        }
    }
}

fn default_page_load_secs() -> u64 {
    30
}
fn default_element_secs() -> u64 {
    10
}
fn default_input_discovery_secs() -> u64 {
    3
}

/// Error types used across the Drover system.
///
/// User interruption and timed-out waits are outcomes, not errors, and are
/// reported through return values rather than variants here.
#[derive(thiserror::Error, Debug)]
pub enum DroverError {
    /// A driver (browser, network, etc.) reported an error.
    #[error("Driver error: {0}")]
    Driver(#[from] anyhow::Error),

    /// An LLM provider request failed.
    #[error("LLM error: {0}")]
    Llm(String),
}

/// Convenient alias for results that use [`DroverError`].
pub type Result<T> = std::result::Result<T, DroverError>;
