//! Loader for workspace configuration with YAML + environment overlays.
//!
//! A `drover.yaml` file carries a `browser` section and an optional tagged
//! `llm` section; `DROVER__`-prefixed environment variables override file
//! values and `${VAR}` placeholders are expanded before deserialisation.

use config::{Config, ConfigError, Environment, File};
use drover_common::BrowserConfig;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

/// Top-level workspace configuration.
#[derive(Debug, Deserialize)]
pub struct DroverConfig {
    #[serde(default)]
    pub browser: BrowserConfig,
    /// When absent, LLM-backed commands are simply unavailable.
    #[serde(default)]
    pub llm: Option<LlmConfig>,
}

/// The tag is `provider`; fields are provider-specific.
///
/// OpenAI, LM Studio, DeepSeek and self-hosted chat-completion servers all
/// speak the same wire protocol and differ only by endpoint, so they share
/// the `openai` variant.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum LlmConfig {
    Ollama {
        model: String,
        #[serde(default = "default_ollama_endpoint")]
        endpoint: String,
    },
    Openai {
        model: String,
        auth_token: String,
        #[serde(default = "default_openai_endpoint")]
        endpoint: String,
        #[serde(default)]
        temperature: Option<f32>,
        #[serde(default)]
        max_tokens: Option<u32>,
    },
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".into()
}
fn default_ollama_endpoint() -> String {
    "http://localhost:11434".into()
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hiding the `config` crate wiring (YAML + env overrides).
pub struct DroverConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for DroverConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DroverConfigLoader {
    /// Start with sensible defaults: `DROVER__` env overrides, no file.
    ///
    /// ```
    /// use drover_config::DroverConfigLoader;
    ///
    /// let config = DroverConfigLoader::new()
    ///     .with_yaml_str("browser:\n  headless: true")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert!(config.browser.headless);
    /// assert!(config.llm.is_none());
    /// ```
    pub fn new() -> Self {
        let builder =
            Config::builder().add_source(Environment::with_prefix("DROVER").separator("__"));
        Self { builder }
    }

    /// Attach a config file; the `config` crate infers format by suffix.
    /// Missing files are tolerated so deployments can rely purely on
    /// environment variables.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet (tests, CLI overrides).
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources.
    ///
    /// `${VAR}` placeholders anywhere in the merged tree are expanded
    /// (recursively, bounded) before the strongly typed structs
    /// materialise.
    ///
    /// ```
    /// use drover_config::{DroverConfigLoader, LlmConfig};
    ///
    /// unsafe { std::env::set_var("LLM_TOKEN", "from-env"); }
    ///
    /// let config = DroverConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// llm:
    ///   provider: openai
    ///   model: "gpt-4o-mini"
    ///   auth_token: "${LLM_TOKEN}"
    /// "#,
    ///     )
    ///     .load()
    ///     .expect("valid config");
    ///
    /// match config.llm {
    ///     Some(LlmConfig::Openai { auth_token, .. }) => {
    ///         assert_eq!(auth_token, "from-env");
    ///     }
    ///     _ => panic!("expected OpenAI configuration"),
    /// }
    ///
    /// unsafe { std::env::remove_var("LLM_TOKEN"); }
    /// ```
    pub fn load(self) -> Result<DroverConfig, ConfigError> {
        let cfg = self.builder.build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("FOO", Some("bar"), || {
            let mut v = json!("prefix-${FOO}-suffix");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("prefix-bar-suffix"));
        });
    }

    #[test]
    fn expands_nested_values() {
        temp_env::with_var("HOST", Some("example"), || {
            let mut v = json!({
                "browser": { "webdriver_url": "http://${HOST}:9515" },
                "other": [ "plain", 42, true ],
            });
            expand_env_in_value(&mut v);
            assert_eq!(
                v["browser"]["webdriver_url"],
                json!("http://example:9515")
            );
        });
    }

    #[test]
    fn expansion_depth_is_bounded() {
        // A self-referential variable must not loop forever.
        temp_env::with_var("LOOP", Some("${LOOP}"), || {
            let mut v = json!("${LOOP}");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("${LOOP}"));
        });
    }
}
