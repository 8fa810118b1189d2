//! Enumeration of interactive elements on the live page.
//!
//! Descriptors are produced fresh per query and consumed immediately; they
//! go stale on the next navigation and must never be cached across one.

use std::time::Duration;

use anyhow::Result;
use fantoccini::Locator;
use serde::Deserialize;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::scripts::PageScripts;
use crate::session::Session;

/// Dynamically rendered forms may not be queryable immediately after the
/// body appears; give the page a beat to settle.
const INPUT_SETTLE_DELAY: Duration = Duration::from_millis(500);

pub(crate) const NO_FORMS_MESSAGE: &str = "No input forms found on the page.";

/// Kind of an input control. Unrecognised types (`email`, `password`,
/// `search`, ...) all behave as free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Checkbox,
    Radio,
    Hidden,
    Submit,
    Button,
    Image,
    #[serde(other)]
    Text,
}

impl Default for InputKind {
    fn default() -> Self {
        Self::Text
    }
}

impl InputKind {
    /// Controls whose state is a checked flag rather than text.
    pub fn is_boolean(self) -> bool {
        matches!(self, Self::Checkbox | Self::Radio)
    }

    /// Controls that are not fillable form fields.
    pub fn is_metadata(self) -> bool {
        matches!(self, Self::Hidden | Self::Submit | Self::Button | Self::Image)
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
            Self::Hidden => "hidden",
            Self::Submit => "submit",
            Self::Button => "button",
            Self::Image => "image",
        }
    }
}

/// Snapshot of one input element, as reported by the injected discovery
/// script. Valid only until the next navigation.
#[derive(Debug, Clone, Deserialize)]
pub struct InputDescriptor {
    pub xpath: String,
    #[serde(rename = "text", default)]
    pub label: String,
    #[serde(rename = "type", default)]
    pub kind: InputKind,
    #[serde(default)]
    pub displayed: bool,
    #[serde(default)]
    pub checked: bool,
}

/// A clickable submission candidate, ranked by label length: the shortest,
/// most specific label wins ties against generic compound ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonCandidate {
    pub label: String,
    pub xpath: String,
}

/// Lowercase and strip spaces so matching is insensitive to label styling.
pub(crate) fn normalize_button_label(text: &str) -> String {
    text.to_lowercase().replace(' ', "")
}

pub(crate) fn rank_buttons(mut buttons: Vec<ButtonCandidate>) -> Vec<ButtonCandidate> {
    buttons.sort_by_key(|b| b.label.len());
    buttons
}

/// Render fillable inputs in the bracket notation the agent consumes.
pub(crate) fn summarize_inputs(inputs: &[InputDescriptor]) -> Vec<String> {
    inputs
        .iter()
        .filter(|d| d.displayed && !d.kind.is_metadata())
        .map(|d| {
            let label = if d.label.is_empty() {
                d.kind.as_str()
            } else {
                d.label.as_str()
            };
            if d.kind.is_boolean() {
                let state = if d.checked { "checked" } else { "unchecked" };
                format!("[{label}]({state})")
            } else {
                format!("[{label}]()")
            }
        })
        .collect()
}

impl Session {
    /// Enumerate all input elements via the injected discovery script.
    ///
    /// Waits (bounded) for the document body, lets the page settle, then
    /// runs the script. Recoverable faults yield an empty list.
    pub async fn list_inputs(&self) -> Result<Vec<InputDescriptor>> {
        let body = self
            .client
            .wait()
            .at_most(Duration::from_secs(self.timeouts.input_discovery_secs))
            .for_element(Locator::Css("body"))
            .await;
        if let Err(err) = body {
            return self.absorb(err, Vec::new(), "body wait");
        }
        sleep(INPUT_SETTLE_DELAY).await;

        let raw = match self
            .client
            .execute(PageScripts::find_inputs(), vec![])
            .await
        {
            Ok(value) => value,
            Err(err) => return self.absorb(err, Vec::new(), "input discovery"),
        };

        match serde_json::from_value::<Vec<InputDescriptor>>(raw) {
            Ok(descriptors) => Ok(descriptors),
            Err(err) => {
                warn!(error = %err, "discovery script returned malformed descriptors");
                Ok(Vec::new())
            }
        }
    }

    /// Bracket-notation summary of the fillable form state.
    pub async fn form_summary(&self) -> Result<Vec<String>> {
        let inputs = self.list_inputs().await?;
        if inputs.is_empty() {
            info!("no input element on page");
            return Ok(vec![NO_FORMS_MESSAGE.to_string()]);
        }
        Ok(summarize_inputs(&inputs))
    }

    /// Gather visible, enabled buttons (native buttons and submit inputs),
    /// ranked ascending by label length.
    pub async fn list_buttons(&self) -> Result<Vec<ButtonCandidate>> {
        let union = "//button | //input[@type='submit']";
        let elements = match self.client.find_all(Locator::XPath(union)).await {
            Ok(elements) => elements,
            Err(err) => return self.absorb(err, Vec::new(), "button discovery"),
        };

        let mut buttons = Vec::new();
        for (i, element) in elements.iter().enumerate() {
            let displayed = element.is_displayed().await.unwrap_or(false);
            let enabled = element.is_enabled().await.unwrap_or(false);
            if !displayed || !enabled {
                continue;
            }
            let text = match element.text().await {
                Ok(text) if !text.trim().is_empty() => text,
                _ => element
                    .attr("value")
                    .await
                    .ok()
                    .flatten()
                    .unwrap_or_default(),
            };
            buttons.push(ButtonCandidate {
                label: normalize_button_label(&text),
                // Index into the same union the elements came from, so the
                // locator survives the element handle going stale.
                xpath: format!("({union})[{}]", i + 1),
            });
        }
        Ok(rank_buttons(buttons))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn descriptor(label: &str, kind: InputKind, displayed: bool, checked: bool) -> InputDescriptor {
        InputDescriptor {
            xpath: "/html/body/input[1]".to_string(),
            label: label.to_string(),
            kind,
            displayed,
            checked,
        }
    }

    #[test]
    fn descriptors_deserialize_from_script_output() {
        let raw = json!([
            {"xpath": "/html/body/input[1]", "text": "Email", "type": "email",
             "displayed": true, "checked": false},
            {"xpath": "/html/body/input[2]", "text": "News", "type": "checkbox",
             "displayed": true, "checked": true},
        ]);
        let parsed: Vec<InputDescriptor> = serde_json::from_value(raw).unwrap();
        // Unknown input types collapse into the text kind.
        assert_eq!(parsed[0].kind, InputKind::Text);
        assert_eq!(parsed[1].kind, InputKind::Checkbox);
        assert!(parsed[1].checked);
    }

    #[test]
    fn summary_skips_metadata_and_hidden_inputs() {
        let inputs = vec![
            descriptor("email", InputKind::Text, true, false),
            descriptor("token", InputKind::Hidden, true, false),
            descriptor("go", InputKind::Submit, true, false),
            descriptor("offscreen", InputKind::Text, false, false),
            descriptor("news", InputKind::Checkbox, true, true),
        ];
        assert_eq!(
            summarize_inputs(&inputs),
            vec!["[email]()".to_string(), "[news](checked)".to_string()]
        );
    }

    #[test]
    fn summary_falls_back_to_the_kind_name() {
        let inputs = vec![descriptor("", InputKind::Radio, true, false)];
        assert_eq!(summarize_inputs(&inputs), vec!["[radio](unchecked)".to_string()]);
    }

    #[test]
    fn buttons_rank_shortest_label_first() {
        let buttons = vec![
            ButtonCandidate {
                label: normalize_button_label("Save and continue later"),
                xpath: "(//button)[1]".to_string(),
            },
            ButtonCandidate {
                label: normalize_button_label("OK"),
                xpath: "(//button)[2]".to_string(),
            },
            ButtonCandidate {
                label: normalize_button_label("Register Now"),
                xpath: "(//button)[3]".to_string(),
            },
        ];
        let ranked = rank_buttons(buttons);
        assert_eq!(ranked[0].label, "ok");
        assert_eq!(ranked[1].label, "registernow");
        assert_eq!(ranked[2].label, "saveandcontinuelater");
    }
}
