//! Fill-command parsing and heuristic form submission.
//!
//! Abstract field descriptors arrive as bracket-notation strings,
//! `[label](value)`, typically produced by an LLM. Labels resolve against
//! the live input snapshot by substring containment to tolerate label and
//! placeholder variance; matching is deliberately unanchored, as is the
//! button-label match below.

use std::time::Duration;

use anyhow::Result;
use fantoccini::Locator;
use regex::Regex;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::fault::is_recoverable;
use crate::inspect::InputDescriptor;
use crate::session::Session;

/// Pause after scrolling a target into view so scroll-triggered layout can
/// settle before the click lands.
const PRE_CLICK_SETTLE: Duration = Duration::from_millis(100);

/// Common submission labels, in priority order.
const SUBMIT_VOCABULARY: [&str; 21] = [
    "login", "submit", "register", "calculate", "save", "send", "continue", "apply", "ok",
    "confirm", "next", "proceed", "accept", "agree", "yes", "no", "cancel", "close", "done",
    "finish", "start",
];

/// One field-fill instruction. `checked`/`unchecked` values are sentinels
/// for boolean controls; any other value is literal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillCommand {
    pub label: String,
    pub value: String,
}

impl FillCommand {
    /// Parse a `[label](value)` instruction string. Malformed strings are
    /// not errors; callers skip them.
    pub fn parse(raw: &str) -> Option<Self> {
        let re = Regex::new(r"\[(.*?)\]\((.*?)\)").ok()?;
        let caps = re.captures(raw)?;
        Some(Self {
            label: caps.get(1)?.as_str().trim().to_string(),
            value: caps.get(2)?.as_str().trim().to_string(),
        })
    }

    /// For boolean controls: the checked state this command requests.
    fn wants_checked(&self) -> bool {
        self.value.eq_ignore_ascii_case("checked")
    }
}

/// First descriptor whose label contains the command label.
pub(crate) fn resolve_label<'a>(
    inputs: &'a [InputDescriptor],
    label: &str,
) -> Option<&'a InputDescriptor> {
    inputs.iter().find(|d| d.label.contains(label))
}

/// Whether a boolean control must be clicked to reach the requested state.
/// Re-filling with the current state is a no-op.
pub(crate) fn needs_toggle(currently_checked: bool, command: &FillCommand) -> bool {
    currently_checked != command.wants_checked()
}

impl Session {
    /// Apply a batch of `[label](value)` instructions to the current form.
    ///
    /// Malformed and unresolved commands are skipped with a warning.
    /// Recoverable element trouble yields `Ok(false)`; substrate failures
    /// propagate.
    pub async fn fill_form(&self, commands: &[String]) -> Result<bool> {
        let inputs = self.list_inputs().await?;
        for raw in commands {
            let Some(command) = FillCommand::parse(raw) else {
                warn!(%raw, "invalid fill instruction format");
                continue;
            };
            let Some(descriptor) = resolve_label(&inputs, &command.label) else {
                warn!(label = %command.label, "no input matching label");
                continue;
            };
            if let Err(err) = self.apply_fill(descriptor, &command).await {
                return self.absorb(err, false, "form fill");
            }
        }
        Ok(true)
    }

    async fn apply_fill(
        &self,
        descriptor: &InputDescriptor,
        command: &FillCommand,
    ) -> std::result::Result<(), fantoccini::error::CmdError> {
        let element = self
            .client
            .find(Locator::XPath(&descriptor.xpath))
            .await?;
        if descriptor.kind.is_boolean() {
            // Re-read the live state; the snapshot may already be stale.
            let checked = element.is_selected().await?;
            if needs_toggle(checked, command) {
                element.click().await?;
                info!(label = %command.label, value = %command.value, "toggled input");
            }
        } else {
            element.clear().await?;
            element.send_keys(&command.value).await?;
            info!(label = %command.label, "filled input");
        }
        Ok(())
    }

    /// Wait for the element at `xpath` to appear, scroll it into the
    /// viewport center, and click it. All expected click trouble
    /// (not displayed, not enabled, timeout, interception) is `Ok(false)`.
    pub(crate) async fn click_element(&self, xpath: &str) -> Result<bool> {
        let element = match self
            .client
            .wait()
            .at_most(Duration::from_secs(self.timeouts.element_secs))
            .for_element(Locator::XPath(xpath))
            .await
        {
            Ok(element) => element,
            Err(err) => return self.absorb(err, false, "clickable wait"),
        };

        for probe in [element.is_displayed().await, element.is_enabled().await] {
            match probe {
                Ok(true) => {}
                Ok(false) => return Ok(false),
                Err(err) if is_recoverable(&err) => return Ok(false),
                Err(err) => return Err(err.into()),
            }
        }

        let scroll = "arguments[0].scrollIntoView({block: 'center', behavior: 'smooth'});";
        let handle = serde_json::to_value(&element)?;
        if let Err(err) = self.client.execute(scroll, vec![handle]).await {
            return self.absorb(err, false, "scroll into view");
        }
        sleep(PRE_CLICK_SETTLE).await;

        match element.click().await {
            Ok(()) => Ok(true),
            Err(err) => self.absorb(err, false, "click"),
        }
    }

    /// Click the first ranked button whose label contains `kind`,
    /// case-insensitively. Only the first matching candidate is attempted.
    pub async fn click_button_like(&self, kind: &str) -> Result<bool> {
        let buttons = self.list_buttons().await?;
        if buttons.is_empty() {
            warn!("no visible buttons found");
            return Ok(false);
        }

        let needle = kind.to_lowercase();
        for button in &buttons {
            if button.label.contains(&needle) {
                return self.click_element(&button.xpath).await;
            }
        }
        warn!(%kind, "no button matching kind");
        Ok(false)
    }

    /// Try the common submission vocabulary in priority order, returning on
    /// the first successful click. Exhausting the list is a non-fatal
    /// "no action taken" outcome.
    pub async fn submit_best_guess(&self) -> Result<bool> {
        for label in SUBMIT_VOCABULARY {
            if self.click_button_like(label).await? {
                return Ok(true);
            }
        }
        warn!("no submission button found");
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspect::{normalize_button_label, InputKind};

    fn descriptor(label: &str, kind: InputKind) -> InputDescriptor {
        InputDescriptor {
            xpath: "/html/body/form/input[1]".to_string(),
            label: label.to_string(),
            kind,
            displayed: true,
            checked: false,
        }
    }

    #[test]
    fn parses_well_formed_instructions() {
        let cmd = FillCommand::parse("[email](a@b.com)").unwrap();
        assert_eq!(cmd.label, "email");
        assert_eq!(cmd.value, "a@b.com");

        let cmd = FillCommand::parse("[ newsletter ]( checked )").unwrap();
        assert_eq!(cmd.label, "newsletter");
        assert!(cmd.wants_checked());
    }

    #[test]
    fn rejects_malformed_instructions() {
        assert!(FillCommand::parse("email=a@b.com").is_none());
        assert!(FillCommand::parse("[email]").is_none());
        assert!(FillCommand::parse("(value)").is_none());
    }

    #[test]
    fn labels_resolve_by_substring() {
        let inputs = vec![
            descriptor("Your email address", InputKind::Text),
            descriptor("password", InputKind::Text),
        ];
        assert!(resolve_label(&inputs, "email").is_some());
        assert!(resolve_label(&inputs, "pass").is_some());
        assert!(resolve_label(&inputs, "username").is_none());
    }

    #[test]
    fn toggles_only_on_state_change() {
        let check = FillCommand::parse("[news](checked)").unwrap();
        let uncheck = FillCommand::parse("[news](unchecked)").unwrap();

        assert!(needs_toggle(false, &check));
        assert!(!needs_toggle(true, &check));
        assert!(needs_toggle(true, &uncheck));
        assert!(!needs_toggle(false, &uncheck));
        // Anything that is not the checked sentinel requests unchecked.
        let other = FillCommand::parse("[news](yes please)").unwrap();
        assert!(needs_toggle(true, &other));
    }

    #[test]
    fn vocabulary_matches_compound_labels() {
        // "Register Now" normalises to "registernow", which the "register"
        // vocabulary entry matches by substring.
        let label = normalize_button_label("Register Now");
        assert!(SUBMIT_VOCABULARY.iter().any(|k| label.contains(k)));

        let unrelated = normalize_button_label("View catalogue");
        assert!(!SUBMIT_VOCABULARY.iter().any(|k| unrelated.contains(k)));
    }
}
