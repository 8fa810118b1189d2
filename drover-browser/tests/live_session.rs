//! Integration tests against a live chromedriver.
//!
//! These need `chromedriver --port=9515` running locally, so they are
//! ignored by default: `cargo test -p drover-browser -- --ignored`.

use anyhow::Result;
use drover_browser::connect;
use drover_common::{BrowserConfig, BrowserTimeouts};

fn local_config(page_load_secs: u64) -> BrowserConfig {
    BrowserConfig {
        headless: true,
        webdriver_url: "http://localhost:9515".to_string(),
        timeouts: BrowserTimeouts {
            page_load_secs,
            ..BrowserTimeouts::default()
        },
    }
}

// The email input mirrors its value into aria-label so the fill can be
// observed back through the form summary.
const FORM_PAGE: &str = "data:text/html,<form>\
    <input id='em' type='text' name='email' \
        oninput=\"this.setAttribute('aria-label', this.value)\">\
    <label for='news'>newsletter</label>\
    <input id='news' type='checkbox' name='news'>\
    </form>";

#[tokio::test]
#[ignore]
async fn fill_round_trip_and_refill_is_a_noop() -> Result<()> {
    let session = connect(&local_config(30)).await?;
    assert!(session.navigate(FORM_PAGE).await?);

    // The typed value contains "email" so it still resolves on the refill,
    // after the label has become the mirrored value.
    let commands = vec![
        "[email](my.email@example.com)".to_string(),
        "[newsletter](checked)".to_string(),
    ];
    assert!(session.fill_form(&commands).await?);

    let summary = session.form_summary().await?;
    assert!(summary.iter().any(|l| l == "[my.email@example.com]()"));
    assert!(summary.iter().any(|l| l == "[newsletter](checked)"));

    // Refilling with the same commands is a no-op: the text field keeps its
    // value and the checkbox does not toggle back off.
    assert!(session.fill_form(&commands).await?);
    let summary = session.form_summary().await?;
    assert!(summary.iter().any(|l| l == "[my.email@example.com]()"));
    assert!(summary.iter().any(|l| l == "[newsletter](checked)"));

    session.close().await?;
    Ok(())
}

#[tokio::test]
#[ignore]
async fn challenge_timeout_reports_false_and_session_survives() -> Result<()> {
    let session = connect(&local_config(2)).await?;

    let challenge = "data:text/html,<p>Checking your browser before accessing</p>";
    assert!(!session.navigate(challenge).await?);

    // The same session navigates normally afterwards.
    let clean = "data:text/html,<p>All clear, please continue browsing this page.</p>";
    assert!(session.navigate(clean).await?);

    session.close().await?;
    Ok(())
}
