//! Capabilities assembly and connection to a running chromedriver.

use std::collections::HashMap;

use anyhow::Result;
use fantoccini::ClientBuilder;
use serde_json::json;
use webdriver::capabilities::Capabilities;

use drover_common::BrowserConfig;

use crate::session::Session;

/// Connect to the WebDriver service named in `config` and return the
/// session that will own the live page for its lifetime.
///
/// Locating a browser binary or installing a driver is out of scope; the
/// service is expected to already be running at `config.webdriver_url`.
pub async fn connect(config: &BrowserConfig) -> Result<Session> {
    let mut caps = Capabilities::new();
    let mut chrome_opts = HashMap::new();
    chrome_opts.insert("args".to_string(), json!(chrome_arguments(config.headless)));
    caps.insert("goog:chromeOptions".to_string(), json!(chrome_opts));

    let client = ClientBuilder::native()
        .capabilities(caps)
        .connect(&config.webdriver_url)
        .await?;

    Ok(Session::new(client, config.timeouts))
}

fn chrome_arguments(headless: bool) -> Vec<String> {
    let mut args = vec![
        "--no-sandbox".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--autoplay-policy=user-gesture-required".to_string(),
        "--mute-audio".to_string(),
        "--disable-notifications".to_string(),
        "--window-size=1080,560".to_string(),
    ];
    if headless {
        args.push("--headless".to_string());
        args.push("--disable-gpu".to_string());
        args.push("--disable-webgl".to_string());
    }
    args
}
