use anyhow::Result;
use drover_browser::Session;
use drover_llm::traits::{ChatMessage, LlmClient};
use regex::Regex;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;

const PROMPT_HELP: &str = "\
Commands:
  open <url>              navigate to a page
  text                    extract the page as readable text
  links                   list navigable links on the page
  forms                   list fillable inputs
  fill [label](value) ..  fill inputs by label
  submit                  press the most likely submit button
  click <kind>            click a button whose label contains <kind>
  shot <path>             save a screenshot
  ask <question>          ask the LLM about the current page
  quit                    close the browser and exit";

/// How an interactive session ended.
#[derive(Debug, PartialEq, Eq)]
pub enum SessionOutcome {
    Quit,
    Interrupted,
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Open(String),
    Text,
    Links,
    Forms,
    Fill(Vec<String>),
    Submit,
    Click(String),
    Shot(PathBuf),
    Ask(String),
    Quit,
    Help,
    Empty,
    Unknown(String),
}

impl Command {
    fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Command::Empty;
        }

        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((h, r)) => (h, r.trim()),
            None => (line, ""),
        };

        match head.to_lowercase().as_str() {
            "open" if !rest.is_empty() => Command::Open(rest.to_string()),
            "text" => Command::Text,
            "links" => Command::Links,
            "forms" => Command::Forms,
            "fill" => Command::Fill(split_fill_args(rest)),
            "submit" => Command::Submit,
            "click" if !rest.is_empty() => Command::Click(rest.to_lowercase()),
            "shot" if !rest.is_empty() => Command::Shot(PathBuf::from(rest)),
            "ask" if !rest.is_empty() => Command::Ask(rest.to_string()),
            "quit" | "exit" => Command::Quit,
            "help" | "?" => Command::Help,
            _ => Command::Unknown(line.to_string()),
        }
    }
}

/// Fill values may contain spaces, so split on the bracket notation
/// rather than whitespace.
fn split_fill_args(rest: &str) -> Vec<String> {
    match Regex::new(r"\[.*?\]\(.*?\)") {
        Ok(re) => re
            .find_iter(rest)
            .map(|m| m.as_str().to_string())
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// Drive the session from stdin until `quit` or Ctrl-C.
///
/// Ctrl-C is the user ending the session, not a fault, so it surfaces as
/// [`SessionOutcome::Interrupted`] rather than an error.
pub async fn run(
    session: Session,
    llm: Option<Arc<dyn LlmClient + Send + Sync>>,
) -> Result<SessionOutcome> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("drover ready. Type 'help' for commands.");

    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                session.close().await?;
                return Ok(SessionOutcome::Interrupted);
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    // stdin closed
                    session.close().await?;
                    return Ok(SessionOutcome::Quit);
                };
                if dispatch(&session, llm.as_deref(), Command::parse(&line)).await? {
                    session.close().await?;
                    return Ok(SessionOutcome::Quit);
                }
            }
        }
    }
}

/// Execute one command. Returns `true` when the loop should end.
async fn dispatch(
    session: &Session,
    llm: Option<&(dyn LlmClient + Send + Sync)>,
    command: Command,
) -> Result<bool> {
    match command {
        Command::Open(url) => {
            if session.navigate(&url).await? {
                println!("Loaded: {}", session.title().await.unwrap_or_default());
            } else {
                println!("Could not load the page.");
            }
        }
        Command::Text => match session.extract_text().await {
            Some(text) => println!("{text}"),
            None => println!("No readable text on this page."),
        },
        Command::Links => {
            let links = session.navigable_links().await?;
            if links.is_empty() {
                println!("No navigable links found.");
            }
            for link in links {
                println!("{link}");
            }
        }
        Command::Forms => {
            for line in session.form_summary().await? {
                println!("{line}");
            }
        }
        Command::Fill(commands) => {
            if commands.is_empty() {
                println!("Usage: fill [label](value) ...");
            } else if session.fill_form(&commands).await? {
                println!("Filled.");
            } else {
                println!("Some inputs could not be filled.");
            }
        }
        Command::Submit => {
            if session.submit_best_guess().await? {
                println!("Submitted.");
            } else {
                println!("No submit button matched.");
            }
        }
        Command::Click(kind) => {
            if session.click_button_like(&kind).await? {
                println!("Clicked.");
            } else {
                println!("No button matched '{kind}'.");
            }
        }
        Command::Shot(path) => {
            if session.screenshot(&path).await {
                println!("Saved: {}", path.display());
            } else {
                println!("Screenshot failed.");
            }
        }
        Command::Ask(question) => match llm {
            Some(client) => {
                let page = session
                    .extract_text()
                    .await
                    .unwrap_or_else(|| "[no page loaded]".to_string());
                let history = [
                    ChatMessage::system(
                        "You are a browsing assistant. Answer questions about the \
                         page text the user provides, concisely.",
                    ),
                    ChatMessage::user(format!("{page}\n\nQuestion: {question}")),
                ];
                match client.respond(&history).await {
                    Ok(answer) => println!("{answer}"),
                    Err(e) => println!("LLM request failed: {e}"),
                }
            }
            None => println!("No LLM configured; add an `llm` section to the config."),
        },
        Command::Quit => return Ok(true),
        Command::Help => println!("{PROMPT_HELP}"),
        Command::Empty => {}
        Command::Unknown(line) => println!("Unknown command: {line} (try 'help')"),
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_parse_with_arguments() {
        assert_eq!(
            Command::parse("open https://example.com"),
            Command::Open("https://example.com".into())
        );
        assert_eq!(Command::parse("  text  "), Command::Text);
        assert_eq!(Command::parse("click LOGIN"), Command::Click("login".into()));
        assert_eq!(
            Command::parse("shot /tmp/page.png"),
            Command::Shot(PathBuf::from("/tmp/page.png"))
        );
        assert_eq!(Command::parse("exit"), Command::Quit);
    }

    #[test]
    fn bare_commands_that_need_arguments_are_unknown() {
        assert_eq!(Command::parse("open"), Command::Unknown("open".into()));
        assert_eq!(Command::parse("click"), Command::Unknown("click".into()));
    }

    #[test]
    fn fill_arguments_split_on_bracket_notation_not_whitespace() {
        let parsed = Command::parse("fill [user name](Jane Doe) [remember me](checked)");
        assert_eq!(
            parsed,
            Command::Fill(vec![
                "[user name](Jane Doe)".into(),
                "[remember me](checked)".into(),
            ])
        );
    }

    #[test]
    fn ask_keeps_the_whole_question() {
        assert_eq!(
            Command::parse("ask what is the cheapest item?"),
            Command::Ask("what is the cheapest item?".into())
        );
    }
}
