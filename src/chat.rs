//! Interactive session for `ragc chat`.
//!
//! Lines typed at the prompt feed the active [`TextInput`]. Plain text goes to
//! the question input; `/ingest` switches to the URL input until the next
//! submission. A line ending in `\` continues on the next line instead of
//! submitting; `\\` at the end keeps one literal backslash. A leading `//`
//! sends the rest as text starting with `/`.

use anyhow::Result;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::api::Backend;
use crate::controller::ClientController;
use crate::input::{InputKind, TextInput};
use crate::storage::SessionStore;
use crate::view::View;

const HELP: &str = "\
Type a question and press Enter. End a line with \\ to continue it.
Start with // to send a line beginning with /, end with \\\\ for a literal \\.
  /ingest      enter URLs to ingest (one per line, continue with \\)
  /ask         back to questions
  /sites       toggle the ingested sites view
  /clear       remove all ingested sites
  /models      reload the model list
  /model <id>  select a model
  /help        show this help
  /quit        leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Ingest,
    Ask,
    Sites,
    Clear,
    Models,
    Model(String),
    Help,
    Quit,
    Unknown(String),
}

/// Parses a slash command. `None` for ordinary input, including `//` lines.
pub fn parse_command(line: &str) -> Option<ChatCommand> {
    let line = line.trim();
    if line.starts_with("//") {
        return None;
    }
    let rest = line.strip_prefix('/')?;
    let mut parts = rest.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or_default();
    let arg = parts.next().map(str::trim).unwrap_or_default();

    Some(match name {
        "ingest" => ChatCommand::Ingest,
        "ask" => ChatCommand::Ask,
        "sites" => ChatCommand::Sites,
        "clear" => ChatCommand::Clear,
        "models" => ChatCommand::Models,
        "model" if !arg.is_empty() => ChatCommand::Model(arg.to_string()),
        "help" => ChatCommand::Help,
        "quit" | "exit" => ChatCommand::Quit,
        _ => ChatCommand::Unknown(line.to_string()),
    })
}

fn prompt(input: &TextInput) {
    let label = match (input.kind(), input.is_empty()) {
        (_, false) => "...> ",
        (InputKind::Question, true) => "ask> ",
        (InputKind::Urls, true) => "urls> ",
    };
    let mut out = std::io::stdout().lock();
    let _ = write!(out, "{}", label);
    let _ = out.flush();
}

/// Runs the session until `/quit` or end of input.
///
/// `interactive` controls whether prompts are printed.
pub async fn run_chat<B, V, S, R>(
    controller: &ClientController<B, V, S>,
    reader: R,
    interactive: bool,
) -> Result<()>
where
    B: Backend,
    V: View,
    S: SessionStore,
    R: AsyncBufRead + Unpin,
{
    controller.init_state().await;
    if interactive {
        println!("{}", HELP);
    }

    let mut lines = reader.lines();
    let mut input = TextInput::new(InputKind::Question);

    loop {
        if interactive {
            prompt(&input);
        }
        let Some(line) = lines.next_line().await? else {
            break;
        };

        if input.is_empty() {
            if let Some(command) = parse_command(&line) {
                match command {
                    ChatCommand::Quit => break,
                    ChatCommand::Help => println!("{}", HELP),
                    ChatCommand::Ingest => input = TextInput::new(InputKind::Urls),
                    ChatCommand::Ask => input = TextInput::new(InputKind::Question),
                    ChatCommand::Sites => {
                        controller.toggle_sites_view().await;
                    }
                    ChatCommand::Clear => {
                        controller.clear_sites().await;
                    }
                    ChatCommand::Models => {
                        controller.refresh_models().await;
                    }
                    ChatCommand::Model(id) => {
                        if let Err(e) = controller.select_model(&id).await {
                            eprintln!("{}", e);
                        }
                    }
                    ChatCommand::Unknown(raw) => {
                        eprintln!("Unknown command: {} (try /help)", raw);
                    }
                }
                continue;
            }
        }

        let line = if input.is_empty() && line.trim_start().starts_with("//") {
            line.trim_start()[1..].to_string()
        } else {
            line
        };
        let Some(text) = input.feed_line(&line) else {
            continue;
        };
        match input.kind() {
            InputKind::Question => {
                if text.is_empty() {
                    continue;
                }
                controller.handle_ask(&text).await;
            }
            InputKind::Urls => {
                controller.ingest_sites(&text).await;
                input = TextInput::new(InputKind::Question);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("/ingest"), Some(ChatCommand::Ingest));
        assert_eq!(parse_command("  /sites  "), Some(ChatCommand::Sites));
        assert_eq!(parse_command("/exit"), Some(ChatCommand::Quit));
        assert_eq!(
            parse_command("/model  large-v2 "),
            Some(ChatCommand::Model("large-v2".into()))
        );
    }

    #[test]
    fn test_model_without_id_is_unknown() {
        assert_eq!(
            parse_command("/model"),
            Some(ChatCommand::Unknown("/model".into()))
        );
    }

    #[test]
    fn test_plain_text_is_not_a_command() {
        assert_eq!(parse_command("what is /ingest?"), None);
        assert_eq!(parse_command(""), None);
    }

    #[test]
    fn test_double_slash_is_not_a_command() {
        assert_eq!(parse_command("//etc/hosts format?"), None);
        assert_eq!(
            parse_command("/etc/hosts format?"),
            Some(ChatCommand::Unknown("/etc/hosts format?".into()))
        );
    }
}
