//! # Dot Command Handler
//!
//! SQLite-style dot commands. They start with a period and are not SQL.
//!
//! | Command               | Description                                  |
//! |-----------------------|----------------------------------------------|
//! | `.quit` / `.exit`     | Exit the CLI                                 |
//! | `.load NAME PATH`     | Read a CSV file as table NAME                |
//! | `.tables`             | List loaded frames and store tables          |
//! | `.param NAME VALUE`   | Set parameter `:NAME`                        |
//! | `.params`             | List parameters                              |
//! | `.unset NAME`         | Remove a parameter                           |
//! | `.help`               | Show available commands                      |
//!
//! Command names are case-insensitive; arguments are whitespace-separated.
//! `.param` parses VALUE as an integer, a float, `true`/`false`, `null` or,
//! failing those, text; quotes around text are removed.

use crate::cli::session::Session;
use crate::types::Value;

#[derive(Debug, PartialEq)]
pub enum CommandResult {
    Output(String),
    Exit,
    Continue,
    Error(String),
}

pub struct CommandHandler;

impl CommandHandler {
    pub fn is_command(input: &str) -> bool {
        input.trim().starts_with('.')
    }

    pub fn execute(input: &str, session: &mut Session) -> CommandResult {
        let parts: Vec<&str> = input.split_whitespace().collect();
        let Some(first) = parts.first() else {
            return CommandResult::Continue;
        };

        let cmd = first.to_lowercase();
        let args = &parts[1..];

        match cmd.as_str() {
            ".quit" | ".exit" | ".q" => CommandResult::Exit,
            ".help" | ".h" | ".?" => CommandResult::Output(help_text()),
            ".load" => load(session, args),
            ".tables" => list_tables(session),
            ".param" => set_param(session, input, args),
            ".params" => list_params(session),
            ".unset" => unset_param(session, args),
            _ => CommandResult::Error(format!(
                "Unknown command: {}. Type .help for available commands.",
                cmd
            )),
        }
    }
}

fn help_text() -> String {
    r#"frameql CLI Commands:

  .quit, .exit, .q     Exit the CLI
  .help, .h, .?        Show this help message
  .load NAME PATH      Read the CSV file at PATH as table NAME
  .tables              List loaded frames and tables in the store
  .param NAME VALUE    Set parameter :NAME
  .params              List parameters
  .unset NAME          Remove parameter :NAME

SQL ends with a semicolon at the end of a line. Statements separated by
";" followed by a newline run together; results of each are shown.
Use Ctrl+C to cancel a multi-line query, Ctrl+D or .quit to exit."#
        .to_string()
}

fn load(session: &mut Session, args: &[&str]) -> CommandResult {
    let [name, path] = args else {
        return CommandResult::Error("Usage: .load NAME PATH".to_string());
    };
    let already = session.is_materialized(name);
    match session.load_csv(name, path) {
        Ok(rows) if already => CommandResult::Output(format!(
            "Loaded {} rows into '{}'; the table was already used in this session and keeps its earlier data.",
            rows, name
        )),
        Ok(rows) => CommandResult::Output(format!("Loaded {} rows into '{}'.", rows, name)),
        Err(e) => CommandResult::Error(format!("{:#}", e)),
    }
}

fn list_tables(session: &Session) -> CommandResult {
    let mut lines: Vec<String> = session
        .tables()
        .iter()
        .map(|(name, frame)| {
            let state = if session.is_materialized(name) { "materialized" } else { "pending" };
            format!("{} ({} rows, {})", name, frame.row_count(), state)
        })
        .collect();

    match session.engine().store().table_names() {
        Ok(names) => lines.extend(
            names
                .into_iter()
                .filter(|name| !session.tables().contains_key(name))
                .map(|name| format!("{} (store)", name)),
        ),
        Err(e) => return CommandResult::Error(format!("{:#}", e)),
    }

    if lines.is_empty() {
        CommandResult::Output("No tables found.".to_string())
    } else {
        CommandResult::Output(lines.join("\n"))
    }
}

fn set_param(session: &mut Session, input: &str, args: &[&str]) -> CommandResult {
    let Some(name) = args.first() else {
        return CommandResult::Error("Usage: .param NAME VALUE".to_string());
    };
    // VALUE is the raw rest of the line so text may contain spaces.
    let rest = input
        .trim()
        .splitn(3, char::is_whitespace)
        .nth(2)
        .map(str::trim)
        .unwrap_or_default();
    if rest.is_empty() {
        return CommandResult::Error("Usage: .param NAME VALUE".to_string());
    }
    let name = name.trim_start_matches([':', '@', '$']);
    session.params_mut().insert(name, Value::parse_literal(rest));
    CommandResult::Continue
}

fn list_params(session: &Session) -> CommandResult {
    if session.params().is_empty() {
        return CommandResult::Output("No parameters set.".to_string());
    }
    let lines: Vec<String> = session
        .params()
        .iter()
        .map(|(name, value)| format!(":{} = {}", name, value))
        .collect();
    CommandResult::Output(lines.join("\n"))
}

fn unset_param(session: &mut Session, args: &[&str]) -> CommandResult {
    let [name] = args else {
        return CommandResult::Error("Usage: .unset NAME".to_string());
    };
    let name = name.trim_start_matches([':', '@', '$']);
    match session.params_mut().remove(name) {
        Some(_) => CommandResult::Continue,
        None => CommandResult::Error(format!("Parameter '{}' is not set.", name)),
    }
}
