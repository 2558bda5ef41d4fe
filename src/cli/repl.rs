//! # REPL - Read-Eval-Print Loop
//!
//! Reads SQL and dot commands, runs SQL on the session's engine and prints
//! every result frame.
//!
//! ## Input Handling
//!
//! - Dot commands start with `.` and run immediately.
//! - SQL accumulates until a line ends with `;`. Lines are joined with a
//!   newline, the way a query node's text reads.
//!
//! The prompt changes from `frameql> ` to `     -> ` in continuation mode:
//!
//! ```text
//! frameql> SELECT name
//!      ->   FROM people
//!      ->  WHERE id = :min;
//! ```
//!
//! ## Errors
//!
//! SQL errors are printed and the REPL keeps going. `.quit` or Ctrl+D exits.

use std::time::{Duration, Instant};

use eyre::{Result, WrapErr};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::cli::commands::{CommandHandler, CommandResult};
use crate::cli::history::history_path;
use crate::cli::session::Session;
use crate::cli::table::TableFormatter;
use crate::frame::DataFrame;
use crate::query::QueryOutput;

const PRIMARY_PROMPT: &str = "frameql> ";
const CONTINUATION_PROMPT: &str = "     -> ";

pub struct Repl {
    session: Session,
    editor: DefaultEditor,
    sql_buffer: String,
}

impl Repl {
    pub fn new(session: Session) -> Result<Self> {
        let mut editor = DefaultEditor::new().wrap_err("failed to initialize line editor")?;

        if let Some(history_file) = history_path() {
            let _ = editor.load_history(&history_file);
        }

        Ok(Self {
            session,
            editor,
            sql_buffer: String::new(),
        })
    }

    pub fn run(&mut self) -> Result<()> {
        self.print_welcome();

        loop {
            let prompt = if self.sql_buffer.is_empty() {
                PRIMARY_PROMPT
            } else {
                CONTINUATION_PROMPT
            };

            match self.editor.readline(prompt) {
                Ok(line) => {
                    if !self.handle_line(&line) {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    self.sql_buffer.clear();
                    println!("^C");
                }
                Err(ReadlineError::Eof) => {
                    println!("Bye");
                    break;
                }
                Err(err) => {
                    eprintln!("Error reading input: {}", err);
                    break;
                }
            }
        }

        self.save_history();
        Ok(())
    }

    fn handle_line(&mut self, line: &str) -> bool {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            return true;
        }

        if self.sql_buffer.is_empty() && CommandHandler::is_command(trimmed) {
            self.editor.add_history_entry(trimmed).ok();
            return self.execute_command(trimmed);
        }

        if !self.sql_buffer.is_empty() {
            self.sql_buffer.push('\n');
        }
        self.sql_buffer.push_str(trimmed);

        if self.sql_buffer.ends_with(';') {
            let sql = std::mem::take(&mut self.sql_buffer);
            self.editor.add_history_entry(&sql).ok();
            self.execute_sql(&sql);
        }

        true
    }

    fn execute_command(&mut self, input: &str) -> bool {
        match CommandHandler::execute(input, &mut self.session) {
            CommandResult::Exit => false,
            CommandResult::Output(text) => {
                println!("{}", text);
                true
            }
            CommandResult::Continue => true,
            CommandResult::Error(msg) => {
                eprintln!("Error: {}", msg);
                true
            }
        }
    }

    fn execute_sql(&mut self, sql: &str) {
        let start = Instant::now();

        match self.session.run(sql) {
            Ok(output) => print_output(&output, start.elapsed()),
            Err(err) => eprintln!("Error: {:#}", err),
        }
    }

    fn print_welcome(&self) {
        println!("frameql version {}", env!("CARGO_PKG_VERSION"));
        println!("Enter \".help\" for usage hints.");
        let tables = self.session.tables().len();
        if tables > 0 {
            println!("{} table{} loaded.", tables, plural(tables));
        }
        println!();
    }

    fn save_history(&mut self) {
        if let Some(history_file) = history_path() {
            if let Err(e) = self.editor.save_history(&history_file) {
                eprintln!("Warning: could not save history: {}", e);
            }
        }
    }
}

pub fn print_output(output: &QueryOutput, elapsed: Duration) {
    if output.is_empty() {
        println!("Query OK ({:.3} sec)", elapsed.as_secs_f64());
        return;
    }
    for frame in output.frames() {
        print_frame(frame);
    }
    println!("({:.3} sec)", elapsed.as_secs_f64());
}

pub fn print_frame(frame: &DataFrame) {
    if frame.column_count() == 0 {
        println!("Empty set");
        return;
    }
    let formatter = TableFormatter::new(frame);
    print!("{}", formatter.render());
    let rows = formatter.row_count();
    println!("{} row{} in set", rows, plural(rows));
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}
