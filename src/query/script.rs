//! # Script Splitting and Table Discovery
//!
//! Two passes over raw SQL text, neither of which parses SQL:
//!
//! - [`split_statements`] cuts a script on the literal separator `;\n` and
//!   drops pieces that contain nothing executable (whitespace, semicolons,
//!   comments).
//! - [`extract_table_names`] scans the whole, unsplit script for the names
//!   that follow `FROM` and `JOIN`, so that every frame a script touches can
//!   be materialized before its first statement runs.
//!
//! ## Tokens
//!
//! Both passes share a small tokenizer that only distinguishes what matters
//! for finding table names:
//!
//! | Input                         | Token            |
//! |-------------------------------|------------------|
//! | `name`, `_x1`, `tbl$2`        | `Word`           |
//! | `"a b"`, `` `a` ``, `[a]`     | `Quoted`         |
//! | `,`  `.`  `;`                 | punctuation      |
//! | `'text'`, numbers, operators  | `Other`          |
//! | `-- ...`, `/* ... */`         | skipped          |
//!
//! String literals and comments therefore never produce table names.
//!
//! ## Table References
//!
//! After `FROM` or `JOIN` the scanner reads a comma list of references, each
//! optionally aliased:
//!
//! ```text
//! FROM a, "b c" AS x, d y JOIN e ON ...
//!      ^  ^^^^^         ^      ^
//! ```
//!
//! Schema-qualified names (`main.t`) name tables that already live in the
//! store and are not reported. A parenthesis (subquery) ends the list.

use phf::phf_set;
use smallvec::SmallVec;

use crate::config::STATEMENT_SEPARATOR;

/// Statements of one script, in order.
pub type Statements<'a> = SmallVec<[&'a str; 4]>;

/// Words that can follow a table reference and so can never be an alias.
static RESERVED: phf::Set<&'static str> = phf_set! {
    "AS", "CROSS", "EXCEPT", "FROM", "FULL", "GROUP", "HAVING", "INDEXED",
    "INNER", "INTERSECT", "JOIN", "LEFT", "LIMIT", "NATURAL", "NOT", "OFFSET",
    "ON", "ORDER", "OUTER", "RETURNING", "RIGHT", "SELECT", "SET", "UNION",
    "USING", "VALUES", "WHERE", "WINDOW",
};

/// Splits `script` on `;\n`, trimming each piece and dropping those with no
/// executable content.
pub fn split_statements(script: &str) -> Statements<'_> {
    script
        .split(STATEMENT_SEPARATOR)
        .map(str::trim)
        .filter(|statement| !is_blank(statement))
        .collect()
}

/// True when `statement` holds only whitespace, semicolons and comments.
pub fn is_blank(statement: &str) -> bool {
    Tokenizer::new(statement).all(|token| token == Token::Semicolon)
}

/// Names referenced after `FROM` / `JOIN`, in first-appearance order and
/// without duplicates.
pub fn extract_table_names(script: &str) -> Vec<String> {
    let tokens: Vec<Token<'_>> = Tokenizer::new(script).collect();
    let mut names = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        if tokens[i].is_word("FROM") || tokens[i].is_word("JOIN") {
            i = read_table_list(&tokens, i + 1, &mut names);
        } else {
            i += 1;
        }
    }

    names
}

fn read_table_list(tokens: &[Token<'_>], mut i: usize, names: &mut Vec<String>) -> usize {
    loop {
        let Some(name) = tokens.get(i).and_then(Token::identifier) else {
            return i;
        };
        i += 1;

        if tokens.get(i) == Some(&Token::Dot) {
            i += 2;
        } else if !names.contains(&name) {
            names.push(name);
        }

        if tokens.get(i).is_some_and(|t| t.is_word("AS")) {
            i += 1;
        }
        if tokens.get(i).and_then(Token::identifier).is_some() {
            i += 1;
        }

        if tokens.get(i) == Some(&Token::Comma) {
            i += 1;
        } else {
            return i;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token<'a> {
    Word(&'a str),
    Quoted(String),
    Comma,
    Dot,
    Semicolon,
    Other,
}

impl Token<'_> {
    fn is_word(&self, keyword: &str) -> bool {
        matches!(self, Token::Word(w) if w.eq_ignore_ascii_case(keyword))
    }

    fn identifier(&self) -> Option<String> {
        match self {
            Token::Word(w) if !RESERVED.contains(w.to_ascii_uppercase().as_str()) => {
                Some(w.to_string())
            }
            Token::Quoted(q) => Some(q.clone()),
            _ => None,
        }
    }
}

struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self, offset: usize) -> Option<u8> {
        self.input.as_bytes().get(self.pos + offset).copied()
    }

    fn skip_line_comment(&mut self) {
        match self.input[self.pos..].find('\n') {
            Some(end) => self.pos += end + 1,
            None => self.pos = self.input.len(),
        }
    }

    fn skip_block_comment(&mut self) {
        match self.input[self.pos + 2..].find("*/") {
            Some(end) => self.pos += end + 4,
            None => self.pos = self.input.len(),
        }
    }

    /// Consumes a delimited run; a doubled closing delimiter is an escaped
    /// one when it equals the opening delimiter.
    fn delimited(&mut self, open: u8, close: u8) -> String {
        self.pos += 1;
        let mut text = String::new();
        loop {
            let rest = &self.input[self.pos..];
            let Some(end) = rest.bytes().position(|b| b == close) else {
                text.push_str(rest);
                self.pos = self.input.len();
                return text;
            };
            text.push_str(&rest[..end]);
            self.pos += end + 1;
            if open == close && self.peek(0) == Some(close) {
                text.push(close as char);
                self.pos += 1;
            } else {
                return text;
            }
        }
    }

    fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek(0).is_some_and(&pred) {
            self.pos += 1;
        }
        &self.input[start..self.pos]
    }
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        loop {
            self.take_while(|b| b.is_ascii_whitespace());
            let b = self.peek(0)?;

            return Some(match b {
                b'-' if self.peek(1) == Some(b'-') => {
                    self.skip_line_comment();
                    continue;
                }
                b'/' if self.peek(1) == Some(b'*') => {
                    self.skip_block_comment();
                    continue;
                }
                b'\'' => {
                    self.delimited(b'\'', b'\'');
                    Token::Other
                }
                b'"' => Token::Quoted(self.delimited(b'"', b'"')),
                b'`' => Token::Quoted(self.delimited(b'`', b'`')),
                b'[' => Token::Quoted(self.delimited(b'[', b']')),
                b',' => {
                    self.pos += 1;
                    Token::Comma
                }
                b'.' => {
                    self.pos += 1;
                    Token::Dot
                }
                b';' => {
                    self.pos += 1;
                    Token::Semicolon
                }
                b if b.is_ascii_digit() => {
                    self.take_while(|b| is_word_byte(b) || b == b'.');
                    Token::Other
                }
                b if is_word_byte(b) && b != b'$' => Token::Word(self.take_while(is_word_byte)),
                _ => {
                    self.pos += 1;
                    Token::Other
                }
            });
        }
    }
}
