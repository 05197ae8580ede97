//! Diagnostics: accumulated errors with source positions.
//!
//! Every error renders as `<filename>:<line>: <category>: <message>`.
//! The checker keeps walking after an error to surface as many problems
//! as it can; the sink preserves emission order, which follows source
//! order.

use std::fmt;

use serde::Serialize;

use crate::style::Style;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Lex,
    Type,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Lex => write!(f, "lex error"),
            Category::Type => write!(f, "type error"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub category: Category,
    pub filename: String,
    pub line: u32,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {}: {}",
            self.filename, self.line, self.category, self.message
        )
    }
}

impl Diagnostic {
    /// Terminal rendering with a colored category label.
    pub fn render_colored(&self) -> String {
        format!(
            "{}:{}: {}: {}",
            Style::blue(&self.filename),
            self.line,
            Style::bold_red(&self.category.to_string()),
            self.message
        )
    }
}

/// Accumulating sink. Order of insertion is preserved.
#[derive(Debug, Default)]
pub struct Diagnostics {
    list: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics::default()
    }

    pub fn lex_error(&mut self, filename: &str, line: u32, message: impl Into<String>) {
        self.list.push(Diagnostic {
            category: Category::Lex,
            filename: filename.to_string(),
            line,
            message: message.into(),
        });
    }

    pub fn type_error(&mut self, filename: &str, line: u32, message: impl Into<String>) {
        self.list.push(Diagnostic {
            category: Category::Type,
            filename: filename.to_string(),
            line,
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        !self.list.is_empty()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.list.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.list
    }
}
