//! G-code program file

use super::{parser::parse, types::Statement};
use std::{fs, io, path::Path};

/// Parsed G-Code program, text kept for echo
#[derive(Debug, Clone, Default)]
pub struct GCodeFile {
    text: String,
    statements: Vec<Statement>,
}

impl GCodeFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, io::Error> {
        let text = fs::read_to_string(path)?;
        Ok(Self::from_text(text))
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let statements = parse(&text);
        log::debug!("Parsed {} statements", statements.len());
        Self { text, statements }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn into_statements(self) -> Vec<Statement> {
        self.statements
    }
}
