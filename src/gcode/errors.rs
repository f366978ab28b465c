//! G-Code processing errors

use thiserror::Error;

/// Simple error message from bottom level, not yet tied to a source line
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    /// G word outside of the supported set, with its number as written
    #[error("Unsupported G code 'G{0}'")]
    UnsupportedGCode(String),
}

impl SyntaxError {
    /// Accompany `SyntaxError` with a 1-based source line number
    pub fn at_line(self, line: usize) -> SimError {
        SimError { error: self, line }
    }
}

/// Error message with line number
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("At line {line}: {error}")]
pub struct SimError {
    pub error: SyntaxError,
    pub line: usize,
}

impl SimError {
    /// 1-based source line of the offending statement
    pub fn line(&self) -> usize {
        self.line
    }

    /// Message without the line prefix
    pub fn message(&self) -> String {
        self.error.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::SyntaxError;

    #[test]
    fn display_with_line() {
        let e = SyntaxError::UnsupportedGCode("999".into()).at_line(5);
        assert_eq!(e.line(), 5);
        assert_eq!(e.message(), "Unsupported G code 'G999'");
        assert_eq!(e.to_string(), "At line 5: Unsupported G code 'G999'");
    }
}
