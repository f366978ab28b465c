//! Types for G-Code interpreter

use serde::Serialize;
use std::{collections::BTreeMap, fmt};
use strum::Display;

/// Statement command class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum StatementKind {
    G,
    M,
    T,
    S,
    F,
    Comment,
}

impl StatementKind {
    /// Command class of a letter, if it starts one
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'G' => Some(Self::G),
            'M' => Some(Self::M),
            'T' => Some(Self::T),
            _ => None,
        }
    }
}

/// One parsed instruction unit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    pub kind: StatementKind,
    /// Integral command number, absent for continuation lines or malformed numbers
    pub code: Option<u32>,
    /// Command number exactly as written, e.g. "0101"
    pub code_text: Option<String>,
    /// Parameter letters; bare letters are stored as NaN
    pub params: BTreeMap<char, f64>,
    /// 1-based line in the program text
    pub source_line: usize,
    pub raw_text: String,
}

impl Statement {
    /// Parameter value if given and usable
    pub fn param(&self, letter: char) -> Option<f64> {
        self.params.get(&letter).copied().filter(|v| v.is_finite())
    }

    /// Whether any of `letters` carries a usable value
    pub fn has_any(&self, letters: &[char]) -> bool {
        letters.iter().any(|&l| self.param(l).is_some())
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (&self.code_text, self.kind) {
            (_, StatementKind::Comment) => write!(f, "({})", self.raw_text)?,
            (Some(c), k) => write!(f, "{k}{c}")?,
            (None, _) => (),
        }
        for (letter, value) in &self.params {
            if value.is_nan() {
                write!(f, " {letter}")?;
            } else {
                write!(f, " {letter}{value}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Statement, StatementKind};
    use std::collections::BTreeMap;

    fn stmt(params: &[(char, f64)]) -> Statement {
        Statement {
            kind: StatementKind::G,
            code: Some(1),
            code_text: Some("01".into()),
            params: params.iter().copied().collect::<BTreeMap<_, _>>(),
            source_line: 1,
            raw_text: String::new(),
        }
    }

    #[test]
    fn nan_params_are_absent() {
        let s = stmt(&[('X', 10.0), ('Z', f64::NAN)]);
        assert_eq!(s.param('X'), Some(10.0));
        assert_eq!(s.param('Z'), None);
        assert_eq!(s.param('U'), None);
        assert!(s.has_any(&['U', 'X']));
        assert!(!s.has_any(&['Z', 'W']));
    }

    #[test]
    fn format() {
        let s = stmt(&[('X', 10.5), ('Z', -2.0)]);
        assert_eq!(s.to_string(), "G01 X10.5 Z-2");
    }
}
