//! G-Code parser

use super::{
    types::{Statement, StatementKind},
    words::COMMAND_LETTERS,
};
use nom::{
    branch::alt,
    character::complete::{anychar, char, digit0, one_of, satisfy},
    combinator::{all_consuming, map, opt, recognize},
    multi::many0,
    sequence::{pair, tuple},
    IResult,
};
use std::collections::BTreeMap;

/// Letter with the numeric text following it, possibly empty
#[derive(Debug, Clone, PartialEq)]
struct Token<'a> {
    letter: char,
    text: &'a str,
}

impl Token<'_> {
    fn value(&self) -> Option<f64> {
        self.text.parse().ok()
    }
}

/// Parse program text into statements
pub fn parse(text: &str) -> Vec<Statement> {
    let mut statements = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        parse_line(raw, idx + 1, &mut statements);
    }
    statements
}

/// Parse a single source line, appending its statements
pub fn parse_line(raw: &str, source_line: usize, out: &mut Vec<Statement>) {
    let code: String = strip_comment(raw)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();
    if code.is_empty() {
        return;
    }

    let mut builder = StatementBuilder::new(source_line, raw);
    for token in tokenize(&code) {
        if let Some(done) = builder.push(token) {
            out.push(done);
        }
    }
    out.extend(builder.finish());
}

/// Code portion of a line: everything before the first `(` or `;`
pub fn strip_comment(line: &str) -> &str {
    match line.find(|c: char| c == '(' || c == ';') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

fn tokenize(code: &str) -> Vec<Token<'_>> {
    let skip = map(anychar, |_| None);
    match all_consuming(many0(alt((map(token, Some), skip))))(code) {
        Ok((_, tokens)) => tokens.into_iter().flatten().collect(),
        Err(_) => Vec::new(),
    }
}

fn token(input: &str) -> IResult<&str, Token<'_>> {
    map(
        pair(satisfy(|c| c.is_ascii_uppercase()), number),
        |(letter, text)| Token { letter, text },
    )(input)
}

/// `[-+]?digits[.digits]`, every part optional
fn number(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        opt(one_of("+-")),
        digit0,
        opt(pair(char('.'), digit0)),
    )))(input)
}

/// Accumulates one statement, flushing when a second command letter shows up
#[derive(Debug)]
struct StatementBuilder<'a> {
    source_line: usize,
    raw: &'a str,
    current: Option<Pending>,
}

#[derive(Debug, Default)]
struct Pending {
    command: Option<(StatementKind, Option<u32>, Option<String>)>,
    params: BTreeMap<char, f64>,
}

impl<'a> StatementBuilder<'a> {
    fn new(source_line: usize, raw: &'a str) -> Self {
        Self {
            source_line,
            raw,
            current: None,
        }
    }

    fn push(&mut self, token: Token) -> Option<Statement> {
        let value = token.value();
        if !COMMAND_LETTERS.contains(&token.letter) {
            let pending = self.current.get_or_insert_with(Pending::default);
            pending
                .params
                .insert(token.letter, value.unwrap_or(f64::NAN));
            return None;
        }

        let has_command = self.current.as_ref().map_or(false, |p| p.command.is_some());
        let flushed = if has_command {
            self.current.take().map(|p| self.build(p))
        } else {
            None
        };

        let kind = StatementKind::from_letter(token.letter).unwrap_or(StatementKind::G);
        let code = value.and_then(integral_code);
        let text = Some(token.text.to_owned()).filter(|t| !t.is_empty());
        self.current.get_or_insert_with(Pending::default).command = Some((kind, code, text));

        flushed
    }

    fn finish(mut self) -> Option<Statement> {
        self.current.take().map(|p| self.build(p))
    }

    fn build(&self, pending: Pending) -> Statement {
        let (kind, code, code_text) = pending.command.unwrap_or((StatementKind::G, None, None));
        Statement {
            kind,
            code,
            code_text,
            params: pending.params,
            source_line: self.source_line,
            raw_text: self.raw.to_owned(),
        }
    }
}

fn integral_code(v: f64) -> Option<u32> {
    (v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= u32::MAX as f64).then_some(v as u32)
}

#[cfg(test)]
mod tests {
    use super::{parse, strip_comment, tokenize, Token};
    use crate::gcode::types::StatementKind;

    #[test]
    fn tokens() {
        let t = tokenize("G01X-10.5Z.5F");
        assert_eq!(
            t,
            vec![
                Token { letter: 'G', text: "01" },
                Token { letter: 'X', text: "-10.5" },
                Token { letter: 'Z', text: ".5" },
                Token { letter: 'F', text: "" },
            ]
        );
        assert_eq!(t[3].value(), None);
    }

    #[test]
    fn junk_is_skipped() {
        let t = tokenize("%/G0");
        assert_eq!(t, vec![Token { letter: 'G', text: "0" }]);
    }

    #[test]
    fn comments() {
        assert_eq!(strip_comment("G0 X1 (rapid; fast)"), "G0 X1 ");
        assert_eq!(strip_comment("G0 ; a (b)"), "G0 ");
        assert_eq!(strip_comment("G0"), "G0");
    }

    #[test]
    fn comment_lines_keep_numbering() {
        let s = parse("(header)\n\n; note\ng0 x 10 z5");
        assert_eq!(s.len(), 1);
        assert_eq!(s[0].source_line, 4);
        assert_eq!(s[0].code, Some(0));
        assert_eq!(s[0].param('X'), Some(10.0));
        assert_eq!(s[0].param('Z'), Some(5.0));
        assert_eq!(s[0].raw_text, "g0 x 10 z5");
    }

    #[test]
    fn split_on_command_letters() {
        let s = parse("G01 X10 M03 S500");
        assert_eq!(s.len(), 2);
        assert_eq!(s[0].kind, StatementKind::G);
        assert_eq!(s[0].code, Some(1));
        assert_eq!(s[0].param('X'), Some(10.0));
        assert_eq!(s[0].param('S'), None);
        assert_eq!(s[1].kind, StatementKind::M);
        assert_eq!(s[1].code, Some(3));
        assert_eq!(s[1].param('S'), Some(500.0));
        assert!(s.iter().all(|s| s.source_line == 1));
    }

    #[test]
    fn leading_params_join_first_command() {
        let s = parse("X10 G01 Z5");
        assert_eq!(s.len(), 1);
        assert_eq!(s[0].code, Some(1));
        assert_eq!(s[0].param('X'), Some(10.0));
        assert_eq!(s[0].param('Z'), Some(5.0));
    }

    #[test]
    fn continuation_line() {
        let s = parse("Z-20 F0.2");
        assert_eq!(s.len(), 1);
        assert_eq!(s[0].kind, StatementKind::G);
        assert_eq!(s[0].code, None);
        assert_eq!(s[0].code_text, None);
    }

    #[test]
    fn tool_code_text() {
        let s = parse("T0101");
        assert_eq!(s[0].kind, StatementKind::T);
        assert_eq!(s[0].code, Some(101));
        assert_eq!(s[0].code_text.as_deref(), Some("0101"));
    }

    #[test]
    fn malformed_code() {
        let s = parse("G1.5 X1");
        assert_eq!(s[0].code, None);
        assert_eq!(s[0].code_text.as_deref(), Some("1.5"));
    }

    #[test]
    fn duplicate_param_keeps_last() {
        let s = parse("G1 X1 X2");
        assert_eq!(s[0].param('X'), Some(2.0));
    }
}
