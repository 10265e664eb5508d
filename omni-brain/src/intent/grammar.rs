//! Tag grammar for classifier output
//!
//! **[BRN-INT-030]** The fast model answers with newline-delimited
//! `TAG:payload` lines. This module is the only place that knows the tag
//! strings and their priority; it is independently testable from the model.

use std::fmt;

/// One parsed intent line from classifier output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Calc(String),
    Search(String),
    Person(String),
    Place(String),
    Install(String),
    Open(String),
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::Calc(p) => write!(f, "CALC:{}", p),
            Directive::Search(p) => write!(f, "SEARCH:{}", p),
            Directive::Person(p) => write!(f, "PERSON:{}", p),
            Directive::Place(p) => write!(f, "PLACE:{}", p),
            Directive::Install(p) => write!(f, "INSTALL:{}", p),
            Directive::Open(p) => write!(f, "OPEN:{}", p),
        }
    }
}

/// Ordered tag table. A line can syntactically contain several tag tokens;
/// the first entry here that appears as a substring wins, so the order IS
/// the priority.
const TAG_TABLE: [(&str, fn(String) -> Directive); 6] = [
    ("CALC:", Directive::Calc),
    ("SEARCH:", Directive::Search),
    ("PERSON:", Directive::Person),
    ("PLACE:", Directive::Place),
    ("INSTALL:", Directive::Install),
    ("OPEN:", Directive::Open),
];

/// Parse a single classifier line. Returns `None` for lines matching no
/// tag; those are dropped silently by the caller.
pub fn parse_line(line: &str) -> Option<Directive> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    for (tag, build) in TAG_TABLE {
        if let Some(at) = line.find(tag) {
            let payload = line[at + tag.len()..].trim().to_string();
            return Some(build(payload));
        }
    }
    None
}

/// Parse a whole classifier response into directives, preserving line
/// order. Blank and unmatched lines are dropped.
pub fn parse_output(text: &str) -> Vec<Directive> {
    text.lines().filter_map(parse_line).collect()
}
