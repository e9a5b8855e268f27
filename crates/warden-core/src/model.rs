//! Model text intake.
//!
//! casbin owns the model semantics. Before handing it the text we read the
//! parts the service itself depends on: request fields (for parameter
//! translation), the declared rule-set types, and the matcher, which must stay
//! within [`MAX_MATCHER_NESTING`].

use crate::error::{Result, WardenError};
use crate::policy::RuleKind;

/// Deepest bracket nesting plus prefix-operator run accepted in a matcher.
pub const MAX_MATCHER_NESTING: usize = 64;

const SECTIONS: [(&str, &str); 5] = [
    ("request_definition", "r"),
    ("policy_definition", "p"),
    ("role_definition", "g"),
    ("policy_effect", "e"),
    ("matchers", "m"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelShape {
    request_tokens: Vec<String>,
    policy_types: Vec<String>,
    role_types: Vec<String>,
    matcher: String,
}

impl ModelShape {
    pub fn scan(text: &str) -> Result<Self> {
        let mut request_tokens = None;
        let mut effect = None;
        let mut matcher = None;
        let mut policy_types = Vec::new();
        let mut role_types = Vec::new();
        let mut section: Option<&'static str> = None;

        for (line_no, line) in logical_lines(text) {
            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                let sec = SECTIONS
                    .iter()
                    .find(|(header, _)| *header == name.trim())
                    .map(|(_, sec)| *sec)
                    .ok_or_else(|| {
                        WardenError::Construction(format!(
                            "line {line_no}: unknown section [{name}]"
                        ))
                    })?;
                section = Some(sec);
                continue;
            }

            let sec = section.ok_or_else(|| {
                WardenError::Construction(format!("line {line_no}: entry outside any section"))
            })?;
            let (key, value) = line.split_once('=').ok_or_else(|| {
                WardenError::Construction(format!("line {line_no}: expected `key = value`"))
            })?;
            let (key, value) = (key.trim(), value.trim());

            let valid_key = key.starts_with(sec)
                && key[sec.len()..].chars().all(|c| c.is_ascii_alphanumeric());
            if !valid_key || value.is_empty() {
                return Err(WardenError::Construction(format!(
                    "line {line_no}: bad entry {key} in section {sec}"
                )));
            }

            match (sec, key) {
                ("r", "r") => request_tokens = Some(split_tokens(value)),
                ("e", "e") => effect = Some(value.to_string()),
                ("m", "m") => matcher = Some(value.to_string()),
                ("p", _) => policy_types.push(key.to_string()),
                ("g", _) => role_types.push(key.to_string()),
                _ => {}
            }
        }

        let missing = |what: &str| WardenError::Construction(format!("model has no {what}"));
        let request_tokens = request_tokens.ok_or_else(|| missing("request definition `r`"))?;
        effect.ok_or_else(|| missing("policy effect `e`"))?;
        let matcher = matcher.ok_or_else(|| missing("matcher `m`"))?;
        if !policy_types.iter().any(|t| t == "p") {
            return Err(missing("policy definition `p`"));
        }
        check_nesting(&matcher)?;

        Ok(Self {
            request_tokens,
            policy_types,
            role_types,
            matcher,
        })
    }

    pub fn request_tokens(&self) -> &[String] {
        &self.request_tokens
    }

    pub fn matcher(&self) -> &str {
        &self.matcher
    }

    /// Declared rule-set types of one kind, in model order.
    pub fn types(&self, kind: RuleKind) -> &[String] {
        match kind {
            RuleKind::Policy => &self.policy_types,
            RuleKind::Grouping => &self.role_types,
        }
    }

    pub fn has_type(&self, kind: RuleKind, ptype: &str) -> bool {
        self.types(kind).iter().any(|t| t == ptype)
    }
}

fn split_tokens(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Rejects matchers nested deeper than [`MAX_MATCHER_NESTING`] or with
/// unbalanced brackets. Single pass, no recursion.
fn check_nesting(matcher: &str) -> Result<()> {
    let too_deep = || {
        WardenError::Construction(format!(
            "matcher nests deeper than {MAX_MATCHER_NESTING} levels"
        ))
    };
    let unbalanced = || WardenError::Construction("matcher has unbalanced brackets".into());

    let mut depth = 0usize;
    let mut prefix_run = 0usize;
    let mut quote: Option<char> = None;
    let mut chars = matcher.chars().peekable();

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            if c == '\\' {
                chars.next();
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => {
                depth = depth.checked_sub(1).ok_or_else(unbalanced)?;
                prefix_run = 0;
            }
            '!' if chars.peek() == Some(&'=') => {}
            '!' | '-' | '+' => prefix_run += 1,
            '"' | '\'' | '`' => {
                quote = Some(c);
                prefix_run = 0;
            }
            c if c.is_alphanumeric() || c == '_' || c == '.' => prefix_run = 0,
            _ => {}
        }
        if depth + prefix_run > MAX_MATCHER_NESTING {
            return Err(too_deep());
        }
    }

    if depth != 0 || quote.is_some() {
        return Err(unbalanced());
    }
    Ok(())
}

/// Join `\` continuations and drop blanks and comments. Yields (first line number, text).
fn logical_lines(text: &str) -> Vec<(usize, String)> {
    let mut out = Vec::new();
    let mut buf = String::new();
    let mut start = 0;

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if buf.is_empty() {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            start = idx + 1;
        }
        if let Some(head) = line.strip_suffix('\\') {
            buf.push_str(head.trim_end());
            buf.push(' ');
            continue;
        }
        buf.push_str(line);
        out.push((start, std::mem::take(&mut buf)));
    }
    if !buf.is_empty() {
        out.push((start, buf.trim_end().to_string()));
    }
    out
}
