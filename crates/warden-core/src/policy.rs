//! Persisted rule lines and the rule-set families they belong to.

use std::fmt;

/// Which family of rule sets an operation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// Permission rules (`p`, `p2`, ...).
    Policy,
    /// Role inheritance rules (`g`, `g2`, ...).
    Grouping,
}

impl RuleKind {
    pub fn section(self) -> &'static str {
        match self {
            RuleKind::Policy => "p",
            RuleKind::Grouping => "g",
        }
    }

    /// Rule-set type used by the unnamed convenience calls.
    pub fn default_type(self) -> &'static str {
        self.section()
    }

    /// Family of a rule-set type, read from its leading letter.
    pub fn from_type(ptype: &str) -> Option<Self> {
        match ptype.as_bytes().first() {
            Some(b'p') => Some(RuleKind::Policy),
            Some(b'g') => Some(RuleKind::Grouping),
            _ => None,
        }
    }
}

/// One persisted rule: `p, alice, data1, read`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyLine {
    pub ptype: String,
    pub rule: Vec<String>,
}

impl PolicyLine {
    pub fn new(ptype: impl Into<String>, rule: Vec<String>) -> Self {
        Self {
            ptype: ptype.into(),
            rule,
        }
    }

    /// Parse one CSV line. Blank lines, comments and lines without fields yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        let mut fields = line.split(',').map(|f| f.trim().to_string());
        let ptype = fields.next().filter(|p| !p.is_empty())?;
        let rule: Vec<String> = fields.collect();
        if rule.is_empty() {
            return None;
        }
        Some(Self { ptype, rule })
    }

    pub fn kind(&self) -> Option<RuleKind> {
        RuleKind::from_type(&self.ptype)
    }
}

impl fmt::Display for PolicyLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.ptype)?;
        for field in &self.rule {
            write!(f, ", {field}")?;
        }
        Ok(())
    }
}

/// `field_values[i]` constrains `rule[field_index + i]`; an empty value matches anything.
pub(crate) fn matches_filter(rule: &[String], field_index: usize, field_values: &[String]) -> bool {
    field_values.iter().enumerate().all(|(offset, expected)| {
        expected.is_empty()
            || rule
                .get(field_index + offset)
                .is_some_and(|actual| actual == expected)
    })
}

/// Distinct values at one field position, in first-seen order.
pub(crate) fn distinct_field(rules: &[Vec<String>], field_index: usize) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in rules.iter().filter_map(|rule| rule.get(field_index)) {
        if !out.contains(value) {
            out.push(value.clone());
        }
    }
    out
}
