//! Row filters for drilling into a subset of the dataset
//!
//! `column=value` matches one exact (normalized) value, `column~pattern`
//! matches a case-insensitive regex anywhere in the field.

use super::{Column, DatasetError, Record};
use regex::{Regex, RegexBuilder};

#[derive(Debug, Clone)]
pub enum Matcher {
    Exact(String),
    Pattern(Regex),
}

#[derive(Debug, Clone)]
pub struct RowFilter {
    pub column: Column,
    pub matcher: Matcher,
}

impl RowFilter {
    pub fn parse(expr: &str) -> Result<Self, DatasetError> {
        let invalid = |reason: &str| DatasetError::InvalidFilter {
            expr: expr.to_string(),
            reason: reason.to_string(),
        };

        let split = expr
            .find(['=', '~'])
            .ok_or_else(|| invalid("expected column=value or column~pattern"))?;
        let (name, rest) = expr.split_at(split);
        let column: Column = name.parse()?;
        let value = &rest[1..];
        if value.trim().is_empty() {
            return Err(invalid("empty value"));
        }

        let matcher = if rest.starts_with('=') {
            Matcher::Exact(value.trim().to_lowercase())
        } else {
            let regex = RegexBuilder::new(value)
                .case_insensitive(true)
                .build()
                .map_err(|e| invalid(&e.to_string()))?;
            Matcher::Pattern(regex)
        };

        Ok(Self { column, matcher })
    }

    pub fn matches(&self, record: &Record) -> bool {
        let field = record.field(self.column);
        match &self.matcher {
            Matcher::Exact(v) => field == v.as_str(),
            Matcher::Pattern(re) => re.is_match(&field),
        }
    }
}

impl std::fmt::Display for RowFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.matcher {
            Matcher::Exact(v) => write!(f, "{}={}", self.column, v),
            Matcher::Pattern(re) => write!(f, "{}~{}", self.column, re.as_str()),
        }
    }
}
