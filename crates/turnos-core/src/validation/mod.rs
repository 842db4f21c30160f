//! Declarative validation for booking and admin forms.
//!
//! Field validators return a single message for the first rule that fails.
//! Form validators run every field, collect one [`ValidationIssue`] per failing
//! field (keyed by its camelCase path) and only produce the typed, normalized
//! value when nothing failed. Nothing in this module panics or performs I/O;
//! "today" comes from the [`ValidationContext`].

mod fields;
mod forms;

pub use fields::*;
pub use forms::*;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One failing field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationIssue {
    /// camelCase field path, dotted for nested fields (`contactInfo.email`)
    pub path: String,
    pub message: String,
}

/// Every issue found while validating a form. Never empty.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", summarize(.issues))]
pub struct ValidationErrors {
    issues: Vec<ValidationIssue>,
}

fn summarize(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("{}: {}", issue.path, issue.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    /// Single-issue error.
    pub fn single(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            issues: vec![ValidationIssue {
                path: path.into(),
                message: message.into(),
            }],
        }
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    /// Message attached to `path`, if that field failed.
    pub fn field(&self, path: &str) -> Option<&str> {
        self.issues
            .iter()
            .find(|issue| issue.path == path)
            .map(|issue| issue.message.as_str())
    }

    pub fn has_field(&self, path: &str) -> bool {
        self.field(path).is_some()
    }

    /// Failing field paths, in form order.
    pub fn paths(&self) -> Vec<&str> {
        self.issues
            .iter()
            .map(|issue| issue.path.as_str())
            .collect()
    }

    pub fn first_message(&self) -> &str {
        self.issues
            .first()
            .map(|issue| issue.message.as_str())
            .unwrap_or("Invalid value")
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Outcome of validating a form.
pub type Validated<T> = Result<T, ValidationErrors>;

/// Outcome of validating one field.
pub type FieldResult<T> = Result<T, String>;

/// Which email domains are accepted.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EmailPolicy {
    /// Any syntactically valid address.
    Any,
    /// Common consumer providers plus `.edu.ar` / `.gov.ar`.
    #[default]
    CommonDomains,
}

/// Inputs that refinements depend on besides the value itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationContext {
    pub today: NaiveDate,
    pub email_policy: EmailPolicy,
}

impl ValidationContext {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            email_policy: EmailPolicy::default(),
        }
    }

    /// Context anchored on the local calendar date.
    pub fn today() -> Self {
        Self::new(chrono::Local::now().date_naive())
    }

    pub fn with_email_policy(mut self, policy: EmailPolicy) -> Self {
        self.email_policy = policy;
        self
    }
}

/// Accumulates field failures while a form is being validated.
#[derive(Debug, Default)]
pub(crate) struct IssueCollector {
    issues: Vec<ValidationIssue>,
}

impl IssueCollector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record the failure, if any, and hand back the parsed value.
    pub(crate) fn field<T>(&mut self, path: &str, result: FieldResult<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(message) => {
                self.push(path, message);
                None
            }
        }
    }

    pub(crate) fn push(&mut self, path: &str, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            path: path.to_string(),
            message: message.into(),
        });
    }

    pub(crate) fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Close the collector: `Ok` only when no field failed.
    pub(crate) fn finish(self) -> Validated<()> {
        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors {
                issues: self.issues,
            })
        }
    }

    /// Errors for a form whose fields did not all parse.
    pub(crate) fn into_errors(self) -> ValidationErrors {
        if self.issues.is_empty() {
            ValidationErrors::single("", "Invalid value")
        } else {
            ValidationErrors {
                issues: self.issues,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_keeps_field_order() {
        let mut collector = IssueCollector::new();
        let ok: Option<u32> = collector.field("a", Ok(1));
        let bad: Option<u32> = collector.field("b", Err("bad b".into()));
        collector.push("c", "bad c");

        assert_eq!(ok, Some(1));
        assert!(bad.is_none());

        let errors = collector.finish().unwrap_err();
        assert_eq!(errors.paths(), vec!["b", "c"]);
        assert_eq!(errors.field("c"), Some("bad c"));
        assert_eq!(errors.first_message(), "bad b");
        assert_eq!(errors.to_string(), "b: bad b; c: bad c");
    }

    #[test]
    fn test_clean_collector_finishes_ok() {
        let collector = IssueCollector::new();
        assert!(collector.is_clean());
        assert!(collector.finish().is_ok());
    }
}
