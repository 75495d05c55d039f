//! Result log collecting the outcome of a model test
use std::fmt::{Display, Formatter};

use log::debug;

/// A single outcome recorded by a test
#[derive(Clone, Debug, PartialEq)]
pub enum LogEntry {
    /// A checked property, passed or failed
    Assertion {
        passed: bool,
        message: String,
        description: Option<String>,
    },
    /// A soft deviation which doesn't fail the test
    Warning {
        message: String,
        description: Option<String>,
    },
    /// A problem with the model or project preventing part of the test from running
    Error {
        message: String,
        description: Option<String>,
    },
}

impl LogEntry {
    pub fn message(&self) -> &str {
        match self {
            LogEntry::Assertion { message, .. }
            | LogEntry::Warning { message, .. }
            | LogEntry::Error { message, .. } => message,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            LogEntry::Assertion { description, .. }
            | LogEntry::Warning { description, .. }
            | LogEntry::Error { description, .. } => description.as_deref(),
        }
    }
}

impl Display for LogEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            LogEntry::Assertion { passed: true, .. } => "PASS",
            LogEntry::Assertion { passed: false, .. } => "FAIL",
            LogEntry::Warning { .. } => "WARN",
            LogEntry::Error { .. } => "ERROR",
        };
        write!(f, "{} {}", tag, self.message())?;
        if let Some(description) = self.description() {
            write!(f, " ({})", description)?;
        }
        Ok(())
    }
}

/// Entries recorded by one test run against one model
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResultLog {
    id: String,
    entries: Vec<LogEntry>,
}

impl ResultLog {
    pub fn new(id: &str) -> Self {
        ResultLog {
            id: id.to_string(),
            entries: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Record whether `statement` holds, returning it
    ///
    /// `success` is kept when it holds, `failure` when it doesn't.
    pub fn assertion(
        &mut self,
        statement: bool,
        success: &str,
        failure: &str,
        description: Option<&str>,
    ) -> bool {
        let message = if statement { success } else { failure };
        debug!(
            "{}: {} {}",
            self.id,
            if statement { "passed" } else { "failed" },
            message
        );
        self.entries.push(LogEntry::Assertion {
            passed: statement,
            message: message.to_string(),
            description: description.map(|d| d.to_string()),
        });
        statement
    }

    /// Record a warning when `statement` holds
    pub fn warning(&mut self, statement: bool, message: &str, description: Option<&str>) {
        if !statement {
            return;
        }
        debug!("{}: warning {}", self.id, message);
        self.entries.push(LogEntry::Warning {
            message: message.to_string(),
            description: description.map(|d| d.to_string()),
        });
    }

    pub fn error(&mut self, message: &str, description: Option<&str>) {
        debug!("{}: error {}", self.id, message);
        self.entries.push(LogEntry::Error {
            message: message.to_string(),
            description: description.map(|d| d.to_string()),
        });
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn passed(&self) -> usize {
        self.count(|e| matches!(e, LogEntry::Assertion { passed: true, .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|e| matches!(e, LogEntry::Assertion { passed: false, .. }))
    }

    pub fn warnings(&self) -> usize {
        self.count(|e| matches!(e, LogEntry::Warning { .. }))
    }

    pub fn errors(&self) -> usize {
        self.count(|e| matches!(e, LogEntry::Error { .. }))
    }

    /// No failed assertions and no errors
    pub fn is_success(&self) -> bool {
        self.failed() == 0 && self.errors() == 0
    }

    fn count<F: Fn(&LogEntry) -> bool>(&self, f: F) -> usize {
        self.entries.iter().filter(|e| f(e)).count()
    }
}

#[cfg(test)]
mod log_tests {
    use super::*;

    #[test]
    fn counts_by_severity() {
        let mut log = ResultLog::new("check");
        assert!(log.assertion(true, "ok", "not ok", None));
        assert!(!log.assertion(false, "ok", "not ok", Some("detail")));
        log.warning(false, "never recorded", None);
        log.warning(true, "odd value", None);
        log.error("missing reaction", None);

        assert_eq!(log.entries().len(), 4);
        assert_eq!(log.passed(), 1);
        assert_eq!(log.failed(), 1);
        assert_eq!(log.warnings(), 1);
        assert_eq!(log.errors(), 1);
        assert!(!log.is_success());
        assert_eq!(log.entries()[1].message(), "not ok");
        assert_eq!(log.entries()[1].to_string(), "FAIL not ok (detail)");
    }

    #[test]
    fn warnings_do_not_fail() {
        let mut log = ResultLog::new("check");
        log.assertion(true, "ok", "not ok", None);
        log.warning(true, "odd value", None);
        assert!(log.is_success());
        assert_eq!(log.entries()[1].to_string(), "WARN odd value");
    }
}
