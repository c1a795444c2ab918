//! Aggregated configuration violations

use std::fmt;

/// A single missing or invalid field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Human-readable field name, e.g. "Client ID".
    pub field: &'static str,
    /// Full message shown to the user.
    pub message: String,
}

/// Every violation found while validating a configuration.
///
/// Validation never stops at the first problem; callers get the whole list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    violations: Vec<Violation>,
}

impl ValidationErrors {
    /// Creates an empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            violations: Vec::new(),
        }
    }

    /// Records a violation.
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.violations.push(Violation {
            field,
            message: message.into(),
        });
    }

    /// Returns true when nothing was recorded.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Number of violations.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true when nothing was recorded.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// All violations in the order they were found.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Returns true if a violation was recorded for `field`.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }

    /// `Ok(())` when valid, otherwise `Err(self)`.
    ///
    /// # Errors
    ///
    /// Returns the collection itself when at least one violation was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_valid() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.violations.len() {
            0 => return write!(f, "no errors occurred"),
            1 => writeln!(f, "1 error occurred:")?,
            n => writeln!(f, "{n} errors occurred:")?,
        }
        for violation in &self.violations {
            writeln!(f, "\t* {}", violation.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}
