//! Proof that an error was reported.

use std::fmt;

/// Zero-sized token that can only be obtained by reporting an error.
///
/// Functions returning `Result<T, ErrorGuaranteed>` promise that the error
/// case has already been pushed to a [`DiagnosticQueue`](crate::DiagnosticQueue)
/// or returned alongside other diagnostics.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ErrorGuaranteed(());

impl ErrorGuaranteed {
    pub(crate) fn new() -> Self {
        ErrorGuaranteed(())
    }

    /// Proof from an error count, `None` when no error was reported.
    pub fn from_error_count(count: usize) -> Option<Self> {
        (count > 0).then(Self::new)
    }
}

impl fmt::Display for ErrorGuaranteed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error(s) emitted")
    }
}

#[cfg(test)]
mod tests;
