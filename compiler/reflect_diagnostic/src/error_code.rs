//! Error codes for all plugin diagnostics.
//!
//! Each error code is a unique identifier (e.g., `E2001`) with the first digit
//! indicating the phase that reported it.

use std::fmt;

/// Error codes for all plugin diagnostics.
///
/// Format: E#### where first digit indicates phase:
/// - E0xxx: Lexer errors
/// - E1xxx: Parser errors
/// - E2xxx: Shape errors
/// - E3xxx: Decorator errors
/// - E4xxx: Naming errors
/// - E5xxx: Sample generation errors
/// - E6xxx: Evaluation errors
/// - E9xxx: Pass control errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Lexer Errors (E0xxx)
    /// Unterminated string or character literal
    E0001,
    /// Invalid character in source
    E0002,
    /// Invalid number literal
    E0003,

    // Parser Errors (E1xxx)
    /// Unexpected token
    E1001,
    /// Expected expression
    E1002,
    /// Unclosed delimiter
    E1003,
    /// Expected identifier
    E1004,
    /// Expected type
    E1005,

    // Shape Errors (E2xxx)
    /// Reflection requested on a declaration whose shape does not support it
    E2001,

    // Decorator Errors (E3xxx)
    /// Decorators on one function cannot be composed
    E3001,

    // Naming Errors (E4xxx)
    /// No collision-free name left for a synthesized declaration
    E4001,

    // Sample Errors (E5xxx)
    /// No default value for a type reachable from a sample
    E5001,

    // Evaluation Errors (E6xxx)
    /// Evaluation of a fixture entry point failed
    E6001,

    // Pass Control (E9xxx)
    /// Pass cancelled before completion
    E9001,
    /// Too many errors
    E9002,
}

impl ErrorCode {
    /// Every code, in numeric order.
    pub const ALL: &'static [ErrorCode] = &[
        ErrorCode::E0001,
        ErrorCode::E0002,
        ErrorCode::E0003,
        ErrorCode::E1001,
        ErrorCode::E1002,
        ErrorCode::E1003,
        ErrorCode::E1004,
        ErrorCode::E1005,
        ErrorCode::E2001,
        ErrorCode::E3001,
        ErrorCode::E4001,
        ErrorCode::E5001,
        ErrorCode::E6001,
        ErrorCode::E9001,
        ErrorCode::E9002,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "E0001",
            ErrorCode::E0002 => "E0002",
            ErrorCode::E0003 => "E0003",
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E4001 => "E4001",
            ErrorCode::E5001 => "E5001",
            ErrorCode::E6001 => "E6001",
            ErrorCode::E9001 => "E9001",
            ErrorCode::E9002 => "E9002",
        }
    }

    /// Short description, used by `reflectc explain`.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "unterminated literal",
            ErrorCode::E0002 => "invalid character",
            ErrorCode::E0003 => "invalid number literal",
            ErrorCode::E1001 => "unexpected token",
            ErrorCode::E1002 => "expected expression",
            ErrorCode::E1003 => "unclosed delimiter",
            ErrorCode::E1004 => "expected identifier",
            ErrorCode::E1005 => "expected type",
            ErrorCode::E2001 => "unsupported shape",
            ErrorCode::E3001 => "decorator conflict",
            ErrorCode::E4001 => "naming exhausted",
            ErrorCode::E5001 => "no default available",
            ErrorCode::E6001 => "evaluation failed",
            ErrorCode::E9001 => "pass cancelled",
            ErrorCode::E9002 => "too many errors",
        }
    }

    pub fn is_lexer_error(&self) -> bool {
        matches!(self, ErrorCode::E0001 | ErrorCode::E0002 | ErrorCode::E0003)
    }

    pub fn is_parser_error(&self) -> bool {
        matches!(
            self,
            ErrorCode::E1001
                | ErrorCode::E1002
                | ErrorCode::E1003
                | ErrorCode::E1004
                | ErrorCode::E1005
        )
    }

    /// Codes reported by the transformation pass itself.
    pub fn is_synthesis_error(&self) -> bool {
        matches!(
            self,
            ErrorCode::E2001 | ErrorCode::E3001 | ErrorCode::E4001 | ErrorCode::E5001
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse an error code string like `"E2001"`. Case-insensitive.
impl std::str::FromStr for ErrorCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        Self::ALL
            .iter()
            .find(|code| code.as_str() == upper)
            .copied()
            .ok_or(())
    }
}
