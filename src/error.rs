use thiserror::Error;

/// Category reported to an [`ErrorHandler`](crate::diagnostics::ErrorHandler)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Closing delimiter without an open group, or groups left open at end of input
    BracketsMismatch,
    /// Variant separator used outside of any group
    StraySeparator,
}

/// Fatal parse failure. The handler has already been notified when this is returned.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Closing group that was not opened. Brackets mismatch at position {position}.")]
    UnmatchedClose { position: usize },

    #[error("Brackets mismatch: {count} group(s) have not been closed.")]
    UnclosedGroups { count: usize },

    #[error("Variant separator outside of any group at position {position}.")]
    SeparatorOutsideGroup { position: usize },
}

impl ParseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::UnmatchedClose { .. } | ParseError::UnclosedGroups { .. } => {
                ErrorKind::BracketsMismatch
            }
            ParseError::SeparatorOutsideGroup { .. } => ErrorKind::StraySeparator,
        }
    }
}
