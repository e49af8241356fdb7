//! Pluggable reporting of parse errors and warnings.

use log::{error, warn};

use crate::error::ErrorKind;

/// Receives diagnostics from the [`Parser`](crate::parser::Parser)
pub trait ErrorHandler {
    fn on_error(&mut self, kind: ErrorKind, message: &str);
    fn on_warning(&mut self, message: &str);
}

impl<H: ErrorHandler + ?Sized> ErrorHandler for &mut H {
    fn on_error(&mut self, kind: ErrorKind, message: &str) {
        (**self).on_error(kind, message);
    }

    fn on_warning(&mut self, message: &str) {
        (**self).on_warning(message);
    }
}

/// Writes diagnostics to standard error
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleErrorHandler;

impl ErrorHandler for ConsoleErrorHandler {
    fn on_error(&mut self, _kind: ErrorKind, message: &str) {
        eprintln!("{message}");
    }

    fn on_warning(&mut self, message: &str) {
        eprintln!("Warning: {message}");
    }
}

/// Forwards diagnostics to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogErrorHandler;

impl ErrorHandler for LogErrorHandler {
    fn on_error(&mut self, kind: ErrorKind, message: &str) {
        error!("{kind:?}: {message}");
    }

    fn on_warning(&mut self, message: &str) {
        warn!("{message}");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Only set for errors
    pub kind: Option<ErrorKind>,
    pub message: String,
}

/// Keeps every diagnostic in memory
#[derive(Debug, Default, Clone)]
pub struct CollectingErrorHandler {
    pub diagnostics: Vec<Diagnostic>,
}

impl CollectingErrorHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }
}

impl ErrorHandler for CollectingErrorHandler {
    fn on_error(&mut self, kind: ErrorKind, message: &str) {
        self.diagnostics.push(Diagnostic {
            severity: Severity::Error,
            kind: Some(kind),
            message: message.to_owned(),
        });
    }

    fn on_warning(&mut self, message: &str) {
        self.diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            kind: None,
            message: message.to_owned(),
        });
    }
}
