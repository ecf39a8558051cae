//! Compilation settings
//!
//! A [`Settings`] value is built once by the caller and handed by reference to
//! every stage. Nothing in the crate reads configuration from global state.

/// What the diagnostic reporter does with an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Return the error to the caller as a [`crate::diagnostics::CompileError`].
    #[default]
    Catchable,
    /// Print the rendered diagnostic to stderr and exit the process.
    Fatal,
}

/// Exit status used when a fatal diagnostic terminates the process.
pub const FATAL_EXIT_CODE: i32 = 1;

#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub error_mode: ErrorMode,
}

impl Settings {
    pub fn new(error_mode: ErrorMode) -> Self {
        Self { error_mode }
    }

    pub fn catchable() -> Self {
        Self::new(ErrorMode::Catchable)
    }

    pub fn fatal() -> Self {
        Self::new(ErrorMode::Fatal)
    }
}
