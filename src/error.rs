//! Application-level error carrying a process exit code.
//!
//! Exit codes:
//! - `2`: bad input, configuration or file IO
//! - `3`: the requested data is unusable (unknown customer, empty dataset)
//! - `4`: terminal/runtime failures

/// Bad input, configuration or file IO.
pub const EXIT_INPUT: u8 = 2;
/// Lookup misses and unusable datasets.
pub const EXIT_DATA: u8 = 3;
/// Terminal and runtime failures.
pub const EXIT_RUNTIME: u8 = 4;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn input(message: impl Into<String>) -> Self {
        Self::new(EXIT_INPUT, message)
    }

    pub fn data(message: impl Into<String>) -> Self {
        Self::new(EXIT_DATA, message)
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(EXIT_RUNTIME, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<crate::session::SessionError> for AppError {
    fn from(err: crate::session::SessionError) -> Self {
        AppError::data(err.to_string())
    }
}

impl From<crate::telemetry::TelemetryError> for AppError {
    fn from(err: crate::telemetry::TelemetryError) -> Self {
        AppError::input(err.to_string())
    }
}
