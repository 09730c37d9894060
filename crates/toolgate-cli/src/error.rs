//! CLI-specific error types and exit codes.

use thiserror::Error;

/// Failures the CLI reports with a dedicated exit code.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The connector id could not be turned into a launch spec.
    #[error("Resolution failed: {0}")]
    Resolution(String),

    /// Catalog storage could not be opened or written.
    #[error("Database error: {0}")]
    Database(String),
}

impl CliError {
    /// Exit codes follow sysexits.h where one fits.
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 78,     // EX_CONFIG
            Self::Resolution(_) => 65, // EX_DATAERR
            Self::Database(_) => 73,   // EX_CANTCREAT
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [
            CliError::Config(String::new()).exit_code(),
            CliError::Resolution(String::new()).exit_code(),
            CliError::Database(String::new()).exit_code(),
        ];
        assert_eq!(codes, [78, 65, 73]);
    }
}
