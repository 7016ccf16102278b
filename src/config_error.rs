//! Error handling for the configuration loader

use std::io;

/// Unified error to report failures while reading the node configuration.
#[derive(Debug)]
pub enum ConfigError {
    IoError(io::Error),
    ParseError(String),
    WrongType { key: String, expected: &'static str },
    InvalidValue { key: String, reason: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            ConfigError::IoError(ref err) =>
                write!(f, "IO Error: {}", err),
            ConfigError::ParseError(ref msg) =>
                write!(f, "Parse Error: {}", msg),
            ConfigError::WrongType { ref key, expected } =>
                write!(f, "Wrong type of {}: expected {}", key, expected),
            ConfigError::InvalidValue { ref key, ref reason } =>
                write!(f, "Invalid value of {}: {}", key, reason),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::IoError(err)
    }
}
