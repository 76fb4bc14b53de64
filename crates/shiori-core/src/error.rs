use thiserror::Error;

/// Bad or missing user input in a block, link or settings file.
///
/// Display strings are shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Username is required. Set `general.default_username` in the settings file or add a `username:` line to the block.")]
    MissingUsername,

    #[error("Default username not set. Set `general.default_username` in the settings file.")]
    MissingDefaultUsername,

    #[error("Missing required field `{0}`.")]
    MissingField(&'static str),

    #[error("Invalid value for `{key}`: {value}.")]
    InvalidValue { key: &'static str, value: String },

    #[error("Invalid AniList link format: {0}.")]
    InvalidLink(String),

    #[error("Settings error: {0}.")]
    Settings(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Settings(e.to_string())
    }
}
