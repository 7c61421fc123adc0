use std::path::PathBuf;
use thiserror::Error;

/// Reasons a hunt analyzer report can be rejected.
///
/// Parsing is all-or-nothing: any of these aborts the whole report, the
/// caller never receives a partially populated record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The `Session data: From ... to ...` line is absent or unreadable.
    #[error("Malformed session header: {0}")]
    MalformedHeader(String),

    /// A required line was not found.
    #[error("Missing required field {field}{}", player_suffix(.player))]
    MissingRequiredField {
        field: &'static str,
        player: Option<String>,
    },

    /// A known field was found but its value could not be decoded.
    #[error("Invalid value {value:?} for field {field}{}", player_suffix(.player))]
    InvalidField {
        field: &'static str,
        value: String,
        player: Option<String>,
    },

    /// The same stat line appeared twice inside one player block.
    #[error("Field {field} repeated{}", player_suffix(.player))]
    DuplicateField {
        field: &'static str,
        player: Option<String>,
    },

    /// Two player blocks share the same name.
    #[error("Player {0} appears more than once in the report")]
    DuplicatePlayer(String),

    /// The acting character is not one of the party members.
    #[error("Character {0} is not a member of this party")]
    ActorNotInParty(String),

    /// A party report must list the acting character plus at least one other.
    #[error("A party hunt needs at least 2 characters, found {found}")]
    InsufficientPartySize { found: usize },

    /// The acting character id/name is not in the known roster.
    #[error("Unknown character: {0}")]
    UnknownCharacter(String),
}

impl ParseError {
    /// Attach the owning player's name to field-level errors.
    pub fn with_player(self, name: &str) -> Self {
        match self {
            ParseError::MissingRequiredField { field, .. } => ParseError::MissingRequiredField {
                field,
                player: Some(name.to_string()),
            },
            ParseError::InvalidField { field, value, .. } => ParseError::InvalidField {
                field,
                value,
                player: Some(name.to_string()),
            },
            ParseError::DuplicateField { field, .. } => ParseError::DuplicateField {
                field,
                player: Some(name.to_string()),
            },
            other => other,
        }
    }
}

fn player_suffix(player: &Option<String>) -> String {
    match player {
        Some(name) => format!(" for player {}", name),
        None => String::new(),
    }
}

/// All errors produced by the hunt analyzer crates.
#[derive(Error, Debug)]
pub enum HuntError {
    /// A report was rejected by the parser.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience alias used throughout the hunt analyzer crates.
pub type Result<T> = std::result::Result<T, HuntError>;
