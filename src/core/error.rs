use thiserror::Error;

/// Errors raised while resolving or sequencing a battle
///
/// Everything except `CombatIntegrity` and `InputClosed` is recoverable: the
/// sequencer reports it and re-offers the same actor's turn.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CombatError {
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("Insufficient {resource}: need {required}, have {available}")]
    InsufficientResource {
        resource: &'static str,
        required: u32,
        available: u32,
    },

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Combat integrity error: {0}")]
    CombatIntegrity(String),

    #[error("Player input closed")]
    InputClosed,
}

impl CombatError {
    /// Can the sequencer re-prompt after this error?
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::CombatIntegrity(_) | Self::InputClosed)
    }
}

pub type Result<T> = std::result::Result<T, CombatError>;

/// Errors that can occur when loading configuration or data tables
#[derive(Debug, Error)]
pub enum LoadError {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    /// Parsed but semantically invalid
    #[error("Invalid data: {0}")]
    Invalid(String),
}
