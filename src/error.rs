//! Error types for the arena engine
//!
//! Every rejected operation leaves state untouched and reports one of the
//! variants below. Fallible functions return [`Result`], an anyhow alias, so
//! callers classify failures by downcasting to [`ArenaError`].

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Broad category of a rejected operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    DuplicateState,
    NotFound,
    InvalidTransition,
    Validation,
    Internal,
}

/// Custom error types for specific arena scenarios
#[derive(Debug, thiserror::Error)]
pub enum ArenaError {
    #[error("{player} is already queued for {arena_type}")]
    AlreadyQueued { player: String, arena_type: String },

    #[error("{player} is already fighting in arena {arena_id}")]
    AlreadyInArena { player: String, arena_id: String },

    #[error("{player} is not queued")]
    NotQueued { player: String },

    #[error("Arena not found: {arena_id}")]
    ArenaNotFound { arena_id: String },

    #[error("{player} is not in an active arena")]
    NotInArena { player: String },

    #[error("{player} is not a participant in this arena")]
    PlayerNotFound { player: String },

    #[error("{player} is already dead")]
    PlayerDead { player: String },

    #[error("Arena {arena_id} is {state}, expected {expected}")]
    InvalidArenaState {
        arena_id: String,
        state: String,
        expected: String,
    },

    #[error("{attacker} cannot attack teammate {target}")]
    FriendlyFire { attacker: String, target: String },

    #[error("Unsupported arena type: {arena_type}")]
    UnsupportedArenaType { arena_type: String },

    #[error("Invalid player name: '{player}'")]
    InvalidPlayerName { player: String },

    #[error("Tournament not found: {tournament_id}")]
    TournamentNotFound { tournament_id: String },

    #[error("Tournament max players must be a power of two between 2 and 64, got {max_players}")]
    InvalidTournamentSize { max_players: usize },

    #[error("{player} is already registered for {tournament}")]
    AlreadyRegistered { player: String, tournament: String },

    #[error("Tournament {tournament} is full ({max_players} players)")]
    TournamentFull { tournament: String, max_players: usize },

    #[error("Tournament {tournament} is {state}, expected {expected}")]
    InvalidTournamentState {
        tournament: String,
        state: String,
        expected: String,
    },

    #[error("Tournament {tournament} needs at least 2 participants, has {count}")]
    NotEnoughParticipants { tournament: String, count: usize },

    #[error("Tournament match not found: {match_id}")]
    TournamentMatchNotFound { match_id: String },

    #[error("Invalid match result: {reason}")]
    InvalidMatchResult { reason: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Internal service error: {message}")]
    InternalError { message: String },
}

impl ArenaError {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ArenaError::AlreadyQueued { .. }
            | ArenaError::AlreadyInArena { .. }
            | ArenaError::AlreadyRegistered { .. }
            | ArenaError::TournamentFull { .. } => ErrorKind::DuplicateState,
            ArenaError::NotQueued { .. }
            | ArenaError::ArenaNotFound { .. }
            | ArenaError::NotInArena { .. }
            | ArenaError::PlayerNotFound { .. }
            | ArenaError::PlayerDead { .. }
            | ArenaError::TournamentNotFound { .. }
            | ArenaError::TournamentMatchNotFound { .. } => ErrorKind::NotFound,
            ArenaError::InvalidArenaState { .. }
            | ArenaError::InvalidTournamentState { .. }
            | ArenaError::NotEnoughParticipants { .. } => ErrorKind::InvalidTransition,
            ArenaError::FriendlyFire { .. }
            | ArenaError::UnsupportedArenaType { .. }
            | ArenaError::InvalidPlayerName { .. }
            | ArenaError::InvalidTournamentSize { .. }
            | ArenaError::InvalidMatchResult { .. }
            | ArenaError::ConfigurationError { .. } => ErrorKind::Validation,
            ArenaError::InternalError { .. } => ErrorKind::Internal,
        }
    }

    /// Shorthand for a poisoned or unavailable lock
    pub(crate) fn lock_poisoned(what: &str) -> Self {
        ArenaError::InternalError {
            message: format!("Failed to acquire {} lock", what),
        }
    }
}

/// Classify an anyhow error produced by this crate
pub fn error_kind(err: &anyhow::Error) -> ErrorKind {
    err.downcast_ref::<ArenaError>()
        .map(ArenaError::kind)
        .unwrap_or(ErrorKind::Internal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let err = ArenaError::AlreadyQueued {
            player: "alice".to_string(),
            arena_type: "Duel".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::DuplicateState);

        let err = ArenaError::FriendlyFire {
            attacker: "alice".to_string(),
            target: "bob".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.to_string(), "alice cannot attack teammate bob");
    }

    #[test]
    fn test_error_kind_through_anyhow() {
        let err: anyhow::Error = ArenaError::ArenaNotFound {
            arena_id: "x".to_string(),
        }
        .into();
        assert_eq!(error_kind(&err), ErrorKind::NotFound);

        let other = anyhow::anyhow!("something else");
        assert_eq!(error_kind(&other), ErrorKind::Internal);
    }
}
