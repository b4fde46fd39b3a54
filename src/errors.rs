use crate::moves::Move;
use crate::participant::SideId;
use std::fmt;

/// Main error type for the pet-arena battle engine
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Error related to move parsing or move data
    Move(MoveError),
    /// Error related to roster construction or lookup
    Roster(RosterError),
    /// Error related to battle state or turn ownership
    Battle(BattleError),
}

/// Errors related to moves and the move catalog
#[derive(Debug, Clone, PartialEq)]
pub enum MoveError {
    /// The cheat move was used by a non-administrative caller
    CheatForbidden,
}

/// Errors related to rosters and combatant data
#[derive(Debug, Clone, PartialEq)]
pub enum RosterError {
    /// A clash roster was outside the allowed 3-7 range
    InvalidRosterSize(usize),
    /// A raw pet record could not be parsed
    MalformedRecord(String),
    /// Species lookup failed
    SpeciesNotFound(String),
    /// AI opponent generation found no eligible pet pool
    NoEligibleOpponent,
}

/// Errors related to battle state and turn ownership
#[derive(Debug, Clone, PartialEq)]
pub enum BattleError {
    /// An action arrived from the side that is not active
    OutOfTurn { acting: SideId, active: SideId },
    /// An action arrived before the battle started or after it ended
    BattleNotInProgress,
    /// A side attempted to act with no standing combatants
    ExhaustedRoster(SideId),
    /// The actor for a resolved move was missing or down
    NoActiveCombatant(SideId),
    /// A move resolved against a side with no valid target
    NoValidTarget { move_used: Move },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Move(err) => write!(f, "Move error: {}", err),
            EngineError::Roster(err) => write!(f, "Roster error: {}", err),
            EngineError::Battle(err) => write!(f, "Battle error: {}", err),
        }
    }
}

impl fmt::Display for MoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveError::CheatForbidden => write!(f, "The cheat strike is restricted to admins"),
        }
    }
}

impl fmt::Display for RosterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RosterError::InvalidRosterSize(size) => {
                write!(f, "Clash rosters need 3-7 pets, got {}", size)
            }
            RosterError::MalformedRecord(details) => {
                write!(f, "Malformed pet record: {}", details)
            }
            RosterError::SpeciesNotFound(name) => write!(f, "Species not found: {}", name),
            RosterError::NoEligibleOpponent => write!(f, "No eligible AI opponent pool"),
        }
    }
}

impl fmt::Display for BattleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BattleError::OutOfTurn { acting, active } => {
                write!(f, "Side {} acted but side {} is active", acting, active)
            }
            BattleError::BattleNotInProgress => write!(f, "Battle is not in progress"),
            BattleError::ExhaustedRoster(side) => {
                write!(f, "Side {} has no standing combatants", side)
            }
            BattleError::NoActiveCombatant(side) => {
                write!(f, "Side {} has no active combatant", side)
            }
            BattleError::NoValidTarget { move_used } => {
                write!(f, "No valid target for {:?}", move_used)
            }
        }
    }
}

impl std::error::Error for EngineError {}
impl std::error::Error for MoveError {}
impl std::error::Error for RosterError {}
impl std::error::Error for BattleError {}

impl From<MoveError> for EngineError {
    fn from(err: MoveError) -> Self {
        EngineError::Move(err)
    }
}

impl From<RosterError> for EngineError {
    fn from(err: RosterError) -> Self {
        EngineError::Roster(err)
    }
}

impl From<BattleError> for EngineError {
    fn from(err: BattleError) -> Self {
        EngineError::Battle(err)
    }
}

/// Type alias for Results using EngineError
pub type ArenaResult<T> = Result<T, EngineError>;
