//! pet-arena
//!
//! A turn-based pet combat engine: a numeric combatant model with
//! diminishing-returns stat curves, a battle state machine with duel,
//! one-shot, and clash variants, per-battle running statistics, and a
//! multi-factor scoring heuristic for AI participants. Messaging transport,
//! persistence, and the reward economy are external collaborators.

// --- MODULE DECLARATIONS ---
pub mod battle;
pub mod errors;
pub mod moves;
pub mod participant;
pub mod pet;
pub mod prefab_rosters;
pub mod species;

// --- PUBLIC API RE-EXPORTS ---

// Core battle engine functions and state.
pub use battle::engine::{advance_turn, battle_winner, check_termination, resolve_move, MoveOutcome};
pub use battle::state::{
    BattleEvent, BattleState, BattleStats, BattleVariant, CombatantStats, EventBus, GameState,
    TurnRng, REVIVE_HP, TURN_CEILING,
};

// AI decision heuristic.
pub use battle::ai::{AiBrain, Mood, CRITICAL_HP_PERCENT};

// Orchestrator variants and reward settlement.
pub use battle::runner::{
    pick_ai_opponent, run_one_shot, ClashOrder, ClashRunner, DuelRunner, ExecutionResult,
    OneShotOutcome, RewardSummary, BASE_PURSE, CLASH_MAX_ROSTER, CLASH_MIN_ROSTER,
};

// Core runtime types.
pub use moves::{get_move_data, BuffStat, Move, MoveData, MoveKind};
pub use participant::{CallerRole, Participant, ParticipantKind, SideId};
pub use pet::{BattleMods, PetInst, PetRecord};
pub use species::{Element, PetSpecies};

// Crate-specific error and result types.
pub use errors::{ArenaResult, BattleError, EngineError, MoveError, RosterError};
