use crate::moves::Move;
use crate::pet::PetInst;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// The two sides of a battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SideId {
    One,
    Two,
}

impl SideId {
    pub fn other(self) -> SideId {
        match self {
            SideId::One => SideId::Two,
            SideId::Two => SideId::One,
        }
    }

    pub fn index(self) -> usize {
        match self {
            SideId::One => 0,
            SideId::Two => 1,
        }
    }
}

impl fmt::Display for SideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SideId::One => write!(f, "1"),
            SideId::Two => write!(f, "2"),
        }
    }
}

/// Whether a side is driven by human replies or the AI heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticipantKind {
    Human,
    Ai,
}

/// Privilege level of the caller submitting an action. The cheat strike is
/// only honored for `Admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallerRole {
    Player,
    Admin,
}

/// One side of a battle: identity, roster, and per-side battle bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    /// External identity (a user ID for humans, a generated tag for AI).
    pub participant_id: String,
    pub display_name: String,
    pub kind: ParticipantKind,
    pub roster: Vec<PetInst>,
    /// The side's previous move, consulted for dodge-risk lookups.
    pub last_move: Option<Move>,
    /// Roster slots currently down; clash battles trickle revival HP into
    /// these at the side's turn start.
    pub down: HashSet<usize>,
}

impl Participant {
    pub fn new(
        participant_id: String,
        display_name: String,
        kind: ParticipantKind,
        roster: Vec<PetInst>,
    ) -> Self {
        Participant {
            participant_id,
            display_name,
            kind,
            roster,
            last_move: None,
            down: HashSet::new(),
        }
    }

    pub fn human(id: String, name: String, roster: Vec<PetInst>) -> Self {
        Self::new(id, name, ParticipantKind::Human, roster)
    }

    pub fn ai(name: String, roster: Vec<PetInst>) -> Self {
        Self::new(format!("AI_{}", name), name, ParticipantKind::Ai, roster)
    }

    pub fn is_ai(&self) -> bool {
        self.kind == ParticipantKind::Ai
    }

    /// Slots whose pet is still standing.
    pub fn standing_slots(&self) -> Vec<usize> {
        self.roster
            .iter()
            .enumerate()
            .filter(|(_, pet)| !pet.is_down())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn first_standing(&self) -> Option<usize> {
        self.roster.iter().position(|pet| !pet.is_down())
    }

    /// A side is defeated when no pet has HP left. Forcing the roster empty
    /// from outside is the external-abort path and counts as defeated.
    pub fn is_defeated(&self) -> bool {
        self.roster.iter().all(|pet| pet.is_down())
    }

    /// Total remaining HP percentage across the roster, used by the
    /// turn-ceiling tie-break.
    pub fn total_percent_hp(&self) -> f64 {
        self.roster.iter().map(|pet| pet.percent_hp()).sum()
    }

    /// Aggregate strength of the roster, used for HP equalization and
    /// starting-side selection.
    pub fn aggregate_strength(&self) -> f64 {
        self.roster
            .iter()
            .map(|pet| crate::battle::stats::pet_strength(pet))
            .sum()
    }

    /// Refresh the down set from current HP values.
    pub fn refresh_down_set(&mut self) {
        self.down = self
            .roster
            .iter()
            .enumerate()
            .filter(|(_, pet)| pet.is_down())
            .map(|(i, _)| i)
            .collect();
    }
}
