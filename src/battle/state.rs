use crate::moves::{BuffStat, Move};
use crate::participant::{Participant, SideId};
use crate::pet::PetInst;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default turn ceiling; hitting it forces the tie-break resolution.
pub const TURN_CEILING: u32 = 40;

/// Fixed HP trickle a down pet regains at its side's turn start in clash
/// battles.
pub const REVIVE_HP: u32 = 8;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleVariant {
    /// 1v1 with back-and-forth replies.
    Duel,
    /// Single simultaneous strike exchange.
    OneShot,
    /// 3-7 pets per side, one move per standing pet per turn.
    Clash,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    AwaitingOpponent,
    InProgress,
    Side1Win,
    Side2Win,
    Draw,
}

impl GameState {
    pub fn is_terminal(self) -> bool {
        matches!(self, GameState::Side1Win | GameState::Side2Win | GameState::Draw)
    }

    pub fn winner(self) -> Option<SideId> {
        match self {
            GameState::Side1Win => Some(SideId::One),
            GameState::Side2Win => Some(SideId::Two),
            _ => None,
        }
    }
}

/// Per-combatant running counters, scoped to one battle. Every field except
/// `last_move` is monotonically non-decreasing.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct CombatantStats {
    pub damage_dealt: u64,
    pub damage_taken: u64,
    pub heals_performed: u32,
    pub attack_boosts: u32,
    pub defense_boosts: u32,
    pub last_move: Option<Move>,
}

/// The battle-scoped statistics store. Keyed by (side, roster slot) and owned
/// by the `BattleState`, so concurrent battles or rematches with the same
/// pets can never collide.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct BattleStats {
    records: HashMap<(SideId, usize), CombatantStats>,
}

impl BattleStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a record; combatants that have not acted yet read as zeros.
    pub fn get(&self, side: SideId, slot: usize) -> CombatantStats {
        self.records.get(&(side, slot)).copied().unwrap_or_default()
    }

    /// Mutable access, lazily initializing a zeroed record.
    pub fn entry(&mut self, side: SideId, slot: usize) -> &mut CombatantStats {
        self.records.entry((side, slot)).or_default()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub enum BattleEvent {
    BattleStarted {
        starting_side: SideId,
    },
    HpEqualized {
        side: SideId,
        boost: u32,
    },
    TurnStarted {
        turn_number: u32,
    },
    MoveUsed {
        side: SideId,
        pet: String,
        move_used: Move,
    },
    MoveDodged {
        attacker: String,
        defender: String,
        move_used: Move,
    },
    CriticalHit {
        attacker: String,
        move_used: Move,
    },
    DamageDealt {
        target: String,
        damage: u32,
        remaining_hp: u32,
    },
    PetHealed {
        target: String,
        amount: u32,
        new_hp: u32,
    },
    StatBoosted {
        target: String,
        stat: BuffStat,
        amount: u32,
    },
    BoostFizzled {
        target: String,
        stat: BuffStat,
    },
    EqualizeFizzled {
        actor: String,
    },
    UnknownMove {
        side: SideId,
        text: String,
    },
    PetDowned {
        side: SideId,
        slot: usize,
        pet: String,
    },
    PetRevived {
        side: SideId,
        slot: usize,
        pet: String,
        hp: u32,
    },
    SideDefeated {
        side: SideId,
    },
    TurnCeilingReached {
        turn_number: u32,
    },
    BattleEnded {
        winner: Option<SideId>,
    },
}

impl BattleEvent {
    /// Formats the event into a human-readable string using battle context.
    /// Returns None for silent events.
    pub fn format(&self, battle_state: &BattleState) -> Option<String> {
        match self {
            BattleEvent::BattleStarted { starting_side } => {
                let name = &battle_state.sides[starting_side.index()].display_name;
                Some(format!("The battle begins! {} moves first.", name))
            }
            BattleEvent::HpEqualized { side, boost } => {
                let name = &battle_state.sides[side.index()].display_name;
                Some(format!(
                    "{}'s pets steel themselves (+{} max HP)!",
                    name, boost
                ))
            }
            BattleEvent::TurnStarted { turn_number } => {
                Some(format!("=== Turn {} ===", turn_number))
            }
            BattleEvent::MoveUsed { side, pet, move_used } => {
                let name = &battle_state.sides[side.index()].display_name;
                Some(format!("{}'s {} used {}!", name, pet, move_used.name()))
            }
            BattleEvent::MoveDodged { attacker, defender, .. } => {
                Some(format!("{} saw it coming — {}'s attack was dodged!", defender, attacker))
            }
            BattleEvent::CriticalHit { .. } => Some("A vicious hit!".to_string()),
            BattleEvent::DamageDealt { target, damage, .. } => {
                Some(format!("{} took {} damage!", target, damage))
            }
            BattleEvent::PetHealed { target, amount, .. } => {
                Some(format!("{} recovered {} HP!", target, amount))
            }
            BattleEvent::StatBoosted { target, stat, amount } => {
                let stat_name = match stat {
                    BuffStat::Attack => "attack",
                    BuffStat::Defense => "defense",
                };
                Some(format!("{}'s {} rose by {}!", target, stat_name, amount))
            }
            BattleEvent::BoostFizzled { target, stat } => {
                let stat_name = match stat {
                    BuffStat::Attack => "attack",
                    BuffStat::Defense => "defense",
                };
                Some(format!("{}'s {} won't go any higher!", target, stat_name))
            }
            BattleEvent::EqualizeFizzled { actor } => {
                Some(format!("{} found no weakness to exploit.", actor))
            }
            BattleEvent::UnknownMove { side, text } => {
                let name = &battle_state.sides[side.index()].display_name;
                Some(format!(
                    "{} flailed uselessly — '{}' is not a known move.",
                    name, text
                ))
            }
            BattleEvent::PetDowned { pet, .. } => Some(format!("{} is down!", pet)),
            BattleEvent::PetRevived { pet, hp, .. } => {
                Some(format!("{} staggers back up with {} HP!", pet, hp))
            }
            BattleEvent::SideDefeated { side } => {
                let name = &battle_state.sides[side.index()].display_name;
                Some(format!("{} has no pets left standing!", name))
            }
            BattleEvent::TurnCeilingReached { turn_number } => {
                Some(format!("The battle is called after {} turns!", turn_number))
            }
            BattleEvent::BattleEnded { winner } => match winner {
                Some(side) => {
                    let name = &battle_state.sides[side.index()].display_name;
                    Some(format!("{} has won the battle!", name))
                }
                None => Some("The battle ended in a draw!".to_string()),
            },
        }
    }
}

/// Event bus for collecting and managing battle events.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    events: Vec<BattleEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: BattleEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Drain the accumulated events, leaving the bus empty.
    pub fn take(&mut self) -> Vec<BattleEvent> {
        std::mem::take(&mut self.events)
    }

    /// Print all events using their formatted text; silent events fall back
    /// to debug format.
    pub fn print_formatted(&self, battle_state: &BattleState) {
        for event in &self.events {
            match event.format(battle_state) {
                Some(formatted) => println!("  {}", formatted),
                None => println!("  {:?} (silent)", event),
            }
        }
    }
}

impl std::fmt::Display for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for event in &self.events {
            writeln!(f, "  {:?}", event)?;
        }
        Ok(())
    }
}

/// The injected random source. Every probabilistic decision in the engine and
/// the AI heuristic consumes percent outcomes (1-100) from one of these, so
/// tests can force exact sequences.
#[derive(Debug, Clone)]
pub struct TurnRng {
    outcomes: Vec<u8>,
    index: usize,
}

impl TurnRng {
    pub fn new_for_test(outcomes: Vec<u8>) -> Self {
        Self { outcomes, index: 0 }
    }

    pub fn new_random() -> Self {
        use rand::Rng;
        let mut rng = rand::rng();
        let outcomes: Vec<u8> = (0..200).map(|_| rng.random_range(1..=100)).collect();
        Self { outcomes, index: 0 }
    }

    /// Deterministic stream from a seed, for reproducible demos and tests.
    pub fn new_seeded(seed: u64) -> Self {
        use rand::{Rng, SeedableRng};
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        let outcomes: Vec<u8> = (0..200).map(|_| rng.random_range(1..=100)).collect();
        Self { outcomes, index: 0 }
    }

    pub fn next_outcome(&mut self, reason: &str) -> u8 {
        if self.index >= self.outcomes.len() {
            panic!(
                "TurnRng exhausted! Tried to get a value for: '{}'. Need more random values.",
                reason
            );
        }
        let outcome = self.outcomes[self.index];

        #[cfg(test)]
        println!("[RNG] Consumed {} for: {}", outcome, reason);

        self.index += 1;
        outcome
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BattleState {
    pub battle_id: String,
    pub sides: [Participant; 2],
    pub variant: BattleVariant,
    pub active_side: SideId,
    pub turn_number: u32,
    pub max_turns: u32,
    pub stats: BattleStats,
    pub game_state: GameState,
}

impl BattleState {
    pub fn new(
        battle_id: String,
        side1: Participant,
        side2: Participant,
        variant: BattleVariant,
    ) -> Self {
        Self {
            battle_id,
            sides: [side1, side2],
            variant,
            active_side: SideId::One,
            turn_number: 1,
            max_turns: TURN_CEILING,
            stats: BattleStats::new(),
            game_state: GameState::AwaitingOpponent,
        }
    }

    pub fn side(&self, side: SideId) -> &Participant {
        &self.sides[side.index()]
    }

    pub fn side_mut(&mut self, side: SideId) -> &mut Participant {
        &mut self.sides[side.index()]
    }

    pub fn pet(&self, side: SideId, slot: usize) -> Option<&PetInst> {
        self.sides[side.index()].roster.get(slot)
    }

    pub fn pet_mut(&mut self, side: SideId, slot: usize) -> Option<&mut PetInst> {
        self.sides[side.index()].roster.get_mut(slot)
    }

    /// Transition from `AwaitingOpponent` to `InProgress`: reset every pet's
    /// battle modifiers, apply the one-time HP equalization boost, and pick
    /// the starting side.
    pub fn begin(&mut self, rng: &mut TurnRng, bus: &mut EventBus) {
        for side in &mut self.sides {
            for pet in &mut side.roster {
                pet.reset_for_battle();
            }
            side.last_move = None;
            side.down.clear();
        }

        if let Some((side, boost)) = crate::battle::stats::apply_hp_equalization(&mut self.sides) {
            bus.push(BattleEvent::HpEqualized { side, boost });
        }

        self.active_side = crate::battle::stats::choose_starting_side(&self.sides, rng);
        self.game_state = GameState::InProgress;
        self.turn_number = 1;
        bus.push(BattleEvent::BattleStarted {
            starting_side: self.active_side,
        });
        bus.push(BattleEvent::TurnStarted { turn_number: 1 });
    }
}
