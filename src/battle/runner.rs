use crate::battle::ai::AiBrain;
use crate::battle::engine::{advance_turn, check_termination, resolve_move, select_target};
use crate::battle::state::{
    BattleEvent, BattleState, BattleVariant, EventBus, GameState, TurnRng,
};
use crate::errors::{ArenaResult, BattleError, MoveError, RosterError};
use crate::moves::Move;
use crate::participant::{CallerRole, Participant, SideId};
use crate::pet::PetInst;

/// Base purse a battle plays for; the final payouts scale with the margin of
/// victory. Crediting the amounts is the economy layer's job.
pub const BASE_PURSE: u32 = 200;

pub const CLASH_MIN_ROSTER: usize = 3;
pub const CLASH_MAX_ROSTER: usize = 7;

/// Payouts handed to the external economy layer at battle end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardSummary {
    pub winner: Option<SideId>,
    pub winner_payout: u32,
    pub loser_payout: u32,
}

/// What one driver call produced: the narration events plus where the battle
/// stands now.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub events: Vec<BattleEvent>,
    pub game_state: GameState,
    pub battle_ended: bool,
    pub winner: Option<SideId>,
    pub rewards: Option<RewardSummary>,
}

fn settle_rewards(state: &BattleState) -> RewardSummary {
    match state.game_state.winner() {
        Some(winner) => {
            let winner_pct = average_percent(state.side(winner));
            let loser_pct = average_percent(state.side(winner.other()));
            let margin = (winner_pct - loser_pct).max(0.0);
            RewardSummary {
                winner: Some(winner),
                winner_payout: BASE_PURSE / 2 + (BASE_PURSE as f64 / 2.0 * margin / 100.0) as u32,
                loser_payout: BASE_PURSE / 10,
            }
        }
        // Draw: no winner, split the purse evenly.
        None => RewardSummary {
            winner: None,
            winner_payout: BASE_PURSE / 2,
            loser_payout: BASE_PURSE / 2,
        },
    }
}

fn average_percent(side: &Participant) -> f64 {
    if side.roster.is_empty() {
        0.0
    } else {
        side.total_percent_hp() / side.roster.len() as f64
    }
}

fn execution_result(state: &BattleState, bus: &mut EventBus) -> ExecutionResult {
    let ended = state.game_state.is_terminal();
    ExecutionResult {
        events: bus.take(),
        game_state: state.game_state,
        battle_ended: ended,
        winner: state.game_state.winner(),
        rewards: ended.then(|| settle_rewards(state)),
    }
}

/// 1v1 duel driven by externally delivered replies. Human turns suspend until
/// `submit_reply`; AI turns resolve immediately.
#[derive(Debug)]
pub struct DuelRunner {
    state: BattleState,
    brains: [AiBrain; 2],
}

impl DuelRunner {
    pub fn new(battle_id: String, side1: Participant, side2: Participant) -> ArenaResult<Self> {
        for side in [&side1, &side2] {
            if side.roster.is_empty() {
                return Err(RosterError::InvalidRosterSize(0).into());
            }
        }
        Ok(Self {
            state: BattleState::new(battle_id, side1, side2, BattleVariant::Duel),
            brains: [AiBrain::new(), AiBrain::new()],
        })
    }

    pub fn state(&self) -> &BattleState {
        &self.state
    }

    /// Start the battle and play any leading AI turns.
    pub fn start(&mut self, rng: &mut TurnRng) -> ExecutionResult {
        let mut bus = EventBus::new();
        self.state.begin(rng, &mut bus);
        self.auto_play_ai(rng, &mut bus);
        execution_result(&self.state, &mut bus)
    }

    /// Handle one reply from a human side. Out-of-turn replies are rejected
    /// with the state untouched; unknown move text costs nothing but a
    /// corrective event and the turn stays with the sender.
    pub fn submit_reply(
        &mut self,
        side: SideId,
        text: &str,
        role: CallerRole,
        rng: &mut TurnRng,
    ) -> ArenaResult<ExecutionResult> {
        if self.state.game_state != GameState::InProgress {
            return Err(BattleError::BattleNotInProgress.into());
        }
        if side != self.state.active_side {
            return Err(BattleError::OutOfTurn {
                acting: side,
                active: self.state.active_side,
            }
            .into());
        }

        let mut bus = EventBus::new();
        let Some(move_) = Move::parse(text) else {
            bus.push(BattleEvent::UnknownMove {
                side,
                text: text.trim().to_string(),
            });
            return Ok(execution_result(&self.state, &mut bus));
        };

        let slot = self
            .state
            .side(side)
            .first_standing()
            .ok_or(BattleError::ExhaustedRoster(side))?;
        resolve_move(&mut self.state, side, slot, move_, None, role, rng, &mut bus)?;

        if !check_termination(&mut self.state, &mut bus).is_terminal() {
            advance_turn(&mut self.state, &mut bus);
        }
        self.auto_play_ai(rng, &mut bus);
        Ok(execution_result(&self.state, &mut bus))
    }

    /// Resume AI play (AI-vs-AI battles advance a bounded number of turns per
    /// call so one `TurnRng` always covers them). No-op on human turns.
    pub fn step(&mut self, rng: &mut TurnRng) -> ExecutionResult {
        let mut bus = EventBus::new();
        self.auto_play_ai(rng, &mut bus);
        execution_result(&self.state, &mut bus)
    }

    fn auto_play_ai(&mut self, rng: &mut TurnRng, bus: &mut EventBus) {
        let mut budget = 8;
        while budget > 0
            && self.state.game_state == GameState::InProgress
            && self.state.side(self.state.active_side).is_ai()
        {
            budget -= 1;
            let side = self.state.active_side;
            let opponent = side.other();
            let (Some(slot), Some(target_slot)) = (
                self.state.side(side).first_standing(),
                self.state.side(opponent).first_standing(),
            ) else {
                check_termination(&mut self.state, bus);
                return;
            };

            let move_ = self.brains[side.index()].choose_move(
                &self.state,
                side,
                slot,
                opponent,
                target_slot,
                rng,
            );
            if resolve_move(
                &mut self.state,
                side,
                slot,
                move_,
                Some(target_slot),
                CallerRole::Player,
                rng,
                bus,
            )
            .is_err()
            {
                // An AI turn that cannot resolve means the battle is decided.
                check_termination(&mut self.state, bus);
                return;
            }

            if !check_termination(&mut self.state, bus).is_terminal() {
                advance_turn(&mut self.state, bus);
            }
        }
    }
}

/// Result of the instant single-exchange duel.
#[derive(Debug, Clone)]
pub struct OneShotOutcome {
    pub winner: Option<SideId>,
    /// HP-percentage gap between the two pets after the exchange.
    pub margin_percent: f64,
    /// Payout for the winner, scaled by the margin. Zero margin pays the
    /// wager back.
    pub payout: u32,
    pub events: Vec<BattleEvent>,
}

/// Both pets commit to exactly one basic strike. Strike damage depends only
/// on effective stats, so resolving sequentially over the shared engine is
/// equivalent to a simultaneous exchange.
pub fn run_one_shot(
    battle_id: String,
    side1: Participant,
    side2: Participant,
    wager: u32,
    rng: &mut TurnRng,
) -> ArenaResult<OneShotOutcome> {
    for side in [&side1, &side2] {
        if side.roster.is_empty() {
            return Err(RosterError::InvalidRosterSize(0).into());
        }
    }

    let mut state = BattleState::new(battle_id, side1, side2, BattleVariant::OneShot);
    let mut bus = EventBus::new();
    state.begin(rng, &mut bus);

    for _ in 0..2 {
        let side = state.active_side;
        let slot = state
            .side(side)
            .first_standing()
            .ok_or(BattleError::ExhaustedRoster(side))?;
        resolve_move(
            &mut state,
            side,
            slot,
            Move::Strike,
            None,
            CallerRole::Player,
            rng,
            &mut bus,
        )?;
        state.active_side = state.active_side.other();
    }

    let pct1 = state.side(SideId::One).roster[0].percent_hp();
    let pct2 = state.side(SideId::Two).roster[0].percent_hp();
    let margin = (pct1 - pct2).abs();
    let winner = if pct1 > pct2 {
        Some(SideId::One)
    } else if pct2 > pct1 {
        Some(SideId::Two)
    } else {
        None
    };

    state.game_state = match winner {
        Some(SideId::One) => GameState::Side1Win,
        Some(SideId::Two) => GameState::Side2Win,
        None => GameState::Draw,
    };
    bus.push(BattleEvent::BattleEnded { winner });

    Ok(OneShotOutcome {
        winner,
        margin_percent: margin,
        payout: wager + (wager as f64 * margin / 100.0) as u32,
        events: bus.take(),
    })
}

/// One combatant's instruction for a clash turn. Slots without an order
/// default to a basic strike against the targeting heuristic.
#[derive(Debug, Clone, Copy)]
pub struct ClashOrder {
    pub slot: usize,
    pub move_: Move,
    pub target: Option<usize>,
}

/// Team battle: 3-7 pets per side, one move per standing pet per turn, down
/// pets trickling back via the revival step.
#[derive(Debug)]
pub struct ClashRunner {
    state: BattleState,
    brains: [AiBrain; 2],
}

impl ClashRunner {
    pub fn new(battle_id: String, side1: Participant, side2: Participant) -> ArenaResult<Self> {
        for side in [&side1, &side2] {
            let size = side.roster.len();
            if !(CLASH_MIN_ROSTER..=CLASH_MAX_ROSTER).contains(&size) {
                return Err(RosterError::InvalidRosterSize(size).into());
            }
        }
        Ok(Self {
            state: BattleState::new(battle_id, side1, side2, BattleVariant::Clash),
            brains: [AiBrain::new(), AiBrain::new()],
        })
    }

    pub fn state(&self) -> &BattleState {
        &self.state
    }

    pub fn start(&mut self, rng: &mut TurnRng) -> ExecutionResult {
        let mut bus = EventBus::new();
        self.state.begin(rng, &mut bus);
        self.auto_play_ai(rng, &mut bus);
        execution_result(&self.state, &mut bus)
    }

    /// Resolve one full turn for a human side: one move per standing pet,
    /// defaults filled in for slots without orders.
    pub fn submit_orders(
        &mut self,
        side: SideId,
        orders: &[ClashOrder],
        role: CallerRole,
        rng: &mut TurnRng,
    ) -> ArenaResult<ExecutionResult> {
        if self.state.game_state != GameState::InProgress {
            return Err(BattleError::BattleNotInProgress.into());
        }
        if side != self.state.active_side {
            return Err(BattleError::OutOfTurn {
                acting: side,
                active: self.state.active_side,
            }
            .into());
        }
        // Validate the whole order set before resolving anything: a rejected
        // set must not leave earlier slots already acted.
        for order in orders {
            if order.move_ == Move::Cheat && role != CallerRole::Admin {
                return Err(MoveError::CheatForbidden.into());
            }
        }

        let mut bus = EventBus::new();
        self.play_side_turn(side, Some(orders), role, rng, &mut bus)?;
        self.auto_play_ai(rng, &mut bus);
        Ok(execution_result(&self.state, &mut bus))
    }

    fn play_side_turn(
        &mut self,
        side: SideId,
        orders: Option<&[ClashOrder]>,
        role: CallerRole,
        rng: &mut TurnRng,
        bus: &mut EventBus,
    ) -> ArenaResult<()> {
        let opponent = side.other();

        for slot in self.state.side(side).standing_slots() {
            if self.state.game_state != GameState::InProgress {
                break;
            }
            // A pet downed mid-turn by a counter-effect loses its action.
            if self.state.pet(side, slot).map_or(true, |pet| pet.is_down()) {
                continue;
            }

            let order = orders
                .and_then(|orders| orders.iter().find(|order| order.slot == slot).copied());
            let (move_, explicit_target) = match order {
                Some(order) => (order.move_, order.target),
                None => {
                    if self.state.side(side).is_ai() {
                        let target_slot =
                            match select_target(&self.state, opponent, None, rng) {
                                Some(slot) => slot,
                                None => break,
                            };
                        let move_ = self.brains[side.index()].choose_move(
                            &self.state,
                            side,
                            slot,
                            opponent,
                            target_slot,
                            rng,
                        );
                        (move_, Some(target_slot))
                    } else {
                        (Move::Strike, None)
                    }
                }
            };

            resolve_move(
                &mut self.state,
                side,
                slot,
                move_,
                explicit_target,
                role,
                rng,
                bus,
            )?;

            if check_termination(&mut self.state, bus).is_terminal() {
                break;
            }
        }

        if !self.state.game_state.is_terminal() {
            advance_turn(&mut self.state, bus);
        }
        Ok(())
    }

    /// Resume AI play; bounded per call for the same reason as
    /// `DuelRunner::step`.
    pub fn step(&mut self, rng: &mut TurnRng) -> ExecutionResult {
        let mut bus = EventBus::new();
        self.auto_play_ai(rng, &mut bus);
        execution_result(&self.state, &mut bus)
    }

    fn auto_play_ai(&mut self, rng: &mut TurnRng, bus: &mut EventBus) {
        let mut budget = 2;
        while budget > 0
            && self.state.game_state == GameState::InProgress
            && self.state.side(self.state.active_side).is_ai()
        {
            budget -= 1;
            let side = self.state.active_side;
            if self
                .play_side_turn(side, None, CallerRole::Player, rng, bus)
                .is_err()
            {
                check_termination(&mut self.state, bus);
                return;
            }
        }
    }
}

/// Pick an AI opponent pet of comparable level from a pool. Setup aborts with
/// `NoEligibleOpponent` when the pool has nothing suitable; there is no safe
/// fallback.
pub fn pick_ai_opponent(
    pool: &[PetInst],
    reference_level: u16,
    rng: &mut TurnRng,
) -> ArenaResult<PetInst> {
    let eligible: Vec<&PetInst> = pool
        .iter()
        .filter(|pet| pet.level.abs_diff(reference_level) <= 2)
        .collect();
    if eligible.is_empty() {
        return Err(RosterError::NoEligibleOpponent.into());
    }
    let roll = rng.next_outcome("ai opponent pick") as usize;
    Ok(eligible[roll % eligible.len()].clone())
}
