//! The move-selection heuristic for AI-controlled participants.
//!
//! Scores every candidate move from advantage ratios, the per-battle
//! statistics, a behavioral mood, a one-step opponent predictor, and a risk
//! adjustment, then samples mostly greedily with a phase-dependent dash of
//! randomness. Reads battle state, never writes it; all randomness comes from
//! the injected `TurnRng`.

use crate::battle::state::{BattleState, TurnRng};
use crate::battle::stats::{
    buff_value, damage_value, effective_attack, effective_defense, effective_magic, heal_value,
    MAX_BUFF_STACKS,
};
use crate::moves::{get_move_data, BuffStat, Move, MoveKind};
use crate::participant::SideId;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// Below this HP percentage the AI is forced defensive and the heal priority
/// rule fires.
pub const CRITICAL_HP_PERCENT: f64 = 25.0;
/// A target below this percentage late-game forces the aggressive mood.
const NEAR_DEFEAT_PERCENT: f64 = 20.0;
/// Chance per decision that the mood resamples.
const MOOD_SHIFT_PERCENT: u8 = 35;
/// Turns-remaining threshold that flags the endgame.
const ENDGAME_TURNS_LEFT: u32 = 5;
/// Turn-number threshold that flags the early game.
const EARLY_GAME_TURNS: u32 = 6;
/// HP-percentage lead the target needs before the equalize priority fires.
const EQUALIZE_GAP_PERCENT: f64 = 25.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mood {
    Aggressive,
    Defensive,
    Balanced,
}

/// A decision-maker for one AI participant. Holds the sticky mood between
/// turns; everything else is recomputed per decision.
#[derive(Debug, Clone)]
pub struct AiBrain {
    mood: Mood,
}

impl Default for AiBrain {
    fn default() -> Self {
        Self::new()
    }
}

struct Situation {
    attack_ratio: f64,
    magic_ratio: f64,
    actor_pct: f64,
    target_pct: f64,
    /// Positive when the actor is ahead on HP percentage.
    hp_gap: f64,
    is_early_game: bool,
    is_endgame: bool,
}

impl AiBrain {
    pub fn new() -> Self {
        Self {
            mood: Mood::Balanced,
        }
    }

    #[cfg(test)]
    pub fn with_mood(mood: Mood) -> Self {
        Self { mood }
    }

    pub fn mood(&self) -> Mood {
        self.mood
    }

    /// Pick a move for `(actor_side, actor_slot)` against
    /// `(target_side, target_slot)`.
    pub fn choose_move(
        &mut self,
        state: &BattleState,
        actor_side: SideId,
        actor_slot: usize,
        target_side: SideId,
        target_slot: usize,
        rng: &mut TurnRng,
    ) -> Move {
        let actor = match state.pet(actor_side, actor_slot) {
            Some(pet) => pet,
            None => return Move::Strike,
        };
        let target = match state.pet(target_side, target_slot) {
            Some(pet) => pet,
            None => return Move::Strike,
        };

        let situation = Situation {
            attack_ratio: effective_attack(actor) as f64 / effective_defense(target).max(1) as f64,
            magic_ratio: effective_magic(actor) as f64 / effective_magic(target).max(1) as f64,
            actor_pct: actor.percent_hp(),
            target_pct: target.percent_hp(),
            hp_gap: actor.percent_hp() - target.percent_hp(),
            is_early_game: state.turn_number <= EARLY_GAME_TURNS,
            is_endgame: state.max_turns.saturating_sub(state.turn_number) <= ENDGAME_TURNS_LEFT,
        };

        self.update_mood(&situation, rng);

        let own_stats = state.stats.get(actor_side, actor_slot);
        let opp_stats = state.stats.get(target_side, target_slot);

        let mut scores: Vec<(Move, f64)> = Move::CANDIDATES
            .iter()
            .map(|&move_| {
                let raw = self.raw_score(
                    move_,
                    state,
                    actor_side,
                    actor_slot,
                    target_side,
                    target_slot,
                    &situation,
                );
                (move_, raw)
            })
            .collect();

        apply_prediction_bonuses(&mut scores, opp_stats.last_move);
        normalize_scores(&mut scores);
        apply_risk(&mut scores, own_stats.last_move, &situation);

        let positive: Vec<(Move, f64)> = scores
            .iter()
            .copied()
            .filter(|(_, score)| *score > 0.0)
            .collect();
        if positive.is_empty() {
            return Move::Strike;
        }

        // Phase-dependent unpredictability: occasionally pick uniformly among
        // anything that scored at all.
        let explore_percent = if situation.is_early_game {
            20
        } else if situation.is_endgame {
            5
        } else {
            10
        };
        if rng.next_outcome("ai explore roll") <= explore_percent {
            let roll = rng.next_outcome("ai explore pick") as usize;
            return positive[roll % positive.len()].0;
        }

        if let Some(move_) = self.priority_rule(
            &positive,
            state,
            actor_side,
            actor_slot,
            target_side,
            target_slot,
            &own_stats,
            &opp_stats,
            &situation,
        ) {
            return move_;
        }

        weighted_pick(&positive, rng)
    }

    /// Mood handling: forced defensive at critical HP, forced aggressive when
    /// the target is nearly finished late-game, otherwise a sticky mood with
    /// a shift chance per decision.
    fn update_mood(&mut self, situation: &Situation, rng: &mut TurnRng) {
        if situation.actor_pct < CRITICAL_HP_PERCENT {
            self.mood = Mood::Defensive;
            return;
        }
        if situation.target_pct < NEAR_DEFEAT_PERCENT && situation.is_endgame {
            self.mood = Mood::Aggressive;
            return;
        }
        if rng.next_outcome("mood shift roll") <= MOOD_SHIFT_PERCENT {
            let pick = rng.next_outcome("mood pick");
            self.mood = match pick % 3 {
                0 => Mood::Aggressive,
                1 => Mood::Defensive,
                _ => Mood::Balanced,
            };
        }
    }

    /// Expected-value score before normalization: formula output times hit
    /// chance times the relevant advantage ratio, then the multiplicative
    /// phase/investment/opponent/mood adjustments.
    #[allow(clippy::too_many_arguments)]
    fn raw_score(
        &self,
        move_: Move,
        state: &BattleState,
        actor_side: SideId,
        actor_slot: usize,
        target_side: SideId,
        target_slot: usize,
        situation: &Situation,
    ) -> f64 {
        let actor = state.pet(actor_side, actor_slot).expect("caller checked");
        let target = state.pet(target_side, target_slot).expect("caller checked");
        let own_stats = state.stats.get(actor_side, actor_slot);
        let opp_stats = state.stats.get(target_side, target_slot);
        let data = get_move_data(move_);

        let dodge = dodge_estimate(move_, own_stats.last_move);
        let hit_chance = 1.0 - dodge;

        let mut score = match data.kind {
            MoveKind::Damage => {
                let (offense, guard, ratio) = if move_ == Move::Hex {
                    (
                        effective_magic(actor),
                        effective_magic(target),
                        situation.magic_ratio,
                    )
                } else {
                    (
                        effective_attack(actor),
                        effective_defense(target),
                        situation.attack_ratio,
                    )
                };
                damage_value(offense, guard, data.power) as f64 * hit_chance * ratio
            }
            MoveKind::DamageCrit {
                crit_percent,
                crit_factor,
            } => {
                let base = damage_value(
                    effective_attack(actor),
                    effective_defense(target),
                    data.power,
                ) as f64;
                let expected_crit = 1.0 + crit_percent as f64 / 100.0 * (crit_factor - 1.0);
                base * expected_crit * hit_chance * situation.attack_ratio
            }
            MoveKind::Heal => {
                let missing = (actor.total_max_hp() - actor.current_hp()) as f64;
                let amount = heal_value(actor, own_stats.heals_performed) as f64;
                amount.min(missing) * hit_chance
            }
            MoveKind::Buff(stat) => {
                let (count, base_stat) = match stat {
                    BuffStat::Attack => (own_stats.attack_boosts, actor.attack as u32),
                    BuffStat::Defense => (own_stats.defense_boosts, actor.defense as u32),
                };
                if count >= MAX_BUFF_STACKS {
                    0.0
                } else {
                    // A buff pays out over the remaining exchanges.
                    buff_value(base_stat, count) as f64 * 3.0 * hit_chance
                        / (1.0 + count as f64)
                }
            }
            MoveKind::Drain => {
                if situation.actor_pct >= situation.target_pct {
                    0.0
                } else {
                    let gap = (situation.target_pct - situation.actor_pct) / 100.0;
                    let drain = target.total_max_hp() as f64 * gap * data.power
                        + actor.total_max_hp() as f64 * gap * data.power;
                    drain * hit_chance
                }
            }
        };

        // Game phase: set up early, cash out late.
        if situation.is_early_game && matches!(data.kind, MoveKind::Buff(_)) {
            score *= 1.4;
        }
        if situation.is_endgame {
            score *= match data.kind {
                MoveKind::Buff(_) => 0.5,
                MoveKind::Heal => 0.8,
                _ => 1.25,
            };
        }

        // Opponent investment: answer a stacked offense with defense and a
        // stacked defense with magic or offense of our own.
        match move_ {
            Move::Harden => score *= 1.0 + 0.2 * opp_stats.attack_boosts as f64,
            Move::Sharpen => score *= 1.0 + 0.2 * opp_stats.defense_boosts as f64,
            Move::Hex => score *= 1.0 + 0.1 * opp_stats.defense_boosts as f64,
            _ => {}
        }

        score * self.mood_multiplier(&data.kind)
    }

    fn mood_multiplier(&self, kind: &MoveKind) -> f64 {
        match (self.mood, kind) {
            (Mood::Aggressive, MoveKind::Damage)
            | (Mood::Aggressive, MoveKind::DamageCrit { .. })
            | (Mood::Aggressive, MoveKind::Drain) => 1.3,
            (Mood::Aggressive, _) => 0.8,
            (Mood::Defensive, MoveKind::Heal) => 1.4,
            (Mood::Defensive, MoveKind::Buff(BuffStat::Defense)) => 1.3,
            (Mood::Defensive, MoveKind::Damage)
            | (Mood::Defensive, MoveKind::DamageCrit { .. }) => 0.8,
            _ => 1.0,
        }
    }

    /// Hard priority rules consulted on the greedy branch, in order.
    #[allow(clippy::too_many_arguments)]
    fn priority_rule(
        &self,
        positive: &[(Move, f64)],
        state: &BattleState,
        actor_side: SideId,
        actor_slot: usize,
        target_side: SideId,
        target_slot: usize,
        own_stats: &crate::battle::state::CombatantStats,
        opp_stats: &crate::battle::state::CombatantStats,
        situation: &Situation,
    ) -> Option<Move> {
        let has_positive = |move_: Move| positive.iter().any(|(m, _)| *m == move_);

        // Critical HP: heal if healing is worth anything at all.
        if situation.actor_pct < CRITICAL_HP_PERCENT && has_positive(Move::Mend) {
            return Some(Move::Mend);
        }

        // Big HP-percentage deficit: siphon it back.
        if situation.hp_gap <= -EQUALIZE_GAP_PERCENT && has_positive(Move::Equalize) {
            return Some(Move::Equalize);
        }

        // Lethal-range burst late-game.
        if situation.is_endgame && has_positive(Move::Burst) {
            let actor = state.pet(actor_side, actor_slot).expect("caller checked");
            let target = state.pet(target_side, target_slot).expect("caller checked");
            let data = get_move_data(Move::Burst);
            let expected = damage_value(
                effective_attack(actor),
                effective_defense(target),
                data.power,
            );
            if expected >= target.current_hp() {
                return Some(Move::Burst);
            }
        }

        // Counters against a heavily boosted opponent.
        if opp_stats.attack_boosts >= 2
            && own_stats.defense_boosts < MAX_BUFF_STACKS
            && has_positive(Move::Harden)
        {
            return Some(Move::Harden);
        }
        if opp_stats.defense_boosts >= 2
            && own_stats.attack_boosts < MAX_BUFF_STACKS
            && has_positive(Move::Sharpen)
        {
            return Some(Move::Sharpen);
        }

        None
    }
}

/// Dodge chance the catalog predicts for this move given what the actor used
/// last turn.
fn dodge_estimate(move_: Move, own_last_move: Option<Move>) -> f64 {
    let data = get_move_data(move_);
    let percent = if own_last_move == Some(move_) {
        data.repeat_dodge_percent
    } else {
        data.base_dodge_percent
    };
    percent as f64 / 100.0
}

/// One-step opponent predictor: damage moves are sticky, buffs alternate to
/// the counter-buff. Counter moves get small reactive bonuses.
fn apply_prediction_bonuses(scores: &mut [(Move, f64)], opp_last_move: Option<Move>) {
    let predicted = match opp_last_move {
        Some(move_) if move_.is_damage() => Some(move_),
        Some(Move::Harden) => Some(Move::Sharpen),
        Some(Move::Sharpen) => Some(Move::Harden),
        _ => None,
    };

    let Some(predicted) = predicted else {
        return;
    };

    for (move_, score) in scores.iter_mut() {
        if predicted.is_damage() {
            // ~75% they swing again; a defense buff blunts it.
            if *move_ == Move::Harden {
                *score *= 1.25;
            }
        } else if predicted == Move::Harden && *move_ == Move::Hex {
            // A defense stack is best answered around the defense stat.
            *score *= 1.15;
        } else if predicted == Move::Sharpen && *move_ == Move::Harden {
            *score *= 1.15;
        }
    }
}

/// Scale the best score to 100 so the risk adjustment and the weighted pick
/// work on a common 0-100 range.
fn normalize_scores(scores: &mut [(Move, f64)]) {
    let best = scores
        .iter()
        .map(|(_, score)| OrderedFloat(*score))
        .max()
        .map(|of| of.0)
        .unwrap_or(0.0);
    if best <= 0.0 {
        return;
    }
    for (_, score) in scores.iter_mut() {
        *score = *score / best * 100.0;
    }
}

/// Risk multiplier `(1 - risk)`: rewards healing and buffing, penalizes
/// likely-dodged moves and swinging while far ahead (feeding an opponent who
/// only needs to stall).
fn apply_risk(scores: &mut [(Move, f64)], own_last_move: Option<Move>, situation: &Situation) {
    for (move_, score) in scores.iter_mut() {
        let data = get_move_data(*move_);
        let mut risk = dodge_estimate(*move_, own_last_move) * 0.5;
        if move_.is_damage() && situation.hp_gap >= 40.0 {
            risk += 0.2;
        }
        if matches!(data.kind, MoveKind::Heal | MoveKind::Buff(_)) {
            risk -= 0.1;
        }
        let risk = risk.clamp(0.0, 0.9);
        *score = (*score * (1.0 - risk)).max(0.0);
    }
}

/// Weighted-random selection proportional to score.
fn weighted_pick(positive: &[(Move, f64)], rng: &mut TurnRng) -> Move {
    let total: f64 = positive.iter().map(|(_, score)| score).sum();
    let roll = rng.next_outcome("ai weighted pick") as f64 / 100.0 * total;
    let mut cumulative = 0.0;
    for (move_, score) in positive {
        cumulative += score;
        if roll <= cumulative {
            return *move_;
        }
    }
    positive
        .iter()
        .max_by_key(|(_, score)| OrderedFloat(*score))
        .map(|(move_, _)| *move_)
        .unwrap_or(Move::Strike)
}
