use crate::battle::state::{
    BattleEvent, BattleState, BattleVariant, EventBus, GameState, TurnRng, REVIVE_HP,
};
use crate::battle::stats::{
    buff_value, damage_value, effective_attack, effective_defense, effective_magic, heal_value,
    MAX_BUFF_STACKS,
};
use crate::errors::{ArenaResult, BattleError, MoveError};
use crate::moves::{get_move_data, BuffStat, Move, MoveKind};
use crate::participant::{CallerRole, SideId};

/// What a single resolved action produced, for the orchestrator/presentation
/// layer.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveOutcome {
    pub move_used: Move,
    pub dodged: bool,
    pub damage: Option<u32>,
    pub heal: Option<u32>,
    pub boost: Option<(BuffStat, u32)>,
    pub target: Option<(SideId, usize)>,
    pub flavor_text: String,
}

impl MoveOutcome {
    fn recorded(move_used: Move) -> Self {
        MoveOutcome {
            move_used,
            dodged: false,
            damage: None,
            heal: None,
            boost: None,
            target: None,
            flavor_text: String::new(),
        }
    }
}

/// Pick a target slot on `defender_side`. An explicit slot is honored when it
/// points at a standing pet; anything else falls back to the targeting
/// heuristic: lowest current HP, ties broken by a roll.
pub fn select_target(
    state: &BattleState,
    defender_side: SideId,
    explicit: Option<usize>,
    rng: &mut TurnRng,
) -> Option<usize> {
    let side = state.side(defender_side);

    if let Some(slot) = explicit {
        if side.roster.get(slot).is_some_and(|pet| !pet.is_down()) {
            return Some(slot);
        }
    }

    let standing = side.standing_slots();
    if standing.is_empty() {
        return None;
    }
    let lowest_hp = standing
        .iter()
        .map(|&slot| side.roster[slot].current_hp())
        .min()
        .expect("standing is non-empty");
    let candidates: Vec<usize> = standing
        .into_iter()
        .filter(|&slot| side.roster[slot].current_hp() == lowest_hp)
        .collect();
    if candidates.len() == 1 {
        Some(candidates[0])
    } else {
        let roll = rng.next_outcome("target tie-break") as usize;
        Some(candidates[roll % candidates.len()])
    }
}

/// Resolve one action for the active side. Rejects out-of-turn and
/// finished-battle actions with the state unchanged; everything else resolves
/// to events and an outcome, including flavor no-ops.
#[allow(clippy::too_many_arguments)]
pub fn resolve_move(
    state: &mut BattleState,
    actor_side: SideId,
    actor_slot: usize,
    move_: Move,
    explicit_target: Option<usize>,
    role: CallerRole,
    rng: &mut TurnRng,
    bus: &mut EventBus,
) -> ArenaResult<MoveOutcome> {
    if state.game_state != GameState::InProgress {
        return Err(BattleError::BattleNotInProgress.into());
    }
    if actor_side != state.active_side {
        return Err(BattleError::OutOfTurn {
            acting: actor_side,
            active: state.active_side,
        }
        .into());
    }
    if move_ == Move::Cheat && role != CallerRole::Admin {
        return Err(MoveError::CheatForbidden.into());
    }
    let actor_exists = state
        .pet(actor_side, actor_slot)
        .is_some_and(|pet| !pet.is_down());
    if !actor_exists {
        return Err(BattleError::NoActiveCombatant(actor_side).into());
    }

    let events_before = bus.len();
    let data = get_move_data(move_);
    let defender_side = actor_side.other();
    let mut outcome = MoveOutcome::recorded(move_);

    let actor_name = state.pet(actor_side, actor_slot).expect("checked above").name.clone();
    bus.push(BattleEvent::MoveUsed {
        side: actor_side,
        pet: actor_name.clone(),
        move_used: move_,
    });

    // Dodge roll. Repeating last turn's move telegraphs it.
    let previous = state.stats.get(actor_side, actor_slot).last_move;
    let dodge_percent = if previous == Some(move_) {
        data.repeat_dodge_percent
    } else {
        data.base_dodge_percent
    };
    let needs_target = move_.is_damage();
    let target_slot = if needs_target {
        let slot = select_target(state, defender_side, explicit_target, rng)
            .ok_or(BattleError::NoValidTarget { move_used: move_ })?;
        outcome.target = Some((defender_side, slot));
        Some(slot)
    } else {
        None
    };

    if dodge_percent > 0 && rng.next_outcome("dodge roll") <= dodge_percent {
        if let Some(slot) = target_slot {
            let defender_name = state.pet(defender_side, slot).expect("selected").name.clone();
            bus.push(BattleEvent::MoveDodged {
                attacker: actor_name,
                defender: defender_name,
                move_used: move_,
            });
        } else {
            // Self-targeted moves fumble rather than get dodged; same roll,
            // same telegraphing rule.
            bus.push(BattleEvent::MoveDodged {
                attacker: actor_name.clone(),
                defender: actor_name,
                move_used: move_,
            });
        }
        outcome.dodged = true;
        record_move(state, actor_side, actor_slot, move_);
        outcome.flavor_text = collect_flavor(state, bus, events_before);
        return Ok(outcome);
    }

    match data.kind {
        MoveKind::Damage | MoveKind::DamageCrit { .. } => {
            let slot = target_slot.expect("damage moves always target");
            let damage = compute_damage(state, actor_side, actor_slot, slot, move_, rng, bus);
            apply_damage(state, defender_side, slot, actor_side, actor_slot, damage, bus);
            outcome.damage = Some(damage);
        }
        MoveKind::Heal => {
            let heals_done = state.stats.get(actor_side, actor_slot).heals_performed;
            let pet = state.pet_mut(actor_side, actor_slot).expect("checked above");
            let amount = heal_value(pet, heals_done);
            let healed = pet.heal(amount);
            let new_hp = pet.current_hp();
            bus.push(BattleEvent::PetHealed {
                target: actor_name,
                amount: healed,
                new_hp,
            });
            state.stats.entry(actor_side, actor_slot).heals_performed += 1;
            outcome.heal = Some(healed);
        }
        MoveKind::Buff(stat) => {
            let record = state.stats.get(actor_side, actor_slot);
            let count = match stat {
                BuffStat::Attack => record.attack_boosts,
                BuffStat::Defense => record.defense_boosts,
            };
            if count >= MAX_BUFF_STACKS {
                bus.push(BattleEvent::BoostFizzled {
                    target: actor_name,
                    stat,
                });
            } else {
                let pet = state.pet_mut(actor_side, actor_slot).expect("checked above");
                let base = match stat {
                    BuffStat::Attack => pet.attack as u32,
                    BuffStat::Defense => pet.defense as u32,
                };
                let amount = buff_value(base, count);
                match stat {
                    BuffStat::Attack => pet.mods.attack += amount as i32,
                    BuffStat::Defense => pet.mods.defense += amount as i32,
                }
                bus.push(BattleEvent::StatBoosted {
                    target: actor_name,
                    stat,
                    amount,
                });
                let record = state.stats.entry(actor_side, actor_slot);
                match stat {
                    BuffStat::Attack => record.attack_boosts += 1,
                    BuffStat::Defense => record.defense_boosts += 1,
                }
                outcome.boost = Some((stat, amount));
            }
        }
        MoveKind::Drain => {
            let slot = target_slot.expect("drain always targets");
            let actor_pct = state.pet(actor_side, actor_slot).expect("checked").percent_hp();
            let target_pct = state.pet(defender_side, slot).expect("selected").percent_hp();
            if actor_pct >= target_pct {
                bus.push(BattleEvent::EqualizeFizzled { actor: actor_name });
            } else {
                let gap = (target_pct - actor_pct) / 100.0;
                let target_max = state.pet(defender_side, slot).expect("selected").total_max_hp();
                let cap = damage_cap(target_max, data.damage_cap_percent);
                let damage = ((target_max as f64 * gap * data.power).round() as u32)
                    .clamp(1, cap);
                apply_damage(state, defender_side, slot, actor_side, actor_slot, damage, bus);
                outcome.damage = Some(damage);

                let pet = state.pet_mut(actor_side, actor_slot).expect("checked");
                let heal_amount = (pet.total_max_hp() as f64 * gap * data.power).round() as u32;
                let healed = pet.heal(heal_amount);
                let new_hp = pet.current_hp();
                if healed > 0 {
                    bus.push(BattleEvent::PetHealed {
                        target: actor_name,
                        amount: healed,
                        new_hp,
                    });
                }
                outcome.heal = Some(healed);
            }
        }
    }

    record_move(state, actor_side, actor_slot, move_);
    outcome.flavor_text = collect_flavor(state, bus, events_before);
    Ok(outcome)
}

/// Damage for the direct-damage move shapes, capped at the move's fraction of
/// the target's max HP. `Hex` resolves magic against magic; the physical
/// strikes resolve attack against defense.
fn compute_damage(
    state: &BattleState,
    actor_side: SideId,
    actor_slot: usize,
    target_slot: usize,
    move_: Move,
    rng: &mut TurnRng,
    bus: &mut EventBus,
) -> u32 {
    let data = get_move_data(move_);
    let defender_side = actor_side.other();
    let actor = state.pet(actor_side, actor_slot).expect("validated");
    let target = state.pet(defender_side, target_slot).expect("validated");

    if move_ == Move::Cheat {
        // Deterministic debug strike: leaves the target at exactly 1 HP.
        return target.current_hp().saturating_sub(1);
    }

    let (offense, guard) = match move_ {
        Move::Hex => (effective_magic(actor), effective_magic(target)),
        _ => (effective_attack(actor), effective_defense(target)),
    };

    let mut damage = damage_value(offense, guard, data.power) as f64;

    if move_ == Move::WildSwing {
        let roll = rng.next_outcome("wild swing variance");
        let factor = 0.5 + roll as f64 / 100.0;
        damage = (damage * factor).round();
    }

    if let MoveKind::DamageCrit {
        crit_percent,
        crit_factor,
    } = data.kind
    {
        if rng.next_outcome("crit roll") <= crit_percent {
            damage = (damage * crit_factor).round();
            bus.push(BattleEvent::CriticalHit {
                attacker: actor.name.clone(),
                move_used: move_,
            });
        }
    }

    let cap = damage_cap(target.total_max_hp(), data.damage_cap_percent);
    (damage as u32).clamp(1, cap)
}

fn damage_cap(target_max_hp: u32, cap_percent: u8) -> u32 {
    (target_max_hp * cap_percent as u32 / 100).max(1)
}

/// Subtract HP, update both running damage counters, and handle knockouts.
fn apply_damage(
    state: &mut BattleState,
    defender_side: SideId,
    target_slot: usize,
    actor_side: SideId,
    actor_slot: usize,
    damage: u32,
    bus: &mut EventBus,
) {
    let pet = state.pet_mut(defender_side, target_slot).expect("validated");
    pet.take_damage(damage);
    let remaining = pet.current_hp();
    let name = pet.name.clone();
    let downed = pet.is_down();

    bus.push(BattleEvent::DamageDealt {
        target: name.clone(),
        damage,
        remaining_hp: remaining,
    });

    state.stats.entry(actor_side, actor_slot).damage_dealt += damage as u64;
    state.stats.entry(defender_side, target_slot).damage_taken += damage as u64;

    if downed {
        state.side_mut(defender_side).down.insert(target_slot);
        bus.push(BattleEvent::PetDowned {
            side: defender_side,
            slot: target_slot,
            pet: name,
        });
    }
}

fn record_move(state: &mut BattleState, side: SideId, slot: usize, move_: Move) {
    state.stats.entry(side, slot).last_move = Some(move_);
    state.side_mut(side).last_move = Some(move_);
}

fn collect_flavor(state: &BattleState, bus: &EventBus, from: usize) -> String {
    bus.events()[from..]
        .iter()
        .filter_map(|event| event.format(state))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Check the two termination rules and settle `game_state` accordingly.
/// Returns the (possibly unchanged) game state.
pub fn check_termination(state: &mut BattleState, bus: &mut EventBus) -> GameState {
    if state.game_state != GameState::InProgress {
        return state.game_state;
    }

    for side in [SideId::One, SideId::Two] {
        if state.side(side).is_defeated() {
            let winner = side.other();
            bus.push(BattleEvent::SideDefeated { side });
            bus.push(BattleEvent::BattleEnded {
                winner: Some(winner),
            });
            state.game_state = match winner {
                SideId::One => GameState::Side1Win,
                SideId::Two => GameState::Side2Win,
            };
            return state.game_state;
        }
    }

    if state.turn_number > state.max_turns {
        bus.push(BattleEvent::TurnCeilingReached {
            turn_number: state.max_turns,
        });
        let hp1 = state.side(SideId::One).total_percent_hp();
        let hp2 = state.side(SideId::Two).total_percent_hp();
        state.game_state = if hp1 > hp2 {
            bus.push(BattleEvent::BattleEnded {
                winner: Some(SideId::One),
            });
            GameState::Side1Win
        } else if hp2 > hp1 {
            bus.push(BattleEvent::BattleEnded {
                winner: Some(SideId::Two),
            });
            GameState::Side2Win
        } else {
            // Exact tie: no winner, rewards split by the orchestrator.
            bus.push(BattleEvent::BattleEnded { winner: None });
            GameState::Draw
        };
    }

    state.game_state
}

/// Hand control to the other side. Clash battles run the revival trickle for
/// the newly active side's down pets before its pets act.
pub fn advance_turn(state: &mut BattleState, bus: &mut EventBus) -> GameState {
    if state.game_state != GameState::InProgress {
        return state.game_state;
    }

    state.active_side = state.active_side.other();
    state.turn_number += 1;

    if check_termination(state, bus).is_terminal() {
        return state.game_state;
    }

    bus.push(BattleEvent::TurnStarted {
        turn_number: state.turn_number,
    });

    if state.variant == BattleVariant::Clash {
        revive_down_pets(state, state.active_side, bus);
    }

    state.game_state
}

/// Down pets regain a fixed trickle at their side's turn start and rejoin
/// once HP is positive. Not permanent elimination.
fn revive_down_pets(state: &mut BattleState, side: SideId, bus: &mut EventBus) {
    let down_slots: Vec<usize> = {
        let mut slots: Vec<usize> = state.side(side).down.iter().copied().collect();
        slots.sort_unstable();
        slots
    };

    for slot in down_slots {
        let pet = match state.pet_mut(side, slot) {
            Some(pet) => pet,
            None => continue,
        };
        pet.heal(REVIVE_HP);
        if !pet.is_down() {
            let hp = pet.current_hp();
            let name = pet.name.clone();
            state.side_mut(side).down.remove(&slot);
            bus.push(BattleEvent::PetRevived {
                side,
                slot,
                pet: name,
                hp,
            });
        }
    }
}

/// Some(winner) once a side has won, None while in progress or drawn.
pub fn battle_winner(state: &BattleState) -> Option<SideId> {
    state.game_state.winner()
}
