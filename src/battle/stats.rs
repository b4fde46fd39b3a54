use crate::participant::{Participant, SideId};
use crate::pet::PetInst;

/// Steepness of the power-law diminishing-returns curve. Gear bonuses and
/// effective offense both pass through it, so raw stat growth lands
/// sub-linearly on battle output.
pub const CURVE_ANGLE: f64 = 0.85;

/// Level-linear baseline: every level adds 3/2 points to each stat line.
const LEVEL_STAT_NUM: i64 = 3;
const LEVEL_STAT_DEN: i64 = 2;

/// Floor on heal magnitude: repeated heals decay to this, never below.
pub const MIN_HEAL: u32 = 5;
/// Heal magnitude multiplier per heal already performed this battle.
pub const HEAL_DECAY: f64 = 0.65;
/// Buff magnitude multiplier per boost already applied this battle.
pub const BUFF_DECAY: f64 = 0.6;
/// A stat line stops accepting boosts after this many applications.
pub const MAX_BUFF_STACKS: u32 = 3;

/// Apply the diminishing-returns power curve.
pub fn diminish(value: f64) -> f64 {
    if value <= 0.0 {
        0.0
    } else {
        value.powf(CURVE_ANGLE)
    }
}

/// Derive a level from accumulated experience via a logarithmic curve.
/// Integer log keeps this exact and platform-independent.
pub fn level_for_exp(exp: u64) -> u16 {
    let bucket = exp / 64 + 1;
    (bucket.ilog2() as u16) + 1
}

fn level_term(pet: &PetInst) -> i64 {
    pet.level as i64 * LEVEL_STAT_NUM / LEVEL_STAT_DEN
}

fn effective_stat(base: u16, level_term: i64, gear: u16, modifier: i32) -> u32 {
    let value = base as i64 + level_term + diminish(gear as f64).round() as i64 + modifier as i64;
    value.max(1) as u32
}

/// Effective offense: level-linear baseline + diminished gear term +
/// temporary battle modifier.
pub fn effective_attack(pet: &PetInst) -> u32 {
    effective_stat(pet.attack, level_term(pet), pet.gear_attack, pet.mods.attack)
}

pub fn effective_defense(pet: &PetInst) -> u32 {
    effective_stat(
        pet.defense,
        level_term(pet),
        pet.gear_defense,
        pet.mods.defense,
    )
}

pub fn effective_magic(pet: &PetInst) -> u32 {
    effective_stat(pet.magic, level_term(pet), pet.gear_magic, pet.mods.magic)
}

/// Composite pet strength: feeds the max-HP formula, HP equalization, and
/// starting-side selection.
pub fn pet_strength(pet: &PetInst) -> f64 {
    (effective_attack(pet) + effective_defense(pet) + effective_magic(pet)) as f64
        + 2.0 * pet.level as f64
}

/// Base max HP, computed once at pet construction and then frozen.
pub fn max_hp_for(pet: &PetInst) -> u32 {
    let strength = pet_strength(pet);
    40 + 6 * pet.level as u32 + diminish(strength).round() as u32
}

/// Core damage formula shared by every damage move: the attacker's effective
/// offense is diminished, scaled by move power, and reduced by 40% of the
/// relevant guard stat. Always at least 1.
pub fn damage_value(eff_offense: u32, eff_guard: u32, power: f64) -> u32 {
    let raw = diminish(eff_offense as f64) * power - eff_guard as f64 * 0.4;
    raw.round().max(1.0) as u32
}

/// Heal magnitude for a pet that has already performed `heals_done` heals.
pub fn heal_value(pet: &PetInst, heals_done: u32) -> u32 {
    let base = pet.total_max_hp() as f64 * 0.25;
    let decayed = (base * HEAL_DECAY.powi(heals_done as i32)).round() as u32;
    decayed.max(MIN_HEAL)
}

/// Buff magnitude for a stat with base value `base_stat` after `boosts_done`
/// prior applications.
pub fn buff_value(base_stat: u32, boosts_done: u32) -> u32 {
    let raw = (base_stat as f64 * 0.2 * BUFF_DECAY.powi(boosts_done as i32)).round() as u32;
    raw.max(1)
}

/// One-time HP equalization applied when a battle starts: every pet on the
/// weaker side gets a max-HP boost worth half the average per-pet strength
/// gap, so raw base-strength disparity does not trivialize the outcome.
/// Returns the boosted side and the per-pet boost, if any.
pub fn apply_hp_equalization(sides: &mut [Participant; 2]) -> Option<(SideId, u32)> {
    let avg = |side: &Participant| -> f64 {
        if side.roster.is_empty() {
            0.0
        } else {
            side.aggregate_strength() / side.roster.len() as f64
        }
    };

    let avg1 = avg(&sides[0]);
    let avg2 = avg(&sides[1]);
    let (weak_index, gap) = if avg1 < avg2 {
        (0, avg2 - avg1)
    } else if avg2 < avg1 {
        (1, avg1 - avg2)
    } else {
        return None;
    };

    let boost = (gap / 2.0).round() as u32;
    if boost == 0 {
        return None;
    }

    for pet in &mut sides[weak_index].roster {
        pet.mods.max_hp += boost as i32;
    }
    let side = if weak_index == 0 { SideId::One } else { SideId::Two };
    Some((side, boost))
}

/// The weaker side is biased to start; an exact strength tie falls to a coin
/// flip from the injected RNG.
pub fn choose_starting_side(
    sides: &[Participant; 2],
    rng: &mut crate::battle::state::TurnRng,
) -> SideId {
    let s1 = sides[0].aggregate_strength();
    let s2 = sides[1].aggregate_strength();
    if s1 < s2 {
        SideId::One
    } else if s2 < s1 {
        SideId::Two
    } else if rng.next_outcome("starting side coin flip") <= 50 {
        SideId::One
    } else {
        SideId::Two
    }
}
