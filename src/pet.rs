use crate::errors::{ArenaResult, RosterError};
use crate::species::PetSpecies;
use serde::{Deserialize, Serialize};

/// Temporary stat offsets that exist only for the duration of a battle.
/// Moves mutate these; everything else reads through the effective-stat
/// calculators in `battle::stats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleMods {
    pub attack: i32,
    pub defense: i32,
    pub magic: i32,
    pub hp: i32,
    pub max_hp: i32,
}

/// A single pet instance participating in battles.
///
/// `max_hp` is computed once from the pet-strength composite formula and
/// frozen; in-battle boosts go through `mods.max_hp`. Current HP is derived
/// from the `damage_taken` accumulator rather than stored, so raising max HP
/// mid-battle never retroactively heals or hurts the pet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PetInst {
    pub name: String,
    pub icon: String,
    pub species: String,
    pub level: u16,
    pub attack: u16,
    pub defense: u16,
    pub magic: u16,
    pub gear_attack: u16,
    pub gear_defense: u16,
    pub gear_magic: u16,
    pub max_hp: u32,
    pub mods: BattleMods,
    damage_taken: u32,
}

/// Raw pet record shape consumed from the external data store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PetRecord {
    pub name: String,
    #[serde(default)]
    pub icon: String,
    pub species: String,
    pub exp: u64,
    pub attack: u16,
    pub defense: u16,
    pub magic: u16,
    #[serde(default)]
    pub gear_attack: u16,
    #[serde(default)]
    pub gear_defense: u16,
    #[serde(default)]
    pub gear_magic: u16,
}

impl PetInst {
    /// Create a pet instance from explicit base data.
    pub fn new(
        name: String,
        icon: String,
        species: String,
        level: u16,
        attack: u16,
        defense: u16,
        magic: u16,
        gear: (u16, u16, u16),
    ) -> Self {
        let mut pet = PetInst {
            name,
            icon,
            species,
            level: level.max(1),
            attack,
            defense,
            magic,
            gear_attack: gear.0,
            gear_defense: gear.1,
            gear_magic: gear.2,
            max_hp: 0,
            mods: BattleMods::default(),
            damage_taken: 0,
        };
        pet.max_hp = crate::battle::stats::max_hp_for(&pet);
        pet
    }

    /// Create a pet instance from species data at a given experience total.
    pub fn from_species(species: &PetSpecies, exp: u64, gear: (u16, u16, u16)) -> Self {
        Self::new(
            species.name.clone(),
            species.icon.clone(),
            species.name.to_uppercase(),
            crate::battle::stats::level_for_exp(exp),
            species.base_stats.attack,
            species.base_stats.defense,
            species.base_stats.magic,
            gear,
        )
    }

    /// Parse a raw JSON pet record from the external data store.
    pub fn from_record(raw: &str) -> ArenaResult<Self> {
        let record: PetRecord = serde_json::from_str(raw)
            .map_err(|e| RosterError::MalformedRecord(e.to_string()))?;
        Ok(Self::new(
            record.name,
            record.icon,
            record.species,
            crate::battle::stats::level_for_exp(record.exp),
            record.attack,
            record.defense,
            record.magic,
            (record.gear_attack, record.gear_defense, record.gear_magic),
        ))
    }

    /// Max HP including the in-battle boost, never below 1.
    pub fn total_max_hp(&self) -> u32 {
        let total = self.max_hp as i64 + self.mods.max_hp as i64;
        total.max(1) as u32
    }

    /// Current HP, never presented as negative.
    pub fn current_hp(&self) -> u32 {
        let hp = self.total_max_hp() as i64 - self.damage_taken as i64 + self.mods.hp as i64;
        hp.clamp(0, self.total_max_hp() as i64) as u32
    }

    /// Current HP as a percentage of total max HP, in [0, 100].
    pub fn percent_hp(&self) -> f64 {
        (self.current_hp() as f64 / self.total_max_hp() as f64 * 100.0).clamp(0.0, 100.0)
    }

    pub fn is_down(&self) -> bool {
        self.current_hp() == 0
    }

    /// Set current HP directly, recomputing the damage accumulator so later
    /// max-HP changes leave this value undisturbed.
    pub fn set_hp(&mut self, hp: u32) {
        let hp = hp.min(self.total_max_hp());
        let accumulated =
            self.total_max_hp() as i64 + self.mods.hp as i64 - hp as i64;
        self.damage_taken = accumulated.max(0) as u32;
    }

    /// Apply damage, clamped so current HP bottoms out at zero.
    /// Returns the damage actually absorbed.
    pub fn take_damage(&mut self, damage: u32) -> u32 {
        let absorbed = damage.min(self.current_hp());
        self.damage_taken += absorbed;
        absorbed
    }

    /// Restore HP up to total max. Returns the amount actually healed.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let missing = self.total_max_hp() - self.current_hp();
        let healed = amount.min(missing);
        self.damage_taken = self.damage_taken.saturating_sub(healed);
        healed
    }

    /// Clear all temporary battle modifiers and restore full HP.
    pub fn reset_for_battle(&mut self) {
        self.mods = BattleMods::default();
        self.damage_taken = 0;
    }
}
