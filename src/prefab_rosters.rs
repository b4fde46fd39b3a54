//! Canned pets and rosters for demos and tests, so callers can spin up a
//! battle without wiring the external pet store.

use crate::errors::ArenaResult;
use crate::participant::Participant;
use crate::pet::PetInst;

fn pet(
    name: &str,
    icon: &str,
    species: &str,
    level: u16,
    attack: u16,
    defense: u16,
    magic: u16,
    gear: (u16, u16, u16),
) -> PetInst {
    PetInst::new(
        name.to_string(),
        icon.to_string(),
        species.to_string(),
        level,
        attack,
        defense,
        magic,
        gear,
    )
}

pub fn brambles() -> PetInst {
    pet("Brambles", "🦔", "HEDGEHOG", 5, 50, 20, 10, (0, 0, 0))
}

pub fn gustav() -> PetInst {
    pet("Gustav", "🐢", "SNAPPER", 5, 30, 40, 5, (0, 0, 0))
}

pub fn cinder() -> PetInst {
    pet("Cinder", "🔥", "FLAME_PUP", 6, 44, 24, 30, (6, 0, 0))
}

pub fn mirelle() -> PetInst {
    pet("Mirelle", "🌊", "TIDE_CAT", 6, 26, 30, 48, (0, 0, 8))
}

pub fn boulder() -> PetInst {
    pet("Boulder", "🪨", "STONE_OX", 7, 38, 56, 8, (0, 10, 0))
}

pub fn flicker() -> PetInst {
    pet("Flicker", "⚡", "SPARK_WISP", 4, 34, 16, 40, (0, 0, 0))
}

pub fn umbra() -> PetInst {
    pet("Umbra", "🌑", "SHADE_MOTH", 6, 40, 26, 36, (4, 4, 4))
}

/// A pool of AI pets spanning several levels, for opponent selection.
pub fn wild_pool() -> Vec<PetInst> {
    vec![
        gustav(),
        cinder(),
        mirelle(),
        boulder(),
        flicker(),
        umbra(),
    ]
}

/// A human side with a single duel pet.
pub fn duel_side(participant_id: &str, display_name: &str, pet: PetInst) -> Participant {
    Participant::human(
        participant_id.to_string(),
        display_name.to_string(),
        vec![pet],
    )
}

/// A clash roster of `size` pets (3-7), cycling through the prefab pets.
pub fn clash_roster(size: usize) -> ArenaResult<Vec<PetInst>> {
    use crate::errors::RosterError;
    if !(crate::battle::runner::CLASH_MIN_ROSTER..=crate::battle::runner::CLASH_MAX_ROSTER)
        .contains(&size)
    {
        return Err(RosterError::InvalidRosterSize(size).into());
    }
    let prefabs = [
        brambles(),
        gustav(),
        cinder(),
        mirelle(),
        boulder(),
        flicker(),
        umbra(),
    ];
    Ok(prefabs.into_iter().take(size).collect())
}
