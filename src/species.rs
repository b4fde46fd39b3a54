use crate::errors::{ArenaResult, RosterError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Loose elemental grouping for flavor and roster generation.
/// Elements carry no combat multiplier; the numeric model lives in `pet.rs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Element {
    Beast,
    Flame,
    Tide,
    Stone,
    Spark,
    Shade,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseStats {
    pub attack: u16,
    pub defense: u16,
    pub magic: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PetSpecies {
    pub name: String,
    pub icon: String,
    pub element: Element,
    pub base_stats: BaseStats,
    pub description: String,
}

impl PetSpecies {
    /// Load a pet species from its RON file by name.
    /// Files live under `<data_path>/species/<name>.ron`.
    pub fn load_by_name(name: &str, data_path: &Path) -> ArenaResult<PetSpecies> {
        let species_dir = data_path.join("species");
        if !species_dir.exists() {
            return Err(RosterError::SpeciesNotFound(name.to_string()).into());
        }

        let entries = fs::read_dir(&species_dir)
            .map_err(|e| RosterError::MalformedRecord(e.to_string()))?;

        for entry in entries {
            let entry = entry.map_err(|e| RosterError::MalformedRecord(e.to_string()))?;
            let path = entry.path();

            if path.extension().and_then(|s| s.to_str()) == Some("ron") {
                if let Some(filename) = path.file_stem().and_then(|s| s.to_str()) {
                    if filename.eq_ignore_ascii_case(name) {
                        let content = fs::read_to_string(&path)
                            .map_err(|e| RosterError::MalformedRecord(e.to_string()))?;
                        let species: PetSpecies = ron::from_str(&content)
                            .map_err(|e| RosterError::MalformedRecord(e.to_string()))?;
                        return Ok(species);
                    }
                }
            }
        }

        Err(RosterError::SpeciesNotFound(name.to_string()).into())
    }

    /// Load all pet species from RON files in the data directory.
    pub fn load_all(data_path: &Path) -> ArenaResult<Vec<PetSpecies>> {
        let species_dir = data_path.join("species");
        let mut all = Vec::new();

        if !species_dir.exists() {
            return Err(RosterError::SpeciesNotFound("<any>".to_string()).into());
        }

        let entries = fs::read_dir(&species_dir)
            .map_err(|e| RosterError::MalformedRecord(e.to_string()))?;

        for entry in entries {
            let entry = entry.map_err(|e| RosterError::MalformedRecord(e.to_string()))?;
            let path = entry.path();

            if path.extension().and_then(|s| s.to_str()) == Some("ron") {
                let content = fs::read_to_string(&path)
                    .map_err(|e| RosterError::MalformedRecord(e.to_string()))?;
                let species: PetSpecies = ron::from_str(&content)
                    .map_err(|e| RosterError::MalformedRecord(e.to_string()))?;
                all.push(species);
            }
        }

        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    /// Create a map keyed by uppercased species name for fast lookups.
    pub fn create_species_map(data_path: &Path) -> ArenaResult<HashMap<String, PetSpecies>> {
        let mut map = HashMap::new();
        for species in Self::load_all(data_path)? {
            map.insert(species.name.to_uppercase(), species);
        }
        Ok(map)
    }
}
