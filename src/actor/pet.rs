//! Pet companions and the bonuses they lend in battle

use serde::{Deserialize, Serialize};

/// Experience a pet needs per level
pub const PET_EXPERIENCE_PER_LEVEL: u32 = 100;
pub const MAX_LOYALTY: u32 = 100;
pub const STARTING_LOYALTY: u32 = 50;
/// Loyalty gained on each pet level-up
pub const LOYALTY_PER_LEVEL: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PetSpecies {
    WolfPup,
    Drake,
    Hawk,
    BearCub,
    Cat,
}

/// Combat bonuses a pet lends its owner
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PetBonus {
    /// Only applies while loyalty is above the configured threshold
    pub attack: u32,
    pub defense: u32,
    pub crit_chance: f64,
    /// Added to the owner's chance to dodge enemy attacks
    pub dodge_chance: f64,
}

impl PetSpecies {
    pub const ALL: [PetSpecies; 5] = [
        PetSpecies::WolfPup,
        PetSpecies::Drake,
        PetSpecies::Hawk,
        PetSpecies::BearCub,
        PetSpecies::Cat,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PetSpecies::WolfPup => "wolf_pup",
            PetSpecies::Drake => "drake",
            PetSpecies::Hawk => "hawk",
            PetSpecies::BearCub => "bear_cub",
            PetSpecies::Cat => "cat",
        }
    }

    /// Look a species up by its snake_case label
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.label() == label)
    }

    pub fn bonus(self) -> PetBonus {
        match self {
            PetSpecies::WolfPup => PetBonus {
                attack: 5,
                ..PetBonus::default()
            },
            PetSpecies::Drake => PetBonus {
                attack: 10,
                ..PetBonus::default()
            },
            PetSpecies::Hawk => PetBonus {
                dodge_chance: 0.05,
                ..PetBonus::default()
            },
            PetSpecies::BearCub => PetBonus {
                defense: 3,
                ..PetBonus::default()
            },
            PetSpecies::Cat => PetBonus {
                crit_chance: 0.03,
                ..PetBonus::default()
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pet {
    pub name: String,
    pub species: PetSpecies,
    pub level: u32,
    pub experience: u32,
    pub loyalty: u32,
}

impl Pet {
    pub fn new(name: impl Into<String>, species: PetSpecies) -> Self {
        Self {
            name: name.into(),
            species,
            level: 1,
            experience: 0,
            loyalty: STARTING_LOYALTY,
        }
    }

    pub fn bonus(&self) -> PetBonus {
        self.species.bonus()
    }

    /// Add experience, returning whether at least one level was gained
    pub fn gain_experience(&mut self, amount: u32) -> bool {
        self.experience += amount;
        let mut leveled = false;
        while self.experience >= PET_EXPERIENCE_PER_LEVEL {
            self.experience -= PET_EXPERIENCE_PER_LEVEL;
            self.level += 1;
            self.loyalty = (self.loyalty + LOYALTY_PER_LEVEL).min(MAX_LOYALTY);
            leveled = true;
        }
        if leveled {
            tracing::info!(pet = %self.name, level = self.level, "pet leveled up");
        }
        leveled
    }
}
