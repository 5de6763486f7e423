/// Exercise model
///
/// Resolves an exercise key (id + optional equipment) into a record with a
/// default equipment and a display name. Built-in exercises come from a
/// static catalog; custom ones come from the user's settings.
pub mod catalog;

pub use catalog::ExerciseCatalog;

use std::fmt;
use std::str::FromStr;

use crate::state::data::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Equipment {
    Barbell,
    Dumbbell,
    Cable,
    Kettlebell,
    Bodyweight,
    Band,
    SmithMachine,
    EzBar,
    TrapBar,
    LeverageMachine,
}

impl Equipment {
    pub const ALL: [Equipment; 10] = [
        Equipment::Barbell,
        Equipment::Dumbbell,
        Equipment::Cable,
        Equipment::Kettlebell,
        Equipment::Bodyweight,
        Equipment::Band,
        Equipment::SmithMachine,
        Equipment::EzBar,
        Equipment::TrapBar,
        Equipment::LeverageMachine,
    ];

    /// Identifier used in image file names and the database
    pub fn as_str(self) -> &'static str {
        match self {
            Equipment::Barbell => "barbell",
            Equipment::Dumbbell => "dumbbell",
            Equipment::Cable => "cable",
            Equipment::Kettlebell => "kettlebell",
            Equipment::Bodyweight => "bodyweight",
            Equipment::Band => "band",
            Equipment::SmithMachine => "smith",
            Equipment::EzBar => "ezbar",
            Equipment::TrapBar => "trapbar",
            Equipment::LeverageMachine => "leveragemachine",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Equipment::Barbell => "Barbell",
            Equipment::Dumbbell => "Dumbbell",
            Equipment::Cable => "Cable",
            Equipment::Kettlebell => "Kettlebell",
            Equipment::Bodyweight => "Bodyweight",
            Equipment::Band => "Band",
            Equipment::SmithMachine => "Smith Machine",
            Equipment::EzBar => "EZ Bar",
            Equipment::TrapBar => "Trap Bar",
            Equipment::LeverageMachine => "Leverage Machine",
        }
    }
}

impl fmt::Display for Equipment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Equipment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Equipment::ALL
            .into_iter()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| format!("unknown equipment: {}", s))
    }
}

/// Identifies an exercise variant
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExerciseKey {
    pub id: String,
    pub equipment: Option<Equipment>,
}

impl ExerciseKey {
    pub fn new(id: impl Into<String>, equipment: Option<Equipment>) -> Self {
        Self {
            id: id.into(),
            equipment,
        }
    }

    /// Fill in the exercise's default equipment when none was given
    pub fn or_default_equipment(&self, exercise: &Exercise) -> ExerciseKey {
        ExerciseKey {
            id: self.id.clone(),
            equipment: self.equipment.or(exercise.default_equipment),
        }
    }
}

/// A resolved exercise record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub default_equipment: Option<Equipment>,
    /// Equipment for this particular variant (requested or default)
    pub equipment: Option<Equipment>,
    pub is_custom: bool,
}

impl Exercise {
    /// "Bench Press, Barbell" for built-ins; custom exercises keep their
    /// own name.
    pub fn name_with_equipment(&self) -> String {
        match self.equipment {
            Some(equipment) if !self.is_custom => format!("{}, {}", self.name, equipment),
            _ => self.name.clone(),
        }
    }
}

/// Source of exercise records
pub trait ExerciseModel {
    fn get(&self, key: &ExerciseKey, settings: &Settings) -> Exercise;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equipment_parses_its_own_ids() {
        for equipment in Equipment::ALL {
            assert_eq!(equipment.as_str().parse::<Equipment>(), Ok(equipment));
        }
        assert!("rope".parse::<Equipment>().is_err());
    }

    #[test]
    fn test_key_keeps_explicit_equipment() {
        let exercise = Exercise {
            id: "benchpress".into(),
            name: "Bench Press".into(),
            default_equipment: Some(Equipment::Barbell),
            equipment: Some(Equipment::Barbell),
            is_custom: false,
        };
        let key = ExerciseKey::new("benchpress", Some(Equipment::Dumbbell));
        assert_eq!(key.or_default_equipment(&exercise).equipment, Some(Equipment::Dumbbell));

        let key = ExerciseKey::new("benchpress", None);
        assert_eq!(key.or_default_equipment(&exercise).equipment, Some(Equipment::Barbell));
    }

    #[test]
    fn test_name_with_equipment() {
        let mut exercise = Exercise {
            id: "squat".into(),
            name: "Squat".into(),
            default_equipment: Some(Equipment::Barbell),
            equipment: Some(Equipment::SmithMachine),
            is_custom: false,
        };
        assert_eq!(exercise.name_with_equipment(), "Squat, Smith Machine");

        exercise.is_custom = true;
        assert_eq!(exercise.name_with_equipment(), "Squat");
    }
}
