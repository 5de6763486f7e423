use super::{Equipment, Exercise, ExerciseKey, ExerciseModel};
use crate::state::data::Settings;

/// A built-in exercise
#[derive(Debug, Clone, Copy)]
pub struct BuiltinExercise {
    pub id: &'static str,
    pub name: &'static str,
    pub default_equipment: Option<Equipment>,
}

const fn builtin(
    id: &'static str,
    name: &'static str,
    default_equipment: Option<Equipment>,
) -> BuiltinExercise {
    BuiltinExercise {
        id,
        name,
        default_equipment,
    }
}

pub const BUILTIN_EXERCISES: &[BuiltinExercise] = &[
    builtin("benchpress", "Bench Press", Some(Equipment::Barbell)),
    builtin("inclinebenchpress", "Incline Bench Press", Some(Equipment::Barbell)),
    builtin("squat", "Squat", Some(Equipment::Barbell)),
    builtin("frontsquat", "Front Squat", Some(Equipment::Barbell)),
    builtin("deadlift", "Deadlift", Some(Equipment::Barbell)),
    builtin("romaniandeadlift", "Romanian Deadlift", Some(Equipment::Barbell)),
    builtin("overheadpress", "Overhead Press", Some(Equipment::Barbell)),
    builtin("bentoverrow", "Bent Over Row", Some(Equipment::Barbell)),
    builtin("bicepcurl", "Bicep Curl", Some(Equipment::Dumbbell)),
    builtin("lateralraise", "Lateral Raise", Some(Equipment::Dumbbell)),
    builtin("tricepspushdown", "Triceps Pushdown", Some(Equipment::Cable)),
    builtin("latpulldown", "Lat Pulldown", Some(Equipment::Cable)),
    builtin("legpress", "Leg Press", Some(Equipment::LeverageMachine)),
    builtin("kettlebellswing", "Kettlebell Swing", Some(Equipment::Kettlebell)),
    builtin("pullup", "Pull Up", Some(Equipment::Bodyweight)),
    builtin("plank", "Plank", None),
];

/// Built-in catalog with custom exercises from settings layered on top
#[derive(Debug, Clone, Default)]
pub struct ExerciseCatalog;

impl ExerciseCatalog {
    pub fn new() -> Self {
        Self
    }

    pub fn builtins(&self) -> &'static [BuiltinExercise] {
        BUILTIN_EXERCISES
    }

    fn find_builtin(id: &str) -> Option<&'static BuiltinExercise> {
        BUILTIN_EXERCISES.iter().find(|e| e.id == id)
    }
}

impl ExerciseModel for ExerciseCatalog {
    fn get(&self, key: &ExerciseKey, settings: &Settings) -> Exercise {
        if let Some(custom) = settings.custom(&key.id) {
            return Exercise {
                id: custom.id.clone(),
                name: custom.name.clone(),
                default_equipment: custom.default_equipment,
                equipment: key.equipment.or(custom.default_equipment),
                is_custom: true,
            };
        }

        if let Some(builtin) = Self::find_builtin(&key.id) {
            return Exercise {
                id: builtin.id.to_string(),
                name: builtin.name.to_string(),
                default_equipment: builtin.default_equipment,
                equipment: key.equipment.or(builtin.default_equipment),
                is_custom: false,
            };
        }

        // Unknown ids still render; name them after the id
        Exercise {
            id: key.id.clone(),
            name: title_case(&key.id),
            default_equipment: None,
            equipment: key.equipment,
            is_custom: false,
        }
    }
}

fn title_case(id: &str) -> String {
    id.split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::CustomExercise;

    #[test]
    fn test_builtin_uses_default_equipment() {
        let catalog = ExerciseCatalog::new();
        let exercise = catalog.get(&ExerciseKey::new("benchpress", None), &Settings::default());

        assert_eq!(exercise.name, "Bench Press");
        assert_eq!(exercise.equipment, Some(Equipment::Barbell));
        assert_eq!(exercise.name_with_equipment(), "Bench Press, Barbell");
    }

    #[test]
    fn test_custom_exercise_overrides_builtin_lookup() {
        let mut settings = Settings::default();
        settings.insert(CustomExercise::new("my-press", "My Press", Some(Equipment::Dumbbell)));

        let catalog = ExerciseCatalog::new();
        let exercise = catalog.get(&ExerciseKey::new("my-press", None), &settings);

        assert!(exercise.is_custom);
        assert_eq!(exercise.equipment, Some(Equipment::Dumbbell));
        assert_eq!(exercise.name_with_equipment(), "My Press");
    }

    #[test]
    fn test_deleted_custom_exercise_is_not_found() {
        let mut settings = Settings::default();
        let mut custom = CustomExercise::new("old_lift", "Old Lift", None);
        custom.is_deleted = true;
        settings.insert(custom);

        let exercise = ExerciseCatalog::new().get(&ExerciseKey::new("old_lift", None), &settings);
        assert!(!exercise.is_custom);
        assert_eq!(exercise.name, "Old Lift");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("zercher_squat"), "Zercher Squat");
        assert_eq!(title_case("jm-press"), "Jm Press");
    }
}
