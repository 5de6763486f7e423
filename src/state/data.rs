/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the database layer and the UI layer.
use std::collections::BTreeMap;

use crate::exercise::Equipment;
use crate::thumb::ImageSize;

/// A user-defined exercise
#[derive(Debug, Clone, PartialEq)]
pub struct CustomExercise {
    /// Unique id (slug of the name, made unique on insert)
    pub id: String,
    pub name: String,
    pub default_equipment: Option<Equipment>,
    /// Image shown in lists (None until the user picks one)
    pub small_image_url: Option<String>,
    /// Image shown on the exercise detail view
    pub large_image_url: Option<String>,
    /// Unix timestamp of creation
    pub created_at: i64,
    /// Soft-deleted exercises stay in the database but are never shown
    pub is_deleted: bool,
}

impl CustomExercise {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        default_equipment: Option<Equipment>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            default_equipment,
            small_image_url: None,
            large_image_url: None,
            created_at: 0,
            is_deleted: false,
        }
    }

    pub fn image_url(&self, size: ImageSize) -> Option<&str> {
        let url = match size {
            ImageSize::Small => self.small_image_url.as_deref(),
            ImageSize::Large => self.large_image_url.as_deref(),
        };
        url.filter(|u| !u.trim().is_empty())
    }
}

/// User settings the image components consult.
///
/// Only the custom exercise overrides matter here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub exercises: BTreeMap<String, CustomExercise>,
}

impl Settings {
    pub fn insert(&mut self, exercise: CustomExercise) {
        self.exercises.insert(exercise.id.clone(), exercise);
    }

    /// Look up a live (not deleted) custom exercise
    pub fn custom(&self, id: &str) -> Option<&CustomExercise> {
        self.exercises.get(id).filter(|e| !e.is_deleted)
    }

    /// Live custom exercises, oldest first
    pub fn live_customs(&self) -> Vec<&CustomExercise> {
        let mut customs: Vec<_> = self.exercises.values().filter(|e| !e.is_deleted).collect();
        customs.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        customs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_image_url_counts_as_missing() {
        let mut custom = CustomExercise::new("a", "A", None);
        custom.small_image_url = Some("   ".into());
        custom.large_image_url = Some("/pics/a.png".into());

        assert_eq!(custom.image_url(ImageSize::Small), None);
        assert_eq!(custom.image_url(ImageSize::Large), Some("/pics/a.png"));
    }

    #[test]
    fn test_live_customs_skip_deleted_and_sort_by_age() {
        let mut settings = Settings::default();
        let mut newer = CustomExercise::new("b", "B", None);
        newer.created_at = 20;
        let mut older = CustomExercise::new("c", "C", None);
        older.created_at = 10;
        let mut gone = CustomExercise::new("a", "A", None);
        gone.is_deleted = true;
        settings.insert(newer);
        settings.insert(older);
        settings.insert(gone);

        let ids: Vec<_> = settings.live_customs().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b"]);
        assert!(settings.custom("a").is_none());
    }
}
