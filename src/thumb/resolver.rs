/// Exercise image resolution
///
/// Answers two questions for an exercise variant and size: is an image
/// expected to exist, and where is it. Built-in images follow a fixed naming
/// scheme under a base URL; custom exercises carry their own URLs.
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use walkdir::WalkDir;

use crate::exercise::ExerciseKey;
use crate::state::data::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSize {
    #[default]
    Small,
    Large,
}

impl ImageSize {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageSize::Small => "small",
            ImageSize::Large => "large",
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Existence and URL queries for exercise images.
///
/// Implementations must be cheap and side-effect free; they are called
/// while building views.
pub trait ImageResolver {
    fn exists(&self, key: &ExerciseKey, size: ImageSize) -> bool;
    fn exists_custom(&self, key: &ExerciseKey, size: ImageSize, settings: &Settings) -> bool;
    fn url(&self, key: &ExerciseKey, size: ImageSize, settings: &Settings) -> Option<String>;
}

/// File stem of a built-in image, e.g. `benchpress_barbell_small`
pub fn image_stem(key: &ExerciseKey, size: ImageSize) -> String {
    match key.equipment {
        Some(equipment) => format!("{}_{}_{}", key.id, equipment.as_str(), size),
        None => format!("{}_{}", key.id, size),
    }
}

/// Set of built-in image stems known to exist
#[derive(Debug, Clone, Default)]
pub struct ImageIndex {
    stems: HashSet<String>,
}

impl ImageIndex {
    #[cfg(test)]
    fn from_stems<I, S>(stems: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            stems: stems.into_iter().map(Into::into).collect(),
        }
    }

    /// Index every image file below `dir` whose stem ends in a size suffix
    pub fn scan(dir: &Path) -> Self {
        let mut index = Self::default();

        for entry in WalkDir::new(dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().to_lowercase()) else {
                continue;
            };
            if stem.ends_with("_small") || stem.ends_with("_large") {
                index.stems.insert(stem);
            }
        }

        tracing::info!(dir = %dir.display(), images = index.len(), "indexed local image mirror");
        index
    }

    pub fn extend<I, S>(&mut self, stems: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stems.extend(stems.into_iter().map(Into::into));
    }

    pub fn contains(&self, key: &ExerciseKey, size: ImageSize) -> bool {
        self.stems.contains(&image_stem(key, size))
    }

    fn len(&self) -> usize {
        self.stems.len()
    }
}

/// Resolver for built-in images hosted under a base URL (or directory)
#[derive(Debug, Clone)]
pub struct CdnResolver {
    base: String,
    index: ImageIndex,
}

impl CdnResolver {
    pub fn new(base: impl Into<String>, index: ImageIndex) -> Self {
        let base = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
            index,
        }
    }

    pub fn builtin_url(&self, key: &ExerciseKey, size: ImageSize) -> String {
        format!("{}/{}/{}.png", self.base, size, image_stem(key, size))
    }
}

impl ImageResolver for CdnResolver {
    fn exists(&self, key: &ExerciseKey, size: ImageSize) -> bool {
        self.index.contains(key, size)
    }

    fn exists_custom(&self, key: &ExerciseKey, size: ImageSize, settings: &Settings) -> bool {
        settings
            .custom(&key.id)
            .is_some_and(|custom| custom.image_url(size).is_some())
    }

    fn url(&self, key: &ExerciseKey, size: ImageSize, settings: &Settings) -> Option<String> {
        if let Some(url) = settings.custom(&key.id).and_then(|c| c.image_url(size)) {
            return Some(url.to_string());
        }
        Some(self.builtin_url(key, size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercise::Equipment;
    use crate::state::data::CustomExercise;

    fn bench() -> ExerciseKey {
        ExerciseKey::new("benchpress", Some(Equipment::Barbell))
    }

    #[test]
    fn test_image_stem() {
        assert_eq!(image_stem(&bench(), ImageSize::Small), "benchpress_barbell_small");
        assert_eq!(
            image_stem(&ExerciseKey::new("plank", None), ImageSize::Large),
            "plank_large"
        );
    }

    #[test]
    fn test_builtin_url_and_existence() {
        let resolver = CdnResolver::new(
            "https://cdn.example.com/exercises/",
            ImageIndex::from_stems(["benchpress_barbell_small"]),
        );
        let settings = Settings::default();

        assert!(resolver.exists(&bench(), ImageSize::Small));
        assert!(!resolver.exists(&bench(), ImageSize::Large));
        assert_eq!(
            resolver.url(&bench(), ImageSize::Small, &settings).as_deref(),
            Some("https://cdn.example.com/exercises/small/benchpress_barbell_small.png")
        );
    }

    #[test]
    fn test_custom_image_wins() {
        let mut settings = Settings::default();
        let mut custom = CustomExercise::new("benchpress", "My Bench", None);
        custom.small_image_url = Some("/pics/bench.png".into());
        settings.insert(custom);

        let resolver = CdnResolver::new("https://cdn.example.com", ImageIndex::default());
        assert!(resolver.exists_custom(&bench(), ImageSize::Small, &settings));
        assert!(!resolver.exists_custom(&bench(), ImageSize::Large, &settings));
        assert_eq!(
            resolver.url(&bench(), ImageSize::Small, &settings).as_deref(),
            Some("/pics/bench.png")
        );
    }

    #[test]
    fn test_deleted_custom_has_no_image() {
        let mut settings = Settings::default();
        let mut custom = CustomExercise::new("benchpress", "My Bench", None);
        custom.small_image_url = Some("/pics/bench.png".into());
        custom.is_deleted = true;
        settings.insert(custom);

        let resolver = CdnResolver::new("https://cdn.example.com", ImageIndex::default());
        assert!(!resolver.exists_custom(&bench(), ImageSize::Small, &settings));
    }

    #[test]
    fn test_scan_mirror_directory() {
        let dir = tempfile::tempdir().unwrap();
        let small = dir.path().join("small");
        std::fs::create_dir_all(&small).unwrap();
        std::fs::write(small.join("benchpress_barbell_small.png"), b"png").unwrap();
        std::fs::write(small.join("README.txt"), b"notes").unwrap();
        std::fs::write(dir.path().join("Squat_Barbell_Large.png"), b"png").unwrap();

        let index = ImageIndex::scan(dir.path());
        assert_eq!(index.len(), 2);
        assert!(index.contains(&bench(), ImageSize::Small));
        assert!(index.contains(
            &ExerciseKey::new("squat", Some(Equipment::Barbell)),
            ImageSize::Large
        ));
    }
}
