use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

use super::data::{CustomExercise, Settings};
use crate::error::AppError;
use crate::exercise::Equipment;
use crate::thumb::ImageSize;

/// The Library manages the SQLite database of custom exercises.
/// It stores each exercise's name, default equipment and image URLs.
pub struct Library {
    conn: Connection,
    db_path: PathBuf,
}

impl Library {
    /// Open the library at its default location.
    ///
    /// The database file is created in the user's data directory:
    /// - Linux: ~/.local/share/exercise-thumbs/exercises.db
    /// - macOS: ~/Library/Application Support/exercise-thumbs/exercises.db
    /// - Windows: %APPDATA%\exercise-thumbs\exercises.db
    pub fn new() -> Result<Self, AppError> {
        Self::open(&Self::default_db_path()?)
    }

    /// Open or create the library at `db_path`
    pub fn open(db_path: &Path) -> Result<Self, AppError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;
        tracing::info!(path = %db_path.display(), "opened exercise library");

        let library = Library {
            conn,
            db_path: db_path.to_path_buf(),
        };
        library.init_schema()?;

        Ok(library)
    }

    /// Get the path where the database should be stored
    pub fn default_db_path() -> Result<PathBuf, AppError> {
        let mut path = dirs::data_dir()
            .or_else(dirs::home_dir)
            .ok_or(AppError::NoDataDir)?;

        path.push("exercise-thumbs");
        path.push("exercises.db");
        Ok(path)
    }

    /// Creates all necessary tables and indexes if they don't exist.
    fn init_schema(&self) -> Result<(), AppError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS custom_exercises (
                id                  TEXT PRIMARY KEY,
                name                TEXT NOT NULL,
                default_equipment   TEXT,
                small_image_url     TEXT,
                large_image_url     TEXT,
                created_at          INTEGER NOT NULL,
                is_deleted          INTEGER NOT NULL DEFAULT 0
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_custom_exercises_created_at
             ON custom_exercises(created_at)",
            [],
        )?;

        Ok(())
    }

    /// Get the path to the database file
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Add a custom exercise and return it.
    ///
    /// The id is a slug of the name; a numeric suffix keeps it unique.
    pub fn add_custom_exercise(
        &self,
        name: &str,
        default_equipment: Option<Equipment>,
    ) -> Result<CustomExercise, AppError> {
        let name = name.trim();
        let base = slugify(name);
        if base.is_empty() {
            return Err(AppError::InvalidName(name.to_string()));
        }

        let mut id = base.clone();
        let mut suffix = 2;
        while self.id_taken(&id)? {
            id = format!("{}-{}", base, suffix);
            suffix += 1;
        }

        let created_at = Utc::now().timestamp();
        self.conn.execute(
            "INSERT INTO custom_exercises (id, name, default_equipment, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![&id, name, default_equipment.map(Equipment::as_str), created_at],
        )?;

        tracing::info!(%id, name, "added custom exercise");

        let mut exercise = CustomExercise::new(id, name, default_equipment);
        exercise.created_at = created_at;
        Ok(exercise)
    }

    fn id_taken(&self, id: &str) -> Result<bool, AppError> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM custom_exercises WHERE id = ?1",
                [id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Set (or clear) the image URL for one size of a custom exercise
    pub fn set_image_url(
        &self,
        id: &str,
        size: ImageSize,
        url: Option<&str>,
    ) -> Result<(), AppError> {
        let sql = match size {
            ImageSize::Small => "UPDATE custom_exercises SET small_image_url = ?1 WHERE id = ?2",
            ImageSize::Large => "UPDATE custom_exercises SET large_image_url = ?1 WHERE id = ?2",
        };

        let updated = self.conn.execute(sql, params![url, id])?;
        if updated == 0 {
            return Err(AppError::UnknownExercise(id.to_string()));
        }

        tracing::info!(%id, %size, url, "updated custom exercise image");
        Ok(())
    }

    /// Soft-delete a custom exercise
    pub fn delete_custom_exercise(&self, id: &str) -> Result<(), AppError> {
        let updated = self.conn.execute(
            "UPDATE custom_exercises SET is_deleted = 1 WHERE id = ?1",
            [id],
        )?;
        if updated == 0 {
            return Err(AppError::UnknownExercise(id.to_string()));
        }
        Ok(())
    }

    /// Get all custom exercises, including deleted ones, oldest first
    pub fn custom_exercises(&self) -> Result<Vec<CustomExercise>, AppError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, default_equipment, small_image_url, large_image_url,
                    created_at, is_deleted
             FROM custom_exercises
             ORDER BY created_at ASC, id ASC",
        )?;

        let rows = stmt.query_map([], |row| {
            let equipment: Option<String> = row.get(2)?;
            Ok(CustomExercise {
                id: row.get(0)?,
                name: row.get(1)?,
                default_equipment: equipment.and_then(|e| e.parse().ok()),
                small_image_url: row.get(3)?,
                large_image_url: row.get(4)?,
                created_at: row.get(5)?,
                is_deleted: row.get(6)?,
            })
        })?;

        let mut exercises = Vec::new();
        for exercise in rows {
            exercises.push(exercise?);
        }

        Ok(exercises)
    }

    /// Build the settings snapshot the image components read
    pub fn settings(&self) -> Result<Settings, AppError> {
        let mut settings = Settings::default();
        for exercise in self.custom_exercises()? {
            settings.insert(exercise);
        }
        Ok(settings)
    }
}

/// Lowercase, ASCII alphanumerics and single dashes
fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

// Implement Debug for better error messages
impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("db_path", &self.db_path)
            .finish()
    }
}
