/// UI components
///
/// - `fallback_image.rs` - plain image with a one-shot local fallback
/// - `exercise_image.rs` - exercise thumbnail with loading and placeholder UI
/// - `spinner.rs`, `icon.rs` - canvas drawings used by the above

pub mod exercise_image;
pub mod fallback_image;
pub mod icon;
pub mod spinner;

pub use exercise_image::{Collaborators, ExerciseImage, Props};
pub use fallback_image::FallbackImage;
