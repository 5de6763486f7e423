use iced::widget::svg;
use std::sync::OnceLock;

/// Well-known location of the local placeholder thumbnail
pub const FALLBACK_ASSET_PATH: &str = "/images/exercise-thumbnail.svg";

/// The placeholder is compiled into the binary, so it always resolves
static FALLBACK_SVG: &[u8] = include_bytes!("../../assets/images/exercise-thumbnail.svg");

/// Handle for the embedded fallback asset.
pub fn fallback_handle() -> svg::Handle {
    static HANDLE: OnceLock<svg::Handle> = OnceLock::new();
    HANDLE
        .get_or_init(|| svg::Handle::from_memory(FALLBACK_SVG))
        .clone()
}

/// What an image element is currently pointed at
///
/// The fallback is its own variant rather than a string, so "are we already
/// showing the fallback?" is an equality check and not a path match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImageSource {
    /// A remotely hosted or derived image (URL or local path)
    Primary(String),
    /// The local placeholder asset
    Fallback,
}

impl ImageSource {
    /// Pick the source for an optional reference.
    ///
    /// Absent or blank references go straight to the fallback, as does a
    /// reference that spells out the fallback's own path.
    pub fn from_reference(reference: Option<&str>) -> Self {
        match reference.map(str::trim) {
            None | Some("") => ImageSource::Fallback,
            Some(r) if r == FALLBACK_ASSET_PATH || r == &FALLBACK_ASSET_PATH[1..] => {
                ImageSource::Fallback
            }
            Some(r) => ImageSource::Primary(r.to_string()),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ImageSource::Fallback)
    }

    /// The address this source points at
    pub fn reference(&self) -> &str {
        match self {
            ImageSource::Primary(reference) => reference,
            ImageSource::Fallback => FALLBACK_ASSET_PATH,
        }
    }

    /// Swap to the fallback after a load failure.
    ///
    /// Returns `true` only when the source actually changed. Once on the
    /// fallback this is a no-op, so a failing fallback cannot loop.
    pub fn commit_fallback(&mut self) -> bool {
        if self.is_fallback() {
            return false;
        }
        *self = ImageSource::Fallback;
        true
    }
}
