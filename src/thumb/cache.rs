use std::num::NonZeroUsize;

use lru::LruCache;

use super::loader::LoadedImage;
use super::source::ImageSource;

/// In-memory cache of decoded thumbnails, keyed by reference.
///
/// Bounded by entry count. Reads through `get` refresh an entry, so the
/// least recently used thumbnail is evicted first.
#[derive(Debug)]
pub struct ImageCache {
    lru: LruCache<String, LoadedImage>,
}

impl ImageCache {
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            lru: LruCache::new(cap),
        }
    }

    pub fn get(&mut self, reference: &str) -> Option<&LoadedImage> {
        self.lru.get(reference)
    }

    /// Whether an element pointed at `source` would already be fully loaded.
    ///
    /// The fallback is embedded and always complete. A primary reference is
    /// complete when it is cached with a non-zero width. Does not refresh
    /// the entry.
    pub fn is_complete(&self, source: &ImageSource) -> bool {
        match source {
            ImageSource::Fallback => true,
            ImageSource::Primary(reference) => self
                .lru
                .peek(reference.as_str())
                .is_some_and(|image| image.width > 0),
        }
    }

    pub fn insert(&mut self, reference: impl Into<String>, image: LoadedImage) {
        let reference = reference.into();
        tracing::trace!(%reference, width = image.width, height = image.height, "cached thumbnail");
        if let Some((evicted, _)) = self.lru.push(reference.clone(), image) {
            if evicted != reference {
                tracing::trace!(reference = %evicted, "evicted cached thumbnail");
            }
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.lru.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.lru.is_empty()
    }
}
