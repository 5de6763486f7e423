/// Thumbnail plumbing shared by the image components
///
/// This module handles:
/// - Image sources and the embedded fallback asset (source.rs)
/// - The per-instance loading state machine (state.rs)
/// - Fetching and decoding images (loader.rs)
/// - Caching decoded images in memory (cache.rs)
/// - Resolving exercise images to URLs (resolver.rs)

pub mod cache;
pub mod loader;
pub mod resolver;
pub mod source;
pub mod state;

pub use cache::ImageCache;
pub use resolver::{CdnResolver, ImageIndex, ImageResolver, ImageSize};
pub use source::{fallback_handle, ImageSource};
pub use state::{DisplayState, InstanceId, LoadEvent, LoadPhase, Transition};
