/// Fallback-capable image element
///
/// Shows an image reference at a fixed square size. If the reference is
/// missing, or fails to load, the local placeholder is shown instead. The
/// swap happens once; after it, failure handling is switched off.
use iced::widget::{container, text, tooltip, Image, Space, Svg};
use iced::{ContentFit, Element, Task};

use crate::error::ImageUnavailable;
use crate::thumb::loader::{self, LoadedImage};
use crate::thumb::{fallback_handle, ImageCache, ImageSource, InstanceId};

pub const DEFAULT_SIZE: f32 = 40.0;

#[derive(Debug, Clone)]
pub enum Message {
    Finished {
        instance: InstanceId,
        result: Result<LoadedImage, ImageUnavailable>,
    },
}

pub struct FallbackImage {
    instance: InstanceId,
    source: ImageSource,
    alt_text: String,
    size: f32,
    /// Cleared after the first swap to the fallback
    handles_failure: bool,
    image: Option<LoadedImage>,
    listener: Option<iced::task::Handle>,
}

impl FallbackImage {
    pub fn new(reference: Option<&str>, alt_text: impl Into<String>) -> Self {
        Self {
            instance: InstanceId::next(),
            source: ImageSource::from_reference(reference),
            alt_text: alt_text.into(),
            size: DEFAULT_SIZE,
            handles_failure: true,
            image: None,
            listener: None,
        }
    }

    pub fn size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    /// Start loading the primary reference, unless it is the fallback or
    /// already cached.
    pub fn load(&mut self, cache: &mut ImageCache, client: &reqwest::Client) -> Task<Message> {
        let ImageSource::Primary(reference) = &self.source else {
            return Task::none();
        };

        if let Some(image) = cache.get(reference) {
            self.image = Some(image.clone());
            return Task::none();
        }

        let instance = self.instance;
        let (task, handle) = Task::perform(
            loader::load(reference.clone(), client.clone()),
            move |result| Message::Finished { instance, result },
        )
        .abortable();
        self.listener = Some(handle.abort_on_drop());
        task
    }

    pub fn update(&mut self, message: Message, cache: &mut ImageCache) {
        match message {
            Message::Finished { instance, .. } if instance != self.instance => {}
            Message::Finished { result, .. } => {
                self.listener = None;
                match result {
                    Ok(image) => {
                        cache.insert(self.source.reference(), image.clone());
                        self.image = Some(image);
                    }
                    Err(err) => {
                        tracing::debug!(%err, "thumbnail failed, showing fallback");
                        self.handle_failure();
                    }
                }
            }
        }
    }

    /// React to a load failure. Returns `true` if the source was swapped.
    pub fn handle_failure(&mut self) -> bool {
        if !self.handles_failure {
            return false;
        }
        if self.source.commit_fallback() {
            self.handles_failure = false;
            self.image = None;
            return true;
        }
        false
    }

    pub fn view<'a, M: 'a>(&'a self) -> Element<'a, M> {
        let content: Element<'a, M> = match (&self.source, &self.image) {
            (ImageSource::Fallback, _) => Svg::new(fallback_handle())
                .width(self.size)
                .height(self.size)
                .into(),
            (ImageSource::Primary(_), Some(image)) => Image::new(image.handle.clone())
                .width(self.size)
                .height(self.size)
                .content_fit(ContentFit::Cover)
                .into(),
            // Still in flight: reserve the space
            (ImageSource::Primary(_), None) => Space::new(self.size, self.size).into(),
        };

        tooltip(
            content,
            container(text(self.alt_text.as_str()).size(12)).padding(4),
            tooltip::Position::Bottom,
        )
        .into()
    }
}
