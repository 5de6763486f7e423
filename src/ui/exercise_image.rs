/// Exercise image with loading feedback
///
/// Decides up front whether an image is expected to exist for the exercise
/// variant and size. Known-absent images go straight to the fallback asset
/// without a request. Otherwise the resolved URL is loaded, and a failure
/// swaps to the fallback once.
///
/// Small images can carry a text or icon overlay when no image exists.
/// Large images show a spinner placeholder until the load settles. A failure
/// has no UI of its own; the fallback image is the feedback.
use iced::widget::{column, container, text, tooltip, Column, Image, Space, Stack, Svg};
use iced::{Border, ContentFit, Element, Length, Task, Theme};

use super::icon::default_exercise_icon;
use super::spinner::spinner;
use crate::error::ImageUnavailable;
use crate::exercise::{ExerciseKey, ExerciseModel};
use crate::state::data::Settings;
use crate::thumb::loader::{self, LoadedImage};
use crate::thumb::{
    fallback_handle, DisplayState, ImageCache, ImageResolver, ImageSize, ImageSource, InstanceId,
    LoadEvent, LoadPhase, Transition,
};

const SPINNER_SIZE: f32 = 20.0;

#[derive(Debug, Clone)]
pub enum Message {
    Finished {
        instance: InstanceId,
        result: Result<LoadedImage, ImageUnavailable>,
    },
}

/// Styling hooks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    /// Edge length of the small square thumbnail
    pub side: f32,
    /// Text size of the custom exercise name label
    pub label_size: f32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            side: 64.0,
            label_size: 11.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Props {
    /// Equipment may be left out; the exercise's default is used then
    pub key: ExerciseKey,
    pub size: ImageSize,
    pub use_text_for_custom_exercise: bool,
    pub use_border_for_custom_exercise: bool,
    /// Ignore custom images and show the default icon when none exists
    pub suppress_custom: bool,
    pub style: Style,
}

impl Props {
    pub fn new(key: ExerciseKey, size: ImageSize) -> Self {
        Self {
            key,
            size,
            use_text_for_custom_exercise: false,
            use_border_for_custom_exercise: false,
            suppress_custom: false,
            style: Style::default(),
        }
    }

    pub fn use_text_for_custom_exercise(mut self, value: bool) -> Self {
        self.use_text_for_custom_exercise = value;
        self
    }

    pub fn use_border_for_custom_exercise(mut self, value: bool) -> Self {
        self.use_border_for_custom_exercise = value;
        self
    }

    pub fn suppress_custom(mut self, value: bool) -> Self {
        self.suppress_custom = value;
        self
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }
}

/// The external lookups an exercise image needs
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub resolver: &'a dyn ImageResolver,
    pub exercises: &'a dyn ExerciseModel,
    pub settings: &'a Settings,
}

/// Extra layer drawn on a small image when no image exists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    None,
    Label,
    Icon,
}

/// A load the owner should start for this instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub instance: InstanceId,
    pub reference: String,
}

/// One mounted image element. Dropping it aborts its in-flight load.
struct Mount {
    instance: InstanceId,
    state: DisplayState,
    image: Option<LoadedImage>,
    requested: bool,
    listener: Option<iced::task::Handle>,
}

impl Mount {
    fn new(initial: ImageSource) -> Self {
        Self {
            instance: InstanceId::next(),
            state: DisplayState::new(initial),
            image: None,
            requested: false,
            listener: None,
        }
    }
}

struct Resolved {
    name: String,
    does_exist: bool,
    initial: ImageSource,
}

pub struct ExerciseImage {
    props: Props,
    name: String,
    does_exist: bool,
    initial: ImageSource,
    mount: Mount,
}

impl ExerciseImage {
    pub fn new(props: Props, collaborators: Collaborators<'_>) -> Self {
        let resolved = Self::resolve(&props, collaborators);
        Self {
            props,
            name: resolved.name,
            does_exist: resolved.does_exist,
            mount: Mount::new(resolved.initial.clone()),
            initial: resolved.initial,
        }
    }

    fn resolve(props: &Props, collaborators: Collaborators<'_>) -> Resolved {
        let Collaborators {
            resolver,
            exercises,
            settings,
        } = collaborators;

        let exercise = exercises.get(&props.key, settings);
        let key = props.key.or_default_equipment(&exercise);

        let does_exist = resolver.exists(&key, props.size)
            || (!props.suppress_custom && resolver.exists_custom(&key, props.size, settings));

        // Known-absent images never hit the network
        let initial = if does_exist {
            ImageSource::from_reference(resolver.url(&key, props.size, settings).as_deref())
        } else {
            ImageSource::Fallback
        };

        Resolved {
            name: exercise.name_with_equipment(),
            does_exist,
            initial,
        }
    }

    /// Synchronous setup for the current mount.
    ///
    /// An image that is already complete settles here, before anything is
    /// subscribed. Otherwise a load request is returned, once per mount.
    pub fn start(&mut self, cache: &mut ImageCache) -> Option<LoadRequest> {
        let mount = &mut self.mount;
        if mount.requested || mount.state.phase().is_terminal() {
            return None;
        }

        let source = mount.state.current().clone();
        if cache.is_complete(&source) {
            if let ImageSource::Primary(reference) = &source {
                mount.image = cache.get(reference).cloned();
            }
            mount.state.apply(LoadEvent::Loaded);
            tracing::debug!(reference = source.reference(), "image already complete");
            return None;
        }

        mount.requested = true;
        Some(LoadRequest {
            instance: mount.instance,
            reference: source.reference().to_string(),
        })
    }

    /// Run setup and spawn the load, if one is needed
    pub fn mount(&mut self, cache: &mut ImageCache, client: &reqwest::Client) -> Task<Message> {
        let Some(LoadRequest {
            instance,
            reference,
        }) = self.start(cache)
        else {
            return Task::none();
        };

        let (task, handle) = Task::perform(loader::load(reference, client.clone()), move |result| {
            Message::Finished { instance, result }
        })
        .abortable();
        self.mount.listener = Some(handle.abort_on_drop());
        task
    }

    /// Apply new props. A changed initial source tears the current mount
    /// down and starts a fresh one; returns `true` in that case, and the
    /// caller should call `mount` again.
    pub fn set_props(&mut self, props: Props, collaborators: Collaborators<'_>) -> bool {
        let resolved = Self::resolve(&props, collaborators);
        self.props = props;
        self.name = resolved.name;
        self.does_exist = resolved.does_exist;

        if resolved.initial == self.initial {
            return false;
        }

        tracing::debug!(
            from = self.initial.reference(),
            to = resolved.initial.reference(),
            "image source changed, remounting"
        );
        self.initial = resolved.initial.clone();
        self.mount = Mount::new(resolved.initial);
        true
    }

    pub fn update(&mut self, message: Message, cache: &mut ImageCache) {
        let Message::Finished { instance, result } = message;
        if instance != self.mount.instance {
            tracing::trace!("ignoring result for a torn down image");
            return;
        }

        let mount = &mut self.mount;
        mount.listener = None;

        match result {
            Ok(image) => {
                if mount.state.apply(LoadEvent::Loaded) == Transition::Settled {
                    cache.insert(mount.state.current().reference(), image.clone());
                    mount.image = Some(image);
                }
            }
            Err(err) => {
                if mount.state.apply(LoadEvent::Failed) == Transition::FellBack {
                    mount.image = None;
                    tracing::debug!(%err, "exercise image failed, showing fallback");
                }
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phase(&self) -> LoadPhase {
        self.mount.state.phase()
    }

    pub fn is_loading(&self) -> bool {
        self.mount.state.is_loading()
    }

    pub fn is_error(&self) -> bool {
        self.mount.state.is_error()
    }

    pub fn is_visible(&self) -> bool {
        self.mount.state.is_visible()
    }

    pub fn shows_spinner(&self) -> bool {
        self.props.size == ImageSize::Large && self.is_loading()
    }

    pub fn overlay(&self) -> Overlay {
        if self.props.size != ImageSize::Small || self.does_exist {
            return Overlay::None;
        }
        if self.props.use_text_for_custom_exercise {
            Overlay::Label
        } else if self.props.suppress_custom {
            Overlay::Icon
        } else {
            Overlay::None
        }
    }

    pub fn view<'a, M: 'a>(&'a self, spinner_rotation: f32) -> Element<'a, M> {
        let content = match self.props.size {
            ImageSize::Small => self.view_small(),
            ImageSize::Large => self.view_large(spinner_rotation),
        };

        tooltip(
            content,
            container(text(self.name.as_str()).size(12)).padding(4),
            tooltip::Position::Bottom,
        )
        .into()
    }

    fn image_element<'a, M: 'a>(&'a self, width: Length, height: Length) -> Element<'a, M> {
        // Hidden and collapsed until the load settles
        if !self.is_visible() {
            return Space::new(width, Length::Fixed(0.0)).into();
        }

        match (self.mount.state.current(), &self.mount.image) {
            (ImageSource::Primary(_), Some(image)) => Image::new(image.handle.clone())
                .width(width)
                .height(height)
                .content_fit(ContentFit::Cover)
                .into(),
            _ => Svg::new(fallback_handle()).width(width).height(height).into(),
        }
    }

    fn view_small<'a, M: 'a>(&'a self) -> Element<'a, M> {
        let side = Length::Fixed(self.props.style.side);
        let image = self.image_element(side, side);

        let overlay: Option<Element<'a, M>> = match self.overlay() {
            Overlay::None => None,
            Overlay::Label => Some(
                container(text(self.name.as_str()).size(self.props.style.label_size))
                    .padding(4)
                    .width(Length::Fill)
                    .height(Length::Fill)
                    .style(label_style)
                    .into(),
            ),
            Overlay::Icon => Some(default_exercise_icon()),
        };

        let Some(overlay) = overlay else {
            return self.bordered(image);
        };

        let stacked = Stack::new().push(image).push(overlay).width(side).height(side);
        self.bordered(stacked.into())
    }

    fn bordered<'a, M: 'a>(&'a self, content: Element<'a, M>) -> Element<'a, M> {
        if self.does_exist || !self.props.use_border_for_custom_exercise {
            return content;
        }
        container(content).padding(1).style(placeholder_style).into()
    }

    fn view_large<'a, M: 'a>(&'a self, spinner_rotation: f32) -> Element<'a, M> {
        let image = self.image_element(Length::Fill, Length::Shrink);

        let auxiliary: Option<Element<'a, M>> = if self.shows_spinner() {
            Some(
                container(spinner(spinner_rotation, SPINNER_SIZE))
                    .center_x(Length::Fill)
                    .padding([40, 16])
                    .style(placeholder_style)
                    .into(),
            )
        } else {
            None
        };

        let content: Column<'a, M> = column![image].push_maybe(auxiliary).width(Length::Fill);
        content.into()
    }
}

fn placeholder_style(theme: &Theme) -> container::Style {
    let palette = theme.extended_palette();
    container::Style {
        background: Some(palette.background.weak.color.into()),
        border: Border {
            color: palette.background.strong.color,
            width: 1.0,
            radius: 8.0.into(),
        },
        ..container::Style::default()
    }
}

fn label_style(theme: &Theme) -> container::Style {
    let palette = theme.extended_palette();
    container::Style {
        background: Some(palette.background.weak.color.into()),
        text_color: Some(palette.background.weak.text),
        ..container::Style::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UnavailableCause;
    use crate::exercise::{Equipment, ExerciseCatalog};
    use std::cell::RefCell;

    const URL: &str = "https://cdn/x/small.png";

    #[derive(Default)]
    struct StubResolver {
        exists: bool,
        exists_custom: bool,
        url: Option<String>,
        asked: RefCell<Vec<ExerciseKey>>,
    }

    impl StubResolver {
        fn present(url: &str) -> Self {
            Self {
                exists: true,
                url: Some(url.to_string()),
                ..Self::default()
            }
        }
    }

    impl ImageResolver for StubResolver {
        fn exists(&self, key: &ExerciseKey, _size: ImageSize) -> bool {
            self.asked.borrow_mut().push(key.clone());
            self.exists
        }

        fn exists_custom(&self, _: &ExerciseKey, _: ImageSize, _: &Settings) -> bool {
            self.exists_custom
        }

        fn url(&self, _: &ExerciseKey, _: ImageSize, _: &Settings) -> Option<String> {
            self.url.clone()
        }
    }

    fn bench(size: ImageSize) -> Props {
        Props::new(ExerciseKey::new("benchpress", None), size)
    }

    fn build(props: Props, resolver: &StubResolver) -> ExerciseImage {
        let catalog = ExerciseCatalog::new();
        let settings = Settings::default();
        ExerciseImage::new(
            props,
            Collaborators {
                resolver,
                exercises: &catalog,
                settings: &settings,
            },
        )
    }

    fn source(image: &ExerciseImage) -> &ImageSource {
        image.mount.state.current()
    }

    fn loaded(instance: InstanceId) -> Message {
        Message::Finished {
            instance,
            result: Ok(LoadedImage::from_rgba(2, 2, vec![0; 16])),
        }
    }

    fn failed(instance: InstanceId) -> Message {
        Message::Finished {
            instance,
            result: Err(ImageUnavailable::new(URL, UnavailableCause::Fetch("404".into()))),
        }
    }

    #[test]
    fn test_successful_load() {
        let resolver = StubResolver::present(URL);
        let mut cache = ImageCache::new(8);
        let mut image = build(bench(ImageSize::Small), &resolver);

        assert!(image.is_loading());
        assert!(!image.is_visible());
        let request = image.start(&mut cache).unwrap();
        assert_eq!(request.reference, URL);
        assert_eq!(request.instance, image.mount.instance);

        image.update(loaded(request.instance), &mut cache);
        assert_eq!(source(&image), &ImageSource::Primary(URL.into()));
        assert_eq!(image.phase(), LoadPhase::Loaded);
        assert!(!image.is_error());
        assert!(image.is_visible());
        assert!(cache.get(URL).is_some());
    }

    #[test]
    fn test_failed_load_falls_back_without_extras() {
        for size in [ImageSize::Small, ImageSize::Large] {
            let resolver = StubResolver::present(URL);
            let mut cache = ImageCache::new(8);
            let mut image = build(bench(size).use_text_for_custom_exercise(true), &resolver);

            let request = image.start(&mut cache).unwrap();
            assert_eq!(image.shows_spinner(), size == ImageSize::Large);

            image.update(failed(request.instance), &mut cache);
            assert!(source(&image).is_fallback());
            assert!(!image.is_loading());
            assert!(image.is_error());
            assert!(image.is_visible());
            assert!(!image.shows_spinner());
            assert_eq!(image.overlay(), Overlay::None);
            assert!(cache.is_empty());
        }
    }

    #[test]
    fn test_second_failure_changes_nothing() {
        let resolver = StubResolver::present(URL);
        let mut cache = ImageCache::new(8);
        let mut image = build(bench(ImageSize::Large), &resolver);
        let request = image.start(&mut cache).unwrap();

        image.update(failed(request.instance), &mut cache);
        image.update(failed(request.instance), &mut cache);
        image.update(loaded(request.instance), &mut cache);

        assert!(source(&image).is_fallback());
        assert_eq!(image.phase(), LoadPhase::Failed);
        assert!(image.start(&mut cache).is_none());
    }

    #[test]
    fn test_absent_image_with_text_label() {
        let resolver = StubResolver::default();
        let mut cache = ImageCache::new(8);
        let mut image = build(
            bench(ImageSize::Small).use_text_for_custom_exercise(true),
            &resolver,
        );

        assert!(!image.does_exist);
        assert!(source(&image).is_fallback());
        assert!(image.start(&mut cache).is_none());
        assert!(!image.is_loading());
        assert!(!image.is_error());
        assert_eq!(image.overlay(), Overlay::Label);
        assert_eq!(image.name(), "Bench Press, Barbell");
    }

    #[test]
    fn test_absent_image_with_suppressed_custom_shows_icon() {
        let resolver = StubResolver {
            exists_custom: true,
            url: Some(URL.to_string()),
            ..StubResolver::default()
        };
        let mut cache = ImageCache::new(8);
        let mut image = build(bench(ImageSize::Small).suppress_custom(true), &resolver);

        assert!(!image.does_exist);
        assert!(source(&image).is_fallback());
        assert!(image.start(&mut cache).is_none());
        assert_eq!(image.overlay(), Overlay::Icon);
    }

    #[test]
    fn test_custom_image_counts_as_existing() {
        let resolver = StubResolver {
            exists_custom: true,
            url: Some(URL.to_string()),
            ..StubResolver::default()
        };
        let image = build(bench(ImageSize::Small), &resolver);
        assert!(image.does_exist);
        assert_eq!(source(&image), &ImageSource::Primary(URL.into()));
    }

    #[test]
    fn test_absent_image_without_flags_has_no_overlay() {
        let resolver = StubResolver::default();
        let image = build(bench(ImageSize::Small), &resolver);
        assert_eq!(image.overlay(), Overlay::None);
    }

    #[test]
    fn test_cached_image_settles_synchronously() {
        let resolver = StubResolver::present(URL);
        let mut cache = ImageCache::new(8);
        cache.insert(URL, LoadedImage::from_rgba(1, 1, vec![0; 4]));
        let mut image = build(bench(ImageSize::Large), &resolver);

        assert!(image.is_loading());
        assert!(image.start(&mut cache).is_none());
        assert!(!image.is_loading());
        assert!(!image.shows_spinner());
        assert_eq!(source(&image), &ImageSource::Primary(URL.into()));
    }

    #[test]
    fn test_start_requests_only_once() {
        let resolver = StubResolver::present(URL);
        let mut cache = ImageCache::new(8);
        let mut image = build(bench(ImageSize::Small), &resolver);

        assert!(image.start(&mut cache).is_some());
        assert!(image.start(&mut cache).is_none());
        assert!(image.is_loading());
    }

    #[test]
    fn test_default_equipment_reaches_resolver() {
        let resolver = StubResolver::present(URL);
        let _image = build(bench(ImageSize::Small), &resolver);

        let asked = resolver.asked.borrow();
        assert_eq!(asked[0].equipment, Some(Equipment::Barbell));
    }

    #[test]
    fn test_changed_source_remounts() {
        let resolver = StubResolver::present(URL);
        let other = StubResolver::present("https://cdn/y/small.png");
        let catalog = ExerciseCatalog::new();
        let settings = Settings::default();
        let mut cache = ImageCache::new(8);

        let mut image = build(bench(ImageSize::Small), &resolver);
        let old = image.start(&mut cache).unwrap().instance;

        let remounted = image.set_props(
            bench(ImageSize::Small),
            Collaborators {
                resolver: &other,
                exercises: &catalog,
                settings: &settings,
            },
        );
        assert!(remounted);
        assert_ne!(image.mount.instance, old);
        assert!(image.is_loading());

        // A late result for the old mount must not touch the new one
        image.update(failed(old), &mut cache);
        assert!(image.is_loading());
        assert!(!image.is_error());
        assert_eq!(
            source(&image),
            &ImageSource::Primary("https://cdn/y/small.png".into())
        );
    }

    #[test]
    fn test_same_source_keeps_mount() {
        let resolver = StubResolver::present(URL);
        let catalog = ExerciseCatalog::new();
        let settings = Settings::default();
        let mut cache = ImageCache::new(8);

        let mut image = build(bench(ImageSize::Small), &resolver);
        let request = image.start(&mut cache).unwrap();
        image.update(loaded(request.instance), &mut cache);

        let remounted = image.set_props(
            bench(ImageSize::Small).use_border_for_custom_exercise(true),
            Collaborators {
                resolver: &resolver,
                exercises: &catalog,
                settings: &settings,
            },
        );
        assert!(!remounted);
        assert_eq!(image.mount.instance, request.instance);
        assert_eq!(image.phase(), LoadPhase::Loaded);
        assert!(image.props.use_border_for_custom_exercise);
    }
}
