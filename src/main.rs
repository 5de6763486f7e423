use iced::widget::{button, column, container, row, scrollable, text, text_input, Column, Space};
use iced::{Alignment, Element, Length, Subscription, Task, Theme};
use iced_aw::Wrap;
use rfd::FileDialog;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod exercise;
mod state;
mod thumb;
mod ui;

use config::AppConfig;
use error::AppError;
use exercise::{Equipment, ExerciseCatalog, ExerciseKey};
use state::data::Settings;
use state::library::Library;
use thumb::{CdnResolver, ImageCache, ImageIndex, ImageSize};
use ui::exercise_image::Style;
use ui::{exercise_image, fallback_image, Collaborators, ExerciseImage, FallbackImage, Props};

/// Everything that has to succeed before the window opens
struct Boot {
    config: AppConfig,
    library: Library,
    settings: Settings,
    resolver: CdnResolver,
    client: reqwest::Client,
}

impl Boot {
    fn prepare(config: AppConfig) -> Result<Self, AppError> {
        let library = match &config.database_path {
            Some(path) => Library::open(path)?,
            None => Library::new()?,
        };
        let settings = library.settings()?;
        tracing::info!(db = %library.path().display(), "opened custom exercise library");

        let mut index = config
            .image_mirror_dir
            .as_deref()
            .map(ImageIndex::scan)
            .unwrap_or_default();
        index.extend(config.known_images.iter().cloned());
        let resolver = CdnResolver::new(config.image_base_url.clone(), index);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Boot {
            config,
            library,
            settings,
            resolver,
            client,
        })
    }
}

/// A gallery tile: which exercise it shows and its image
struct Tile {
    key: ExerciseKey,
    is_custom: bool,
    image: ExerciseImage,
}

/// A row in the custom exercise list
struct CustomRow {
    id: String,
    name: String,
    thumbnail: FallbackImage,
}

/// Main application state
struct Gallery {
    library: Library,
    settings: Settings,
    resolver: CdnResolver,
    catalog: ExerciseCatalog,
    cache: ImageCache,
    client: reqwest::Client,
    grid_size: ImageSize,
    tiles: Vec<Tile>,
    selected: usize,
    featured_equipment: Option<Equipment>,
    featured: ExerciseImage,
    customs: Vec<CustomRow>,
    new_exercise_name: String,
    spinner_rotation: f32,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    Tile(usize, exercise_image::Message),
    Featured(exercise_image::Message),
    Custom(usize, fallback_image::Message),
    Select(usize),
    CycleEquipment,
    ToggleGridSize,
    NewExerciseNameChanged(String),
    AddCustomExercise,
    PickCustomImage(String),
    DeleteCustomExercise(String),
    Tick,
}

impl Gallery {
    fn new(boot: Boot) -> (Self, Task<Message>) {
        let Boot {
            config,
            library,
            settings,
            resolver,
            client,
        } = boot;

        let catalog = ExerciseCatalog::new();
        let first = ExerciseKey::new(catalog.builtins()[0].id, None);
        let featured = ExerciseImage::new(
            Props::new(first, ImageSize::Large),
            Collaborators {
                resolver: &resolver,
                exercises: &catalog,
                settings: &settings,
            },
        );

        let mut gallery = Gallery {
            library,
            settings,
            resolver,
            catalog,
            cache: ImageCache::new(config.cache_capacity),
            client,
            grid_size: config.default_size,
            tiles: Vec::new(),
            selected: 0,
            featured_equipment: None,
            featured,
            customs: Vec::new(),
            new_exercise_name: String::new(),
            spinner_rotation: 0.0,
            status: String::new(),
        };

        let tasks = Task::batch([
            gallery.rebuild_tiles(),
            gallery.rebuild_customs(),
            gallery
                .featured
                .mount(&mut gallery.cache, &gallery.client)
                .map(Message::Featured),
        ]);

        gallery.status = format!(
            "{} exercises, {} custom.",
            gallery.tiles.len(),
            gallery.customs.len()
        );
        tracing::info!(tiles = gallery.tiles.len(), "gallery ready");

        (gallery, tasks)
    }

    fn tile_keys(&self) -> Vec<(ExerciseKey, bool)> {
        let builtins = self
            .catalog
            .builtins()
            .iter()
            .map(|e| (ExerciseKey::new(e.id, None), false));
        let customs = self
            .settings
            .live_customs()
            .into_iter()
            .map(|e| (ExerciseKey::new(e.id.clone(), None), true));
        builtins.chain(customs).collect()
    }

    fn tile_props(&self, key: ExerciseKey, is_custom: bool) -> Props {
        // Built-ins never pick up custom images; without one they get the icon
        Props::new(key, self.grid_size)
            .use_text_for_custom_exercise(is_custom)
            .use_border_for_custom_exercise(is_custom)
            .suppress_custom(!is_custom)
            .style(Style {
                side: 72.0,
                ..Style::default()
            })
    }

    /// Throw away every tile and mount fresh ones
    fn rebuild_tiles(&mut self) -> Task<Message> {
        let props: Vec<_> = self
            .tile_keys()
            .into_iter()
            .map(|(key, is_custom)| (key.clone(), is_custom, self.tile_props(key, is_custom)))
            .collect();

        let collaborators = Collaborators {
            resolver: &self.resolver,
            exercises: &self.catalog,
            settings: &self.settings,
        };
        self.tiles = props
            .into_iter()
            .map(|(key, is_custom, props)| Tile {
                key,
                is_custom,
                image: ExerciseImage::new(props, collaborators),
            })
            .collect();

        let mut tasks = Vec::with_capacity(self.tiles.len());
        for (index, tile) in self.tiles.iter_mut().enumerate() {
            tasks.push(
                tile.image
                    .mount(&mut self.cache, &self.client)
                    .map(move |message| Message::Tile(index, message)),
            );
        }
        Task::batch(tasks)
    }

    fn rebuild_customs(&mut self) -> Task<Message> {
        self.customs = self
            .settings
            .live_customs()
            .into_iter()
            .map(|custom| {
                let thumbnail =
                    FallbackImage::new(custom.small_image_url.as_deref(), custom.name.clone());
                CustomRow {
                    id: custom.id.clone(),
                    name: custom.name.clone(),
                    thumbnail: thumbnail.size(36.0),
                }
            })
            .collect();

        let mut tasks = Vec::with_capacity(self.customs.len());
        for (index, row) in self.customs.iter_mut().enumerate() {
            tasks.push(
                row.thumbnail
                    .load(&mut self.cache, &self.client)
                    .map(move |message| Message::Custom(index, message)),
            );
        }
        Task::batch(tasks)
    }

    /// Point the featured image at the selected exercise
    fn refresh_featured(&mut self) -> Task<Message> {
        let Some(tile) = self.tiles.get(self.selected) else {
            return Task::none();
        };
        let key = ExerciseKey::new(tile.key.id.clone(), self.featured_equipment);

        let remounted = self.featured.set_props(
            Props::new(key, ImageSize::Large),
            Collaborators {
                resolver: &self.resolver,
                exercises: &self.catalog,
                settings: &self.settings,
            },
        );
        if !remounted {
            return Task::none();
        }
        self.featured
            .mount(&mut self.cache, &self.client)
            .map(Message::Featured)
    }

    /// Reload settings after the library changed and redraw everything
    fn reload_settings(&mut self) -> Task<Message> {
        match self.library.settings() {
            Ok(settings) => self.settings = settings,
            Err(e) => {
                tracing::warn!(%e, "could not reload custom exercises");
                self.status = format!("⚠️  Could not reload custom exercises: {}", e);
                return Task::none();
            }
        }

        if self.selected >= self.tile_keys().len() {
            self.selected = 0;
        }
        Task::batch([
            self.rebuild_tiles(),
            self.rebuild_customs(),
            self.refresh_featured(),
        ])
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Tile(index, message) => {
                if let Some(tile) = self.tiles.get_mut(index) {
                    tile.image.update(message, &mut self.cache);
                }
                Task::none()
            }
            Message::Featured(message) => {
                self.featured.update(message, &mut self.cache);
                tracing::debug!(
                    exercise = self.featured.name(),
                    phase = ?self.featured.phase(),
                    "featured image settled"
                );
                Task::none()
            }
            Message::Custom(index, message) => {
                if let Some(row) = self.customs.get_mut(index) {
                    row.thumbnail.update(message, &mut self.cache);
                }
                Task::none()
            }
            Message::Select(index) => {
                self.selected = index;
                self.featured_equipment = None;
                self.refresh_featured()
            }
            Message::CycleEquipment => {
                let current = self
                    .featured_equipment
                    .and_then(|e| Equipment::ALL.iter().position(|&other| other == e));
                self.featured_equipment = Some(match current {
                    Some(i) => Equipment::ALL[(i + 1) % Equipment::ALL.len()],
                    None => Equipment::ALL[0],
                });
                self.refresh_featured()
            }
            Message::ToggleGridSize => {
                self.grid_size = match self.grid_size {
                    ImageSize::Small => ImageSize::Large,
                    ImageSize::Large => ImageSize::Small,
                };
                self.rebuild_tiles()
            }
            Message::NewExerciseNameChanged(name) => {
                self.new_exercise_name = name;
                Task::none()
            }
            Message::AddCustomExercise => {
                match self.library.add_custom_exercise(&self.new_exercise_name, None) {
                    Ok(exercise) => {
                        self.status = format!("✅ Added {}.", exercise.name);
                        self.new_exercise_name.clear();
                        self.reload_settings()
                    }
                    Err(e) => {
                        self.status = format!("⚠️  {}", e);
                        Task::none()
                    }
                }
            }
            Message::PickCustomImage(id) => {
                // Show the native file picker dialog
                let Some(path) = FileDialog::new()
                    .set_title("Choose an Exercise Image")
                    .add_filter("Images", &["png", "jpg", "jpeg", "webp", "gif", "bmp"])
                    .pick_file()
                else {
                    return Task::none();
                };

                let url = path.to_string_lossy().to_string();
                let result = self
                    .library
                    .set_image_url(&id, ImageSize::Small, Some(&url))
                    .and_then(|_| self.library.set_image_url(&id, ImageSize::Large, Some(&url)));

                match result {
                    Ok(()) => {
                        self.status = format!("📸 Image set for {}.", id);
                        self.reload_settings()
                    }
                    Err(e) => {
                        self.status = format!("⚠️  {}", e);
                        Task::none()
                    }
                }
            }
            Message::DeleteCustomExercise(id) => match self.library.delete_custom_exercise(&id) {
                Ok(()) => {
                    self.status = format!("🗑  Deleted {}.", id);
                    self.reload_settings()
                }
                Err(e) => {
                    self.status = format!("⚠️  {}", e);
                    Task::none()
                }
            },
            Message::Tick => {
                self.spinner_rotation = (self.spinner_rotation + 0.35) % std::f32::consts::TAU;
                Task::none()
            }
        }
    }

    fn is_loading(&self) -> bool {
        self.featured.is_loading() || self.tiles.iter().any(|t| t.image.is_loading())
    }

    /// Animate spinners only while something is loading
    fn subscription(&self) -> Subscription<Message> {
        if self.is_loading() {
            iced::time::every(Duration::from_millis(80)).map(|_| Message::Tick)
        } else {
            Subscription::none()
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<'_, Message> {
        let header = row![
            text("Exercise Thumbnails").size(32),
            Space::with_width(Length::Fill),
            button(match self.grid_size {
                ImageSize::Small => "Large Tiles",
                ImageSize::Large => "Small Tiles",
            })
            .on_press(Message::ToggleGridSize)
            .padding(10),
        ]
        .align_y(Alignment::Center);

        let tile_width = match self.grid_size {
            ImageSize::Small => 88.0,
            ImageSize::Large => 220.0,
        };
        let tiles: Vec<Element<Message>> = self
            .tiles
            .iter()
            .enumerate()
            .map(|(index, tile)| {
                let label = if tile.is_custom {
                    text("custom").size(10)
                } else {
                    text(tile.key.id.as_str()).size(10)
                };
                button(
                    column![tile.image.view(self.spinner_rotation), label]
                        .spacing(4)
                        .width(tile_width)
                        .align_x(Alignment::Center),
                )
                .on_press(Message::Select(index))
                .style(button::text)
                .into()
            })
            .collect();
        let grid = Wrap::with_elements(tiles).spacing(12.0).line_spacing(12.0);

        // Shown under the placeholder after a failed load
        let unavailable = self
            .featured
            .is_error()
            .then(|| text("No image for this equipment yet.").size(12));
        let featured = column![
            text(self.featured.name()).size(20),
            self.featured.view(self.spinner_rotation),
        ]
        .push_maybe(unavailable)
        .push(button("Next Equipment").on_press(Message::CycleEquipment))
        .spacing(12);

        let mut customs: Column<Message> = column![text("Custom Exercises").size(20)].spacing(8);
        for custom in &self.customs {
            customs = customs.push(
                row![
                    custom.thumbnail.view(),
                    text(custom.name.as_str()).width(Length::Fill),
                    button("Image…").on_press(Message::PickCustomImage(custom.id.clone())),
                    button("Delete").on_press(Message::DeleteCustomExercise(custom.id.clone())),
                ]
                .spacing(8)
                .align_y(Alignment::Center),
            );
        }
        customs = customs.push(
            row![
                text_input("New exercise name", &self.new_exercise_name)
                    .on_input(Message::NewExerciseNameChanged)
                    .on_submit(Message::AddCustomExercise),
                button("Add").on_press(Message::AddCustomExercise),
            ]
            .spacing(8),
        );

        let sidebar = scrollable(column![featured, customs].spacing(32).padding(8)).width(340.0);

        let content = column![
            header,
            row![scrollable(grid).width(Length::Fill), sidebar].spacing(24),
            text(&self.status).size(14),
        ]
        .spacing(20)
        .padding(24);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> iced::Result {
    let (config, config_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };
    init_tracing(&config.log_filter);
    if let Some(e) = config_error {
        tracing::warn!(%e, "using default config");
    }

    let boot = match Boot::prepare(config) {
        Ok(boot) => boot,
        Err(e) => {
            tracing::error!(%e, "failed to start");
            std::process::exit(1);
        }
    };

    iced::application("Exercise Thumbnails", Gallery::update, Gallery::view)
        .theme(Gallery::theme)
        .subscription(Gallery::subscription)
        .centered()
        .run_with(move || Gallery::new(boot))
}
