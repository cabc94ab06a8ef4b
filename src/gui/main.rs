#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use std::path::PathBuf;
use std::sync::mpsc;

use eframe::egui;

use pixgen::ai::{GeminiService, GeneratedImage};
use pixgen::config::Config;
use pixgen::pipeline::{self, RunOutcome};
use pixgen::session::{
    AspectRatio, Mode, SessionState, UploadedImage, MAX_IMAGE_COUNT, MIN_IMAGE_COUNT,
};
use pixgen::upload;

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([1100.0, 720.0])
        .with_min_inner_size([800.0, 500.0])
        .with_drag_and_drop(true);

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        "pixgen",
        options,
        Box::new(|cc| Ok(Box::new(App::new(cc)))),
    )
}

// ── Messages sent from background tasks to the UI ───────────────────

enum BgMessage {
    /// An upload batch was read successfully.
    UploadsRead(Vec<UploadedImage>),
    /// Reading an upload batch failed; nothing was added.
    UploadFailed(String),
    /// A generation/edit run finished.
    RunFinished(RunOutcome),
    /// A generation/edit run failed.
    RunFailed(String),
}

// ── Per-result state shown in the gallery ───────────────────────────

struct GalleryEntry {
    image: GeneratedImage,
    /// Texture handle, created lazily on first draw.
    texture: Option<egui::TextureHandle>,
    /// Set when the returned bytes could not be decoded, so we don't retry
    /// every frame.
    decode_failed: bool,
}

// ── Main application state ──────────────────────────────────────────

struct App {
    config: Config,
    session: SessionState,
    prompt: String,
    busy: bool,
    status: String,
    gallery: Vec<GalleryEntry>,
    /// One user-visible error message; replaces the results area when set.
    error: Option<String>,
    rx: mpsc::Receiver<BgMessage>,
    tx: mpsc::Sender<BgMessage>,
    /// Tokio runtime for async tasks.
    rt: tokio::runtime::Runtime,
}

impl App {
    fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let (tx, rx) = mpsc::channel();
        let config = Config::load(None).unwrap_or_default();

        Self {
            config,
            session: SessionState::default(),
            prompt: String::new(),
            busy: false,
            status: "Ready — describe an image, or add images to edit".into(),
            gallery: Vec::new(),
            error: None,
            rx,
            tx,
            rt: tokio::runtime::Runtime::new().expect("Failed to create tokio runtime"),
        }
    }

    fn add_paths(&mut self, paths: Vec<PathBuf>) {
        let supported: Vec<PathBuf> = paths
            .into_iter()
            .filter(|p| {
                let ok = upload::is_supported_image(p);
                if !ok {
                    log::warn!("Skipping unsupported file: {}", p.display());
                }
                ok
            })
            .collect();
        if supported.is_empty() {
            return;
        }

        let tx = self.tx.clone();
        self.rt.spawn(async move {
            match upload::read_batch(&supported).await {
                Ok(batch) => {
                    let _ = tx.send(BgMessage::UploadsRead(batch));
                }
                Err(e) => {
                    let _ = tx.send(BgMessage::UploadFailed(format!("Failed to read files: {e}")));
                }
            }
        });
    }

    fn open_files(&mut self) {
        if let Some(paths) = rfd::FileDialog::new()
            .add_filter(
                "Images",
                &["jpg", "jpeg", "png", "webp", "gif", "bmp", "tif", "tiff"],
            )
            .pick_files()
        {
            self.add_paths(paths);
        }
    }

    fn submit(&mut self) {
        if self.busy {
            return;
        }
        // Validation error: handled locally, no network call.
        if self.prompt.trim().is_empty() {
            self.error = Some("Please enter a prompt".into());
            self.status = "Prompt is empty".into();
            return;
        }
        let Some(api_key) = self.config.resolved_api_key() else {
            self.error = Some(
                "No API key configured — set it in config.json or GEMINI_API_KEY".into(),
            );
            return;
        };

        self.busy = true;
        self.error = None;
        self.gallery.clear();
        self.status = match self.session.mode() {
            Mode::Generate => "Generating...".into(),
            Mode::Edit => "Editing...".into(),
        };

        let service = GeminiService::new(
            api_key,
            self.config.generate_model.clone(),
            self.config.edit_model.clone(),
        );
        let session = self.session.clone();
        let prompt = self.prompt.clone();
        let tx = self.tx.clone();

        self.rt.spawn(async move {
            match pipeline::run(&service, &session, &prompt).await {
                Ok(outcome) => {
                    let _ = tx.send(BgMessage::RunFinished(outcome));
                }
                Err(e) => {
                    let _ = tx.send(BgMessage::RunFailed(e.to_string()));
                }
            }
        });
    }

    fn poll_messages(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            match msg {
                BgMessage::UploadsRead(batch) => {
                    self.session.add_uploads(batch);
                    self.status = format!("{} image(s) attached", self.session.uploads().len());
                }
                BgMessage::UploadFailed(msg) => {
                    self.error = Some(msg);
                }
                BgMessage::RunFinished(outcome) => {
                    self.busy = false;
                    match outcome {
                        RunOutcome::Images(images) => {
                            self.status = format!("Done — {} image(s)", images.len());
                            self.gallery = images
                                .into_iter()
                                .map(|image| GalleryEntry {
                                    image,
                                    texture: None,
                                    decode_failed: false,
                                })
                                .collect();
                        }
                        RunOutcome::Empty { message } => {
                            self.status = message;
                        }
                    }
                }
                BgMessage::RunFailed(msg) => {
                    self.busy = false;
                    self.error = Some(msg);
                    self.status = "Failed".into();
                }
            }
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_messages();

        // Request repaint while busy so we pick up messages
        if self.busy {
            ctx.request_repaint();
        }

        // Handle dropped files
        let dropped: Vec<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|f| f.path.clone())
                .collect()
        });
        if !dropped.is_empty() {
            self.add_paths(dropped);
        }

        // ── Top bar ─────────────────────────────────────────────────
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("pixgen");
                ui.separator();
                let mode_label = match self.session.mode() {
                    Mode::Generate => "Mode: Generate",
                    Mode::Edit => "Mode: Edit",
                };
                ui.label(egui::RichText::new(mode_label).strong());

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if self.busy {
                        ui.spinner();
                    }
                    ui.label(&self.status);
                });
            });
        });

        self.show_prompt_panel(ctx);
        self.show_side_panel(ctx);
        self.show_gallery(ctx);
    }
}

impl App {
    // ── Bottom panel: prompt + submit ───────────────────────────────

    fn show_prompt_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("prompt_panel").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                let prompt_edit = egui::TextEdit::multiline(&mut self.prompt)
                    .hint_text("Describe the image to generate, or the edit to apply...")
                    .desired_rows(2)
                    .desired_width(ui.available_width() - 120.0);
                ui.add_enabled(!self.busy, prompt_edit);

                // Disabled while busy: no concurrent submissions.
                if ui
                    .add_enabled(!self.busy, egui::Button::new("✨ Generate"))
                    .clicked()
                {
                    self.submit();
                }
            });
            ui.add_space(6.0);
        });
    }

    // ── Left panel: uploads + settings ──────────────────────────────

    fn show_side_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("side_panel")
            .default_width(260.0)
            .min_width(200.0)
            .show(ctx, |ui| {
                ui.heading("Images");
                ui.separator();

                ui.horizontal(|ui| {
                    if ui
                        .add_enabled(!self.busy, egui::Button::new("📂 Add Images"))
                        .clicked()
                    {
                        self.open_files();
                    }
                    if ui
                        .add_enabled(
                            !self.busy && !self.session.uploads().is_empty(),
                            egui::Button::new("🗑 Clear"),
                        )
                        .clicked()
                    {
                        self.session.clear_uploads();
                        self.status = "Uploads cleared".into();
                    }
                });
                ui.add_space(4.0);

                if self.session.uploads().is_empty() {
                    ui.label(
                        egui::RichText::new("Drop images here to switch to edit mode")
                            .color(egui::Color32::GRAY),
                    );
                } else {
                    let mut remove: Option<usize> = None;
                    egui::ScrollArea::vertical()
                        .max_height(220.0)
                        .show(ui, |ui| {
                            for (i, entry) in self.session.uploads().iter().enumerate() {
                                ui.horizontal(|ui| {
                                    if ui
                                        .add_enabled(!self.busy, egui::Button::new("✖").small())
                                        .clicked()
                                    {
                                        remove = Some(i);
                                    }
                                    ui.label(&entry.name);
                                    ui.label(
                                        egui::RichText::new(&entry.mime_type)
                                            .small()
                                            .color(egui::Color32::GRAY),
                                    );
                                });
                            }
                        });
                    if let Some(i) = remove {
                        self.session.remove_upload(i);
                    }
                }

                ui.add_space(12.0);
                ui.separator();
                ui.heading("Settings");
                ui.add_space(4.0);

                // The edit path ignores these, so they are disabled (and
                // greyed out) whenever any image is uploaded.
                let generate_mode = self.session.mode() == Mode::Generate;
                ui.add_enabled_ui(generate_mode, |ui| {
                    egui::ComboBox::from_label("Aspect ratio")
                        .selected_text(self.session.settings.aspect_ratio.as_str())
                        .show_ui(ui, |ui| {
                            for ratio in AspectRatio::ALL {
                                ui.selectable_value(
                                    &mut self.session.settings.aspect_ratio,
                                    ratio,
                                    ratio.as_str(),
                                );
                            }
                        });

                    ui.add(
                        egui::Slider::new(
                            &mut self.session.settings.image_count,
                            MIN_IMAGE_COUNT..=MAX_IMAGE_COUNT,
                        )
                        .text("Images"),
                    );
                });
                if !generate_mode {
                    ui.label(
                        egui::RichText::new("Not used when editing uploaded images")
                            .small()
                            .color(egui::Color32::GRAY),
                    );
                }
            });
    }

    // ── Central panel: gallery or error ─────────────────────────────

    fn show_gallery(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(ref err) = self.error {
                ui.centered_and_justified(|ui| {
                    ui.colored_label(egui::Color32::from_rgb(220, 50, 50), err);
                });
                return;
            }

            if self.gallery.is_empty() {
                ui.centered_and_justified(|ui| {
                    ui.label(
                        egui::RichText::new("Results appear here")
                            .size(18.0)
                            .color(egui::Color32::GRAY),
                    );
                });
                return;
            }

            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    ui.horizontal_wrapped(|ui| {
                        for (i, entry) in self.gallery.iter_mut().enumerate() {
                            Self::load_texture(ctx, i, entry);
                            if let Some(ref tex) = entry.texture {
                                let size = tex.size_vec2();
                                let max_side = 340.0;
                                let scale = (max_side / size.x).min(max_side / size.y).min(1.0);
                                ui.image(egui::load::SizedTexture::new(tex.id(), size * scale));
                            }
                        }
                    });
                });
        });
    }

    fn load_texture(ctx: &egui::Context, index: usize, entry: &mut GalleryEntry) {
        if entry.texture.is_some() || entry.decode_failed {
            return;
        }

        match image::load_from_memory(&entry.image.data) {
            Ok(img) => {
                let size = [img.width() as usize, img.height() as usize];
                let rgba = img.to_rgba8();
                let pixels = rgba.as_flat_samples();
                let color_image =
                    egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice());
                entry.texture = Some(ctx.load_texture(
                    format!("result_{index}"),
                    color_image,
                    egui::TextureOptions::LINEAR,
                ));
            }
            Err(e) => {
                entry.decode_failed = true;
                log::warn!("Failed to decode returned image {index}: {e}");
            }
        }
    }
}
