//! Main application for the URL image saver GUI

// Saving location and encoder settings
mod config;
// Fetch → store → persist pipeline
mod downloader;
// Remote image retrieval and decoding
mod fetcher;
// Data models shared by the pipeline and the window
mod model;
// Notification port and on-screen toasts
mod notify;
// JPEG writing and media index registration
mod persister;
// Append-only list of downloaded images
mod store;
#[cfg(test)]
mod test_support;

use config::Settings;
use downloader::{DownloadContext, run_download};
use fetcher::HttpFetcher;
use model::{DownloadOutcome, DownloadedImage, Notification};
use notify::{Notifier, Toasts};
use persister::{LogMediaIndex, Persister};
use store::SessionStore;

// eframe/egui for GUI application framework
use eframe::{App, Frame, egui};
use egui::{ColorImage, TextureOptions, Visuals};
// OnceCell for single-time runtime initialization
use once_cell::sync::OnceCell;
// FileDialog for picking the pictures root
use rfd::FileDialog;
use image::DynamicImage;
use std::{borrow::Cow, error::Error, sync::Arc, time::Instant};
use tokio::{
    runtime::Runtime,
    sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel},
};

// Global Tokio runtime stored in a OnceCell for lazy init
static RUNTIME: OnceCell<Arc<Runtime>> = OnceCell::new();

/// Program entry point: initializes logging and runtime, then launches GUI
fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    RUNTIME
        .set(Arc::new(Runtime::new()?))
        .map_err(|_| "tokio runtime already initialised")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([480.0, 760.0]),
        ..Default::default()
    };
    eframe::run_native(
        "URL Image Saver",
        options,
        Box::new(|cc| {
            cc.egui_ctx.set_visuals(Visuals::dark());
            Box::new(ImageSaverApp::new(Settings::default()))
        }),
    )?;
    Ok(())
}

/// Application state for the GUI
struct ImageSaverApp {
    /// Input field for the image URL; kept after submitting
    url_input: String,
    /// Where images are saved
    settings: Settings,
    /// Images downloaded during this run
    store: SessionStore,
    /// One texture per store entry, same order
    textures: Vec<egui::TextureHandle>,
    /// Sender handed to every download task
    store_tx: UnboundedSender<DownloadedImage>,
    /// Completed fetches waiting to be appended
    store_rx: UnboundedReceiver<DownloadedImage>,
    notifier: Notifier,
    notifications: UnboundedReceiver<Notification>,
    toasts: Toasts,
    fetcher: Arc<HttpFetcher>,
}

impl ImageSaverApp {
    fn new(settings: Settings) -> Self {
        let (store_tx, store_rx) = unbounded_channel();
        let (notifier, notifications) = Notifier::channel();
        log::info!("Saving images to {}", settings.target_dir().display());
        Self {
            url_input: String::new(),
            settings,
            store: SessionStore::new(),
            textures: Vec::new(),
            store_tx,
            store_rx,
            notifier,
            notifications,
            toasts: Toasts::default(),
            fetcher: Arc::new(HttpFetcher::new()),
        }
    }

    /// Context for one download; picks up the current save location.
    fn download_context(&self) -> DownloadContext {
        let persister = Persister::new(&self.settings, Arc::new(LogMediaIndex));
        log::debug!("Next download saves into {}", persister.target_dir().display());
        DownloadContext {
            fetcher: self.fetcher.clone(),
            persister: Arc::new(persister),
            notifier: self.notifier.clone(),
            store_tx: self.store_tx.clone(),
        }
    }

    /// Starts a detached download of whatever is in the URL field.
    fn start_download(&self) {
        let Some(rt) = RUNTIME.get() else {
            log::error!("No runtime, cannot start download");
            return;
        };
        let url = self.url_input.clone();
        let ctx = self.download_context();
        rt.spawn(async move {
            let outcome = run_download(url.clone(), ctx).await;
            match (&outcome, outcome.saved_path()) {
                (DownloadOutcome::FetchFailed(e), _) => log::debug!("{url}: fetch failed ({e})"),
                (DownloadOutcome::Fetched { image, .. }, Some(path)) => {
                    let (w, h) = image.dimensions();
                    log::debug!("{url}: {w}x{h}, saved to {}", path.display())
                }
                (DownloadOutcome::Fetched { image, saved }, None) => {
                    let (w, h) = image.dimensions();
                    if let Err(e) = saved {
                        log::debug!("{url}: {w}x{h}, shown but not saved ({e})")
                    }
                }
            }
        });
    }

    /// Appends finished downloads in arrival order and uploads their textures.
    fn collect_downloads(&mut self, ctx: &egui::Context) {
        let max_side = ctx.input(|i| i.max_texture_side);
        while let Ok(img) = self.store_rx.try_recv() {
            let color = to_color_image(&img, max_side);
            let index = self.store.append(img);
            let tex = ctx.load_texture(format!("image-{index}"), color, TextureOptions::default());
            self.textures.push(tex);
        }
    }
}

/// GUI update loop: called each frame to redraw and handle interactions
impl App for ImageSaverApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        let now = Instant::now();
        self.collect_downloads(ctx);
        self.toasts.drain_from(&mut self.notifications, now);
        self.toasts.expire(now);

        // Bottom panel: download button and save location
        egui::TopBottomPanel::bottom("actions").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                if ui.button("Download image").clicked() {
                    self.start_download();
                }
                if ui.button("Save to…").clicked() {
                    if let Some(folder) = FileDialog::new()
                        .set_directory(&self.settings.pictures_root)
                        .pick_folder()
                    {
                        self.settings.set_pictures_root(&folder);
                    }
                }
            });
            ui.small(format!("Saving to {}", self.settings.target_dir().display()));
            ui.add_space(6.0);
        });

        // Main panel: URL input and the list of downloaded images
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add(
                egui::TextEdit::singleline(&mut self.url_input)
                    .hint_text("Enter image URL")
                    .desired_width(f32::INFINITY),
            );
            ui.separator();
            ui.label(format!("Downloaded images: {}", self.store.len()));

            egui::ScrollArea::vertical()
                .auto_shrink([false; 2])
                .show(ui, |ui| {
                    if self.store.is_empty() {
                        ui.weak("No images downloaded yet");
                    }
                    for (index, tex) in self.textures.iter().enumerate() {
                        let Some(img) = self.store.get(index) else {
                            continue;
                        };
                        egui::Frame::none().inner_margin(10.0).show(ui, |ui| {
                            ui.add(
                                egui::Image::new(egui::load::SizedTexture::from_handle(tex))
                                    .max_width(ui.available_width())
                                    .rounding(15.0),
                            )
                            .on_hover_text(&img.source_url);
                        });
                    }
                });
        });

        self.toasts.show(ctx);

        // Request periodic repaint to poll the channels
        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }
}

/// Shrinks `img` so neither side exceeds `max_side`, keeping the aspect ratio.
///
/// Only the on-screen copy is scaled; the stored image keeps full resolution.
fn fit_to_texture(img: &DynamicImage, max_side: usize) -> Cow<'_, DynamicImage> {
    let limit = u32::try_from(max_side).unwrap_or(u32::MAX).max(1);
    if img.width() <= limit && img.height() <= limit {
        return Cow::Borrowed(img);
    }
    log::debug!(
        "Scaling {}x{} down to fit {limit}px textures",
        img.width(),
        img.height()
    );
    Cow::Owned(img.thumbnail(limit, limit))
}

/// Converts a stored image into an egui texture source no larger than `max_side`
fn to_color_image(img: &DownloadedImage, max_side: usize) -> ColorImage {
    let rgba = fit_to_texture(&img.image, max_side).to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    ColorImage::from_rgba_unmultiplied(size, rgba.as_raw())
}
