use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use image::{ColorType, DynamicImage, codecs::jpeg::JpegEncoder};
use thiserror::Error;

use crate::{config::Settings, model::Notification, notify::Notifier};

/// Prefix put in front of every saved file name
pub const FILE_PREFIX: &str = "JPEG_";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("no image to save for {url}")]
    MissingImage { url: String },
    #[error("cannot create directory {}: {source}", .path.display())]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("cannot create {}: {source}", .path.display())]
    CreateFile { path: PathBuf, source: io::Error },
    #[error("cannot encode {} as JPEG: {source}", .path.display())]
    Encode { path: PathBuf, source: image::ImageError },
    #[error("cannot write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("cannot register {} with the media index: {source}", .path.display())]
    MediaIndex { path: PathBuf, source: io::Error },
    #[error("save task did not finish: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Makes newly written files visible to gallery-style browsers.
pub trait MediaIndex: Send + Sync {
    fn register(&self, path: &Path) -> io::Result<()>;
}

/// Desktop index: file managers pick files up on their own, so this only logs.
pub struct LogMediaIndex;

impl MediaIndex for LogMediaIndex {
    fn register(&self, path: &Path) -> io::Result<()> {
        log::info!("Registered {} with the media index", path.display());
        Ok(())
    }
}

/// `JPEG_` + the part of `url` after its last `/`, without query or fragment.
///
/// A `/` inside the query still counts as a path separator. `\` is treated
/// the same way so the name can never leave the target directory.
pub fn derive_file_name(url: &str) -> String {
    let tail = url.rsplit(['/', '\\']).next().unwrap_or(url);
    let base = tail.split(['?', '#']).next().unwrap_or(tail);
    format!("{FILE_PREFIX}{base}")
}

/// Writes decoded images as JPEGs into one fixed directory
pub struct Persister {
    target_dir: PathBuf,
    quality: u8,
    media_index: Arc<dyn MediaIndex>,
}

impl Persister {
    pub fn new(settings: &Settings, media_index: Arc<dyn MediaIndex>) -> Self {
        Self {
            target_dir: settings.target_dir(),
            quality: settings.jpeg_quality,
            media_index,
        }
    }

    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    /// Path the image fetched from `url` is written to.
    pub fn path_for(&self, url: &str) -> PathBuf {
        self.target_dir.join(derive_file_name(url))
    }

    /// Writes `image` to [`Self::path_for`], replacing any existing file.
    ///
    /// An absent image is skipped before anything touches the disk.
    pub fn persist(&self, image: Option<&DynamicImage>, url: &str) -> Result<PathBuf, PersistError> {
        let Some(image) = image else {
            log::warn!("Nothing to save for {url}, skipping");
            return Err(PersistError::MissingImage { url: url.to_string() });
        };

        fs::create_dir_all(&self.target_dir).map_err(|source| PersistError::CreateDir {
            path: self.target_dir.clone(),
            source,
        })?;

        let path = self.path_for(url);
        let file = File::create(&path).map_err(|source| PersistError::CreateFile {
            path: path.clone(),
            source,
        })?;
        let mut out = BufWriter::new(file);

        // JPEG has no alpha channel
        let rgb = image.to_rgb8();
        JpegEncoder::new_with_quality(&mut out, self.quality)
            .encode(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)
            .map_err(|source| PersistError::Encode {
                path: path.clone(),
                source,
            })?;
        out.flush().map_err(|source| PersistError::Write {
            path: path.clone(),
            source,
        })?;
        drop(out);

        self.media_index
            .register(&path)
            .map_err(|source| PersistError::MediaIndex {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }
}

/// Runs [`Persister::persist`] on the blocking pool and reports the result.
///
/// Emits `SaveSucceeded` or `SaveFailed`; a skipped (absent) image emits nothing.
pub async fn persist_image(
    persister: Arc<Persister>,
    image: Option<Arc<DynamicImage>>,
    url: String,
    notifier: &Notifier,
) -> Result<PathBuf, PersistError> {
    let result = tokio::task::spawn_blocking(move || persister.persist(image.as_deref(), &url))
        .await
        .map_err(PersistError::from)
        .and_then(|r| r);

    match &result {
        Ok(path) => {
            log::info!("Saved {}", path.display());
            notifier.notify(Notification::SaveSucceeded);
        }
        Err(PersistError::MissingImage { .. }) => {}
        Err(e) => {
            log::error!("Save failed: {e}");
            notifier.notify(Notification::SaveFailed);
        }
    }
    result
}
