use std::{path::PathBuf, sync::Arc};

use image::DynamicImage;

use crate::{fetcher::FetchError, persister::PersistError};

/// A successfully fetched image, as held by the session store
#[derive(Clone, Debug)]
pub struct DownloadedImage {
    /// URL the image was fetched from
    pub source_url: String,
    /// Decoded pixels, shared between the store and the persist stage
    pub image: Arc<DynamicImage>,
}

impl DownloadedImage {
    pub fn new(source_url: impl Into<String>, image: DynamicImage) -> Self {
        Self {
            source_url: source_url.into(),
            image: Arc::new(image),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }
}

/// User-visible feedback emitted by the download pipeline
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notification {
    /// The image was fetched and decoded
    DownloadSucceeded,
    /// Fetching or decoding failed
    DownloadFailed,
    /// The JPEG was written and registered with the media index
    SaveSucceeded,
    /// Writing or registering the file failed
    SaveFailed,
}

impl Notification {
    /// Text shown to the user
    pub fn message(self) -> &'static str {
        match self {
            Notification::DownloadSucceeded => "Image downloaded",
            Notification::DownloadFailed => "Could not download the image",
            Notification::SaveSucceeded => "Image saved to device storage",
            Notification::SaveFailed => "Could not save the image",
        }
    }

    pub fn is_failure(self) -> bool {
        matches!(self, Notification::DownloadFailed | Notification::SaveFailed)
    }
}

/// Result of one Fetch → Persist run
#[derive(Debug)]
pub enum DownloadOutcome {
    /// Nothing was stored or written
    FetchFailed(FetchError),
    /// The image reached the session store; `saved` reports the disk write
    Fetched {
        image: DownloadedImage,
        saved: Result<PathBuf, PersistError>,
    },
}

impl DownloadOutcome {
    pub fn saved_path(&self) -> Option<&PathBuf> {
        match self {
            DownloadOutcome::Fetched { saved: Ok(path), .. } => Some(path),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_failures_are_flagged() {
        assert!(Notification::DownloadFailed.is_failure());
        assert!(Notification::SaveFailed.is_failure());
        assert!(!Notification::DownloadSucceeded.is_failure());
        assert!(!Notification::SaveSucceeded.is_failure());
    }

    #[test]
    fn failed_fetch_carries_no_image() {
        let outcome = DownloadOutcome::FetchFailed(FetchError::Decode {
            url: "x".into(),
            source: image::ImageError::IoError(std::io::Error::other("boom")),
        });
        assert!(outcome.saved_path().is_none());
    }
}
