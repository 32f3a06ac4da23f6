//! Fixtures shared by the unit tests.

use std::{collections::HashMap, io::Cursor, path::PathBuf, sync::Mutex, time::Duration};

use async_trait::async_trait;
use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};

use crate::{
    config::Settings,
    fetcher::{FetchError, ImageFetcher},
    persister::MediaIndex,
};

/// PNG-encoded solid image of the given size
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([200, 80, 10])));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageOutputFormat::Png).unwrap();
    buf.into_inner()
}

/// Default settings rooted at `root`
pub fn settings_in(root: &std::path::Path) -> Settings {
    Settings {
        pictures_root: root.to_path_buf(),
        ..Settings::default()
    }
}

/// Returns the same answer for every URL
pub struct StaticFetcher {
    body: Option<Vec<u8>>,
}

impl StaticFetcher {
    pub fn ok(body: Vec<u8>) -> Self {
        Self { body: Some(body) }
    }

    pub fn unreachable() -> Self {
        Self { body: None }
    }
}

#[async_trait]
impl ImageFetcher for StaticFetcher {
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.body.clone().ok_or_else(|| FetchError::Request {
            url: url.to_string(),
            source: "connection refused".into(),
        })
    }
}

/// Serves per-URL bodies after a per-URL delay
#[derive(Default)]
pub struct DelayedFetcher {
    routes: HashMap<String, (Duration, Vec<u8>)>,
}

impl DelayedFetcher {
    pub fn route(mut self, url: &str, delay: Duration, body: Vec<u8>) -> Self {
        self.routes.insert(url.to_string(), (delay, body));
        self
    }
}

#[async_trait]
impl ImageFetcher for DelayedFetcher {
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let (delay, body) = self.routes.get(url).cloned().ok_or_else(|| FetchError::Status {
            url: url.to_string(),
            status: 404,
        })?;
        tokio::time::sleep(delay).await;
        Ok(body)
    }
}

/// Remembers every registered path; optionally refuses them
#[derive(Default)]
pub struct RecordingIndex {
    pub registered: Mutex<Vec<PathBuf>>,
    pub fail: bool,
}

impl MediaIndex for RecordingIndex {
    fn register(&self, path: &std::path::Path) -> std::io::Result<()> {
        if self.fail {
            return Err(std::io::Error::other("media index unavailable"));
        }
        self.registered.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }
}
