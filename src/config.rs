use std::path::{Path, PathBuf};

/// Folder created under the pictures root to hold saved images
pub const FOLDER_NAME: &str = "URL Image Saver";

/// Highest quality accepted by the JPEG encoder
pub const MAX_JPEG_QUALITY: u8 = 100;

/// Where and how downloaded images are written
#[derive(Clone, Debug)]
pub struct Settings {
    /// Base directory, normally the user's Pictures folder
    pub pictures_root: PathBuf,
    /// Subfolder name appended to the root
    pub folder_name: String,
    /// JPEG quality (1-100)
    pub jpeg_quality: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pictures_root: default_pictures_root(),
            folder_name: FOLDER_NAME.to_string(),
            jpeg_quality: MAX_JPEG_QUALITY,
        }
    }
}

impl Settings {
    /// `<pictures_root>/<folder_name>`
    pub fn target_dir(&self) -> PathBuf {
        self.pictures_root.join(&self.folder_name)
    }

    pub fn set_pictures_root(&mut self, root: &Path) {
        log::info!("Pictures root changed to {}", root.display());
        self.pictures_root = root.to_path_buf();
    }
}

/// Platform Pictures dir, then `$HOME/Pictures`, then `./Pictures`
fn default_pictures_root() -> PathBuf {
    dirs::picture_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Pictures")))
        .unwrap_or_else(|| PathBuf::from("Pictures"))
}
