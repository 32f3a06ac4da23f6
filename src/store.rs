use crate::model::DownloadedImage;

/// Images fetched during this run, in the order their downloads finished.
///
/// Append-only: entries are never removed or reordered, and nothing here is
/// written to disk. Owned by the UI thread, so there is no locking.
#[derive(Default)]
pub struct SessionStore {
    images: Vec<DownloadedImage>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `image` at the end and returns its index.
    pub fn append(&mut self, image: DownloadedImage) -> usize {
        let (width, height) = image.dimensions();
        log::info!(
            "Stored image #{} from {} ({width}x{height})",
            self.images.len(),
            image.source_url,
        );
        self.images.push(image);
        self.images.len() - 1
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&DownloadedImage> {
        self.images.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DownloadedImage> {
        self.images.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb, RgbImage};

    fn image(url: &str, width: u32) -> DownloadedImage {
        DownloadedImage::new(url, DynamicImage::ImageRgb8(RgbImage::from_pixel(width, 1, Rgb([0, 0, 0]))))
    }

    #[test]
    fn starts_empty() {
        let store = SessionStore::new();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
        assert!(store.iter().next().is_none());
        assert!(store.get(0).is_none());
    }

    #[test]
    fn append_grows_by_one_and_keeps_order() {
        let mut store = SessionStore::new();
        assert_eq!(store.append(image("https://a/1.png", 1)), 0);
        assert_eq!(store.append(image("https://a/2.png", 2)), 1);
        assert_eq!(store.append(image("https://a/1.png", 3)), 2);

        assert_eq!(store.len(), 3);
        let widths: Vec<_> = store.iter().map(|i| i.dimensions().0).collect();
        assert_eq!(widths, vec![1, 2, 3]);
        assert_eq!(store.iter().nth(1).map(|i| i.source_url.as_str()), Some("https://a/2.png"));
    }

    #[test]
    fn get_looks_up_by_append_index() {
        let mut store = SessionStore::new();
        let first = store.append(image("https://a/first.png", 4));
        let second = store.append(image("https://a/second.png", 5));

        assert_eq!(store.get(first).map(|i| i.source_url.as_str()), Some("https://a/first.png"));
        assert_eq!(store.get(second).map(|i| i.dimensions()), Some((5, 1)));
        assert!(store.get(2).is_none());
        assert!(store.get(usize::MAX).is_none());
    }
}
