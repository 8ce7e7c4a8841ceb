use crate::models::GalleryImage;
use crate::progress::ProgressService;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GalleryKey {
    Escape,
    ArrowRight,
    ArrowLeft,
    Other,
}

impl GalleryKey {
    pub fn from_name(name: &str) -> Self {
        match name {
            "Escape" => GalleryKey::Escape,
            "ArrowRight" => GalleryKey::ArrowRight,
            "ArrowLeft" => GalleryKey::ArrowLeft,
            _ => GalleryKey::Other,
        }
    }
}

/// Photo list with a single-image viewer on top.
#[derive(Debug, Clone, Default)]
pub struct GalleryView {
    images: Vec<GalleryImage>,
    current: Option<usize>,
}

impl GalleryView {
    pub fn new(images: Vec<GalleryImage>) -> Self {
        Self {
            images,
            current: None,
        }
    }

    pub async fn load(progress: &ProgressService) -> Self {
        Self::new(progress.get_gallery_images().await)
    }

    pub fn images(&self) -> &[GalleryImage] {
        &self.images
    }

    pub fn selected(&self) -> Option<&GalleryImage> {
        self.current.and_then(|index| self.images.get(index))
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// Opens the image with `url`. Returns false when no such image is loaded.
    pub fn open(&mut self, url: &str) -> bool {
        info!("opening image: {url}");
        self.current = self.images.iter().position(|image| image.url == url);
        self.current.is_some()
    }

    pub fn close(&mut self) {
        self.current = None;
    }

    pub fn has_next(&self) -> bool {
        self.current
            .is_some_and(|index| index + 1 < self.images.len())
    }

    pub fn has_prev(&self) -> bool {
        self.current.is_some_and(|index| index > 0)
    }

    pub fn next(&mut self) {
        if self.has_next() {
            self.current = self.current.map(|index| index + 1);
        }
    }

    pub fn prev(&mut self) {
        if self.has_prev() {
            self.current = self.current.map(|index| index - 1);
        }
    }

    /// Keyboard handling for the open viewer; ignored while nothing is open.
    pub fn handle_key(&mut self, key: GalleryKey) {
        if self.current.is_none() {
            return;
        }
        match key {
            GalleryKey::Escape => self.close(),
            GalleryKey::ArrowRight => self.next(),
            GalleryKey::ArrowLeft => self.prev(),
            GalleryKey::Other => {}
        }
    }
}
