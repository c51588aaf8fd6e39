//! Background texture decoding
//!
//! Every image is decoded on its own short-lived thread and handed back
//! through a oneshot channel. The frame loop polls handles without blocking;
//! nothing waits on a load except tests.

use std::{
    collections::HashMap,
    fmt,
    path::{Path, PathBuf},
    thread,
};

use futures::channel::oneshot;
use image::imageops::FilterType;

use crate::error::{Result, StagehandError};

/// The demo's texture assets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TextureKey {
    DoorColor,
    DoorAlpha,
    DoorHeight,
    DoorAmbientOcclusion,
    DoorNormal,
    Matcap,
    Gradient,
}

impl TextureKey {
    pub const ALL: [TextureKey; 7] = [
        TextureKey::DoorColor,
        TextureKey::DoorAlpha,
        TextureKey::DoorHeight,
        TextureKey::DoorAmbientOcclusion,
        TextureKey::DoorNormal,
        TextureKey::Matcap,
        TextureKey::Gradient,
    ];

    /// Path relative to the asset root
    pub fn relative_path(self) -> &'static str {
        match self {
            TextureKey::DoorColor => "textures/door/color.jpg",
            TextureKey::DoorAlpha => "textures/door/alpha.jpg",
            TextureKey::DoorHeight => "textures/door/height.jpg",
            TextureKey::DoorAmbientOcclusion => "textures/door/ambientOcclusion.jpg",
            TextureKey::DoorNormal => "textures/door/normal.jpg",
            TextureKey::Matcap => "textures/matcaps/1.png",
            TextureKey::Gradient => "textures/matcaps/3.png",
        }
    }
}

impl fmt::Display for TextureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Tightly packed RGBA8 pixels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl DecodedImage {
    /// Decodes any format the `image` crate was built with
    pub fn decode(path: &Path) -> Result<Self> {
        let image = image::open(path).map_err(|source| StagehandError::TextureLoad {
            path: path.to_path_buf(),
            source,
        })?;
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Self {
            width,
            height,
            rgba: rgba.into_raw(),
        })
    }

    /// Whether both sides are at most `max_dimension`
    pub fn fits_within(&self, max_dimension: u32) -> bool {
        self.width <= max_dimension && self.height <= max_dimension
    }

    /// Copy scaled so its longer side is `max_dimension`, keeping the aspect
    ///
    /// `None` if the pixel buffer does not match the stated size.
    pub fn downscaled_to(&self, max_dimension: u32) -> Option<DecodedImage> {
        let longest = self.width.max(self.height).max(1);
        let scale = f64::from(max_dimension) / f64::from(longest);
        let width = ((f64::from(self.width) * scale).round() as u32).clamp(1, max_dimension.max(1));
        let height = ((f64::from(self.height) * scale).round() as u32).clamp(1, max_dimension.max(1));

        let source = image::RgbaImage::from_raw(self.width, self.height, self.rgba.clone())?;
        let resized = image::imageops::resize(&source, width, height, FilterType::Triangle);
        Some(Self {
            width,
            height,
            rgba: resized.into_raw(),
        })
    }
}

/// Load state as seen by the frame loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Pending,
    Ready,
    Failed,
}

enum HandleState {
    Pending(oneshot::Receiver<Result<DecodedImage>>),
    Ready(DecodedImage),
    Failed(String),
}

/// A texture that may still be decoding
pub struct TextureHandle {
    path: PathBuf,
    state: HandleState,
}

impl TextureHandle {
    /// Starts decoding `path` on a background thread
    pub fn spawn(path: PathBuf) -> Self {
        let (sender, receiver) = oneshot::channel();
        let thread_path = path.clone();
        let spawned = thread::Builder::new()
            .name("texture-decode".to_string())
            .spawn(move || {
                // The receiver may already be gone at shutdown
                let _ = sender.send(DecodedImage::decode(&thread_path));
            });

        let state = match spawned {
            Ok(_) => HandleState::Pending(receiver),
            Err(err) => HandleState::Failed(format!("could not start decoder thread: {}", err)),
        };
        Self { path, state }
    }

    pub fn status(&self) -> LoadStatus {
        match self.state {
            HandleState::Pending(_) => LoadStatus::Pending,
            HandleState::Ready(_) => LoadStatus::Ready,
            HandleState::Failed(_) => LoadStatus::Failed,
        }
    }

    pub fn image(&self) -> Option<&DecodedImage> {
        match &self.state {
            HandleState::Ready(image) => Some(image),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            HandleState::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Checks for a finished decode without blocking
    ///
    /// Returns `true` exactly once, on the call that observes the transition
    /// out of `Pending`.
    pub fn poll(&mut self) -> bool {
        let received = match &mut self.state {
            HandleState::Pending(receiver) => match receiver.try_recv() {
                Ok(None) => return false,
                Ok(Some(result)) => result,
                Err(oneshot::Canceled) => Err(StagehandError::TextureCanceled(self.path.clone())),
            },
            _ => return false,
        };
        self.settle(received);
        true
    }

    /// Blocks until the decode finishes
    pub fn wait(&mut self) -> LoadStatus {
        let state = std::mem::replace(&mut self.state, HandleState::Failed(String::new()));
        match state {
            HandleState::Pending(receiver) => {
                let result = futures::executor::block_on(receiver)
                    .unwrap_or_else(|_| Err(StagehandError::TextureCanceled(self.path.clone())));
                self.settle(result);
            }
            other => self.state = other,
        }
        self.status()
    }

    fn settle(&mut self, result: Result<DecodedImage>) {
        self.state = match result {
            Ok(image) => {
                log::info!(
                    "Texture ready: {} ({}x{})",
                    self.path.display(),
                    image.width,
                    image.height
                );
                HandleState::Ready(image)
            }
            Err(err) => {
                log::warn!("{}; keeping placeholder", err);
                HandleState::Failed(err.to_string())
            }
        };
    }
}

/// All texture loads started at setup, keyed by asset
pub struct TextureLibrary {
    handles: HashMap<TextureKey, TextureHandle>,
}

impl TextureLibrary {
    /// Starts loading every asset under `root`
    pub fn load_all(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        log::info!(
            "Loading {} textures from {}",
            TextureKey::ALL.len(),
            root.display()
        );
        let handles = TextureKey::ALL
            .into_iter()
            .map(|key| (key, TextureHandle::spawn(root.join(key.relative_path()))))
            .collect();
        Self { handles }
    }

    /// Polls every pending handle, returning the keys that became ready
    pub fn poll(&mut self) -> Vec<TextureKey> {
        let mut ready: Vec<TextureKey> = self
            .handles
            .iter_mut()
            .filter_map(|(key, handle)| {
                (handle.poll() && handle.status() == LoadStatus::Ready).then_some(*key)
            })
            .collect();
        ready.sort();
        ready
    }

    /// Blocks until every handle has settled
    pub fn wait_all(&mut self) {
        for handle in self.handles.values_mut() {
            handle.wait();
        }
    }

    pub fn status(&self, key: TextureKey) -> LoadStatus {
        self.handles
            .get(&key)
            .map_or(LoadStatus::Failed, TextureHandle::status)
    }

    pub fn image(&self, key: TextureKey) -> Option<&DecodedImage> {
        self.handles.get(&key).and_then(TextureHandle::image)
    }

    /// (ready, pending, failed) counts
    pub fn summary(&self) -> (usize, usize, usize) {
        self.handles
            .values()
            .fold((0, 0, 0), |(ready, pending, failed), handle| {
                match handle.status() {
                    LoadStatus::Ready => (ready + 1, pending, failed),
                    LoadStatus::Pending => (ready, pending + 1, failed),
                    LoadStatus::Failed => (ready, pending, failed + 1),
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "stagehand-{}-{}",
            name,
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn asset_paths_are_unique() {
        let mut paths: Vec<&str> = TextureKey::ALL.iter().map(|k| k.relative_path()).collect();
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), 7);
        assert_eq!(
            TextureKey::DoorAmbientOcclusion.relative_path(),
            "textures/door/ambientOcclusion.jpg"
        );
    }

    #[test]
    fn missing_file_resolves_to_failed() {
        let mut handle = TextureHandle::spawn(scratch_dir("missing").join("nope.png"));
        assert_eq!(handle.wait(), LoadStatus::Failed);
        assert!(handle.image().is_none());
        assert!(handle.error().is_some());
        // Settled handles report no further transitions
        assert!(!handle.poll());
    }

    #[test]
    fn valid_png_resolves_to_ready() {
        let path = scratch_dir("valid").join("tiny.png");
        image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();

        let mut handle = TextureHandle::spawn(path);
        assert_eq!(handle.wait(), LoadStatus::Ready);
        let decoded = handle.image().unwrap();
        assert_eq!((decoded.width, decoded.height), (3, 2));
        assert_eq!(decoded.rgba.len(), 3 * 2 * 4);
        assert_eq!(&decoded.rgba[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn oversized_image_is_scaled_to_the_limit() {
        let image = DecodedImage {
            width: 100,
            height: 50,
            rgba: vec![200; 100 * 50 * 4],
        };
        assert!(!image.fits_within(64));
        assert!(image.fits_within(100));

        let fitted = image.downscaled_to(64).unwrap();
        assert_eq!((fitted.width, fitted.height), (64, 32));
        assert_eq!(fitted.rgba.len(), 64 * 32 * 4);
        assert!(fitted.fits_within(64));
        assert_eq!(&fitted.rgba[..4], &[200, 200, 200, 200]);
    }

    #[test]
    fn mismatched_buffer_cannot_be_scaled() {
        let image = DecodedImage {
            width: 10,
            height: 10,
            rgba: vec![0; 12],
        };
        assert!(image.downscaled_to(4).is_none());
    }

    #[test]
    fn library_with_empty_root_fails_every_asset() {
        let mut library = TextureLibrary::load_all(scratch_dir("empty-root"));
        library.wait_all();
        assert_eq!(library.summary(), (0, 0, 7));
        assert!(library.poll().is_empty());
        assert_eq!(library.status(TextureKey::Matcap), LoadStatus::Failed);
    }
}
