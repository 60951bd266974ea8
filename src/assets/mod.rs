mod source;

pub use source::{ImageSource, SourceId};

use image::imageops::FilterType;
use image::{Rgba, RgbaImage};
use sha2::{Digest, Sha256};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, OnceLock};
use std::thread::JoinHandle;

pub const DEFAULT_MAX_TEXTURE_DIMENSION: u32 = 4096;

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read image at {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image {name}: {source}")]
    ImageDecode {
        name: String,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to start texture decode worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),
    #[error("texture decode worker for {id} exited without a result: {reason}")]
    WorkerLost { id: SourceId, reason: String },
}

/// What a [`ResolvedTexture`] actually holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKind {
    /// Nothing selected.
    Placeholder,
    Loaded { source: SourceId },
    /// The selected image could not be read or decoded.
    Failed { source: SourceId },
}

/// Always-valid decoded image handle. Non-`Loaded` kinds carry the 1x1
/// transparent placeholder.
#[derive(Debug, Clone)]
pub struct ResolvedTexture {
    kind: TextureKind,
    image: Arc<RgbaImage>,
    fingerprint: Option<String>,
}

impl ResolvedTexture {
    pub fn placeholder() -> Self {
        Self {
            kind: TextureKind::Placeholder,
            image: placeholder_image(),
            fingerprint: None,
        }
    }

    fn failed(source: SourceId) -> Self {
        Self {
            kind: TextureKind::Failed { source },
            image: placeholder_image(),
            fingerprint: None,
        }
    }

    fn loaded(source: SourceId, decoded: DecodedImage) -> Self {
        Self {
            kind: TextureKind::Loaded { source },
            image: Arc::new(decoded.image),
            fingerprint: Some(decoded.fingerprint),
        }
    }

    pub fn kind(&self) -> TextureKind {
        self.kind
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Loaded image for `source`, if that is what this handle holds.
    pub fn loaded_for(&self, source: SourceId) -> bool {
        self.kind == TextureKind::Loaded { source }
    }

    pub fn fingerprint(&self) -> Option<&str> {
        self.fingerprint.as_deref()
    }
}

fn placeholder_image() -> Arc<RgbaImage> {
    static PLACEHOLDER: OnceLock<Arc<RgbaImage>> = OnceLock::new();
    Arc::clone(PLACEHOLDER.get_or_init(|| Arc::new(RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 0])))))
}

#[derive(Debug)]
pub enum TextureEvent {
    /// The resolver's current texture now holds this source's image.
    Loaded { source: SourceId },
    Failed {
        source: SourceId,
        error: AssetError,
    },
}

struct DecodedImage {
    image: RgbaImage,
    fingerprint: String,
}

struct DecodeOutcome {
    source: SourceId,
    result: Result<DecodedImage, AssetError>,
}

/// Turns the current `textureSource` into a GPU-ready image.
///
/// Decoding happens on a worker thread; results come back through a channel
/// drained by [`TextureResolver::poll`] on the render thread. Only the result
/// for the most recently requested source is accepted.
pub struct TextureResolver {
    current: ResolvedTexture,
    requested: Option<SourceId>,
    pending: bool,
    max_dimension: u32,
    worker: Option<JoinHandle<()>>,
    sender: Sender<DecodeOutcome>,
    receiver: Receiver<DecodeOutcome>,
}

impl TextureResolver {
    pub fn new(max_dimension: u32) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            current: ResolvedTexture::placeholder(),
            requested: None,
            pending: false,
            max_dimension: max_dimension.max(1),
            worker: None,
            sender,
            receiver,
        }
    }

    pub fn current(&self) -> &ResolvedTexture {
        &self.current
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn max_dimension(&self) -> u32 {
        self.max_dimension
    }

    /// Applies to decodes started after this call.
    pub fn set_max_dimension(&mut self, max_dimension: u32) {
        self.max_dimension = max_dimension.max(1);
    }

    /// Points the resolver at `source`. Re-requesting the same source is a
    /// no-op. The previous image stays bound until the new one resolves.
    pub fn resolve(&mut self, source: Option<&ImageSource>) -> Result<(), AssetError> {
        let Some(source) = source else {
            if self.requested.take().is_some() || self.current.kind != TextureKind::Placeholder {
                log::info!("Texture cleared");
            }
            self.pending = false;
            self.worker = None;
            self.current = ResolvedTexture::placeholder();
            return Ok(());
        };

        let id = source.id();
        if self.requested == Some(id) {
            return Ok(());
        }
        self.requested = Some(id);
        self.pending = true;

        let sender = self.sender.clone();
        let max_dimension = self.max_dimension;
        let job = source.clone();
        log::info!("Decoding texture '{}' ({})", job.display_name(), id);
        let spawned = std::thread::Builder::new()
            .name("texture-decode".to_string())
            .spawn(move || {
                let result = decode_source(&job, max_dimension);
                // Receiver gone means the viewer is shutting down.
                let _ = sender.send(DecodeOutcome {
                    source: job.id(),
                    result,
                });
            });

        match spawned {
            Ok(handle) => {
                // Older workers are detached; their results are dropped as stale.
                self.worker = Some(handle);
                Ok(())
            }
            Err(err) => {
                self.pending = false;
                self.worker = None;
                self.current = ResolvedTexture::failed(id);
                Err(AssetError::WorkerSpawn(err))
            }
        }
    }

    /// Drains finished decodes. Call once per frame.
    pub fn poll(&mut self) -> Vec<TextureEvent> {
        // Checked before draining: a worker sends before it finishes, so a
        // finished worker's result is already in the channel.
        let worker_done = self
            .worker
            .as_ref()
            .is_some_and(|handle| handle.is_finished());
        let mut events = Vec::new();
        loop {
            let outcome = match self.receiver.try_recv() {
                Ok(outcome) => outcome,
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            };
            if self.requested != Some(outcome.source) {
                log::debug!("Dropping stale texture decode for {}", outcome.source);
                continue;
            }
            self.pending = false;
            self.worker = None;
            match outcome.result {
                Ok(decoded) => {
                    let (width, height) = decoded.image.dimensions();
                    log::info!(
                        "Texture {} ready: {}x{} (sha256 {})",
                        outcome.source,
                        width,
                        height,
                        decoded.fingerprint
                    );
                    self.current = ResolvedTexture::loaded(outcome.source, decoded);
                    events.push(TextureEvent::Loaded {
                        source: outcome.source,
                    });
                }
                Err(error) => {
                    log::warn!("Texture {} failed: {}", outcome.source, error);
                    self.current = ResolvedTexture::failed(outcome.source);
                    events.push(TextureEvent::Failed {
                        source: outcome.source,
                        error,
                    });
                }
            }
        }

        if self.pending && worker_done {
            if let (Some(source), Some(handle)) = (self.requested, self.worker.take()) {
                let reason = match handle.join() {
                    Err(payload) => panic_message(payload.as_ref()),
                    Ok(()) => "no result sent".to_string(),
                };
                let error = AssetError::WorkerLost { id: source, reason };
                log::warn!("Texture {} failed: {}", source, error);
                self.pending = false;
                self.current = ResolvedTexture::failed(source);
                events.push(TextureEvent::Failed { source, error });
            }
        }
        events
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "worker panicked".to_string()
    }
}

fn decode_source(source: &ImageSource, max_dimension: u32) -> Result<DecodedImage, AssetError> {
    let bytes = source.read_bytes()?;
    let fingerprint = fingerprint(&bytes);
    let mut decoded =
        image::load_from_memory(&bytes).map_err(|source_err| AssetError::ImageDecode {
            name: source.display_name(),
            source: source_err,
        })?;
    if decoded.width() > max_dimension || decoded.height() > max_dimension {
        log::info!(
            "Downscaling texture {}x{} to fit {}",
            decoded.width(),
            decoded.height(),
            max_dimension
        );
        decoded = decoded.resize(max_dimension, max_dimension, FilterType::Triangle);
    }
    Ok(DecodedImage {
        image: decoded.to_rgba8(),
        fingerprint,
    })
}

fn fingerprint(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest[..8].iter().map(|byte| format!("{byte:02x}")).collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{
        AssetError, DecodeOutcome, DecodedImage, ImageSource, TextureEvent, TextureKind,
        TextureResolver,
    };
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;
    use std::time::{Duration, Instant};

    pub(crate) fn png_bytes(width: u32, height: u32, pixel: [u8; 4]) -> Vec<u8> {
        let image = RgbaImage::from_pixel(width, height, Rgba(pixel));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    pub(crate) fn poll_until_settled(resolver: &mut TextureResolver) -> Vec<TextureEvent> {
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut events = Vec::new();
        while resolver.is_pending() && Instant::now() < deadline {
            events.extend(resolver.poll());
            std::thread::sleep(Duration::from_millis(2));
        }
        events
    }

    #[test]
    fn starts_with_placeholder() {
        let resolver = TextureResolver::new(64);
        let current = resolver.current();
        assert_eq!(current.kind(), TextureKind::Placeholder);
        assert_eq!(current.image().dimensions(), (1, 1));
        assert_eq!(current.image().get_pixel(0, 0).0[3], 0);
    }

    #[test]
    fn decodes_valid_image_off_thread() {
        let mut resolver = TextureResolver::new(64);
        let source = ImageSource::from_bytes("red.png", png_bytes(4, 2, [255, 0, 0, 255]));
        resolver.resolve(Some(&source)).unwrap();
        assert!(resolver.is_pending());

        let events = poll_until_settled(&mut resolver);
        assert!(matches!(
            events.as_slice(),
            [TextureEvent::Loaded { source: loaded }] if *loaded == source.id()
        ));
        assert!(resolver.current().loaded_for(source.id()));
        assert_eq!(resolver.current().image().dimensions(), (4, 2));
        assert_eq!(resolver.current().fingerprint().map(str::len), Some(16));
    }

    #[test]
    fn corrupt_image_degrades_to_placeholder() {
        let mut resolver = TextureResolver::new(64);
        let source = ImageSource::from_bytes("junk.png", b"definitely not a png".to_vec());
        resolver.resolve(Some(&source)).unwrap();

        let events = poll_until_settled(&mut resolver);
        match events.as_slice() {
            [TextureEvent::Failed { source: failed, error }] => {
                assert_eq!(*failed, source.id());
                assert!(matches!(error, AssetError::ImageDecode { .. }));
            }
            other => panic!("expected one failure, got {other:?}"),
        }
        assert_eq!(
            resolver.current().kind(),
            TextureKind::Failed { source: source.id() }
        );
        assert_eq!(resolver.current().image().dimensions(), (1, 1));
    }

    #[test]
    fn oversized_images_are_downscaled() {
        let mut resolver = TextureResolver::new(8);
        let source = ImageSource::from_bytes("wide.png", png_bytes(32, 16, [0, 0, 255, 255]));
        resolver.resolve(Some(&source)).unwrap();
        poll_until_settled(&mut resolver);
        assert_eq!(resolver.current().image().dimensions(), (8, 4));
    }

    #[test]
    fn stale_results_never_overwrite_newer_request() {
        let mut resolver = TextureResolver::new(64);
        let old = ImageSource::from_bytes("old.png", vec![0u8]);
        let new = ImageSource::from_bytes("new.png", vec![1u8]);
        resolver.requested = Some(new.id());
        resolver.pending = true;

        resolver
            .sender
            .send(DecodeOutcome {
                source: old.id(),
                result: Ok(DecodedImage {
                    image: RgbaImage::new(2, 2),
                    fingerprint: "old".to_string(),
                }),
            })
            .unwrap();
        assert!(resolver.poll().is_empty());
        assert!(resolver.is_pending());
        assert_eq!(resolver.current().kind(), TextureKind::Placeholder);

        resolver
            .sender
            .send(DecodeOutcome {
                source: new.id(),
                result: Ok(DecodedImage {
                    image: RgbaImage::new(3, 3),
                    fingerprint: "new".to_string(),
                }),
            })
            .unwrap();
        assert_eq!(resolver.poll().len(), 1);
        assert!(resolver.current().loaded_for(new.id()));
    }

    #[test]
    fn clearing_releases_previous_image() {
        let mut resolver = TextureResolver::new(64);
        let source = ImageSource::from_bytes("green.png", png_bytes(2, 2, [0, 255, 0, 255]));
        resolver.resolve(Some(&source)).unwrap();
        poll_until_settled(&mut resolver);
        let held = std::sync::Arc::downgrade(&resolver.current().image);

        resolver.resolve(None).unwrap();
        assert_eq!(resolver.current().kind(), TextureKind::Placeholder);
        assert!(resolver.requested.is_none());
        assert!(held.upgrade().is_none());
    }

    #[test]
    fn clearing_while_pending_discards_late_result() {
        let mut resolver = TextureResolver::new(64);
        let source = ImageSource::from_bytes("late.png", png_bytes(2, 2, [1, 2, 3, 255]));
        resolver.resolve(Some(&source)).unwrap();
        resolver.resolve(None).unwrap();
        assert!(!resolver.is_pending());

        std::thread::sleep(Duration::from_millis(200));
        assert!(resolver.poll().is_empty());
        assert_eq!(resolver.current().kind(), TextureKind::Placeholder);
    }

    #[test]
    fn panicked_worker_reports_failure_instead_of_pending_forever() {
        let mut resolver = TextureResolver::new(64);
        let source = ImageSource::from_bytes("boom.png", vec![0u8]);
        resolver.requested = Some(source.id());
        resolver.pending = true;
        let handle = std::thread::spawn(|| panic!("decoder blew up"));
        let deadline = Instant::now() + Duration::from_secs(10);
        while !handle.is_finished() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(2));
        }
        resolver.worker = Some(handle);

        let events = resolver.poll();
        match events.as_slice() {
            [TextureEvent::Failed { source: failed, error: AssetError::WorkerLost { reason, .. } }] => {
                assert_eq!(*failed, source.id());
                assert_eq!(reason, "decoder blew up");
            }
            other => panic!("expected worker loss, got {other:?}"),
        }
        assert!(!resolver.is_pending());
        assert_eq!(
            resolver.current().kind(),
            TextureKind::Failed { source: source.id() }
        );
        assert!(resolver.poll().is_empty());
    }

    #[test]
    fn finished_worker_with_result_is_not_reported_lost() {
        let mut resolver = TextureResolver::new(64);
        let source = ImageSource::from_bytes("ok.png", png_bytes(1, 1, [4, 5, 6, 255]));
        resolver.resolve(Some(&source)).unwrap();
        let deadline = Instant::now() + Duration::from_secs(10);
        while resolver.worker.as_ref().is_some_and(|h| !h.is_finished()) && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(2));
        }
        let events = resolver.poll();
        assert!(matches!(events.as_slice(), [TextureEvent::Loaded { .. }]));
        assert!(resolver.current().loaded_for(source.id()));
    }

    #[test]
    fn same_source_is_not_decoded_twice() {
        let mut resolver = TextureResolver::new(64);
        let source = ImageSource::from_bytes("once.png", png_bytes(1, 1, [9, 9, 9, 255]));
        resolver.resolve(Some(&source)).unwrap();
        poll_until_settled(&mut resolver);
        resolver.resolve(Some(&source)).unwrap();
        assert!(!resolver.is_pending());
        assert!(resolver.current().loaded_for(source.id()));
    }
}
