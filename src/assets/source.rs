use super::AssetError;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_SOURCE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one user selection. Picking the same file twice yields two ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(u64);

impl SourceId {
    fn next() -> Self {
        Self(NEXT_SOURCE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum ImageOrigin {
    File(PathBuf),
    /// In-memory bytes, used to feed the resolver without touching disk.
    #[cfg(test)]
    Memory { label: String, bytes: Arc<[u8]> },
}

/// User-supplied image, treated as opaque until the resolver decodes it.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSource {
    id: SourceId,
    origin: ImageOrigin,
}

impl ImageSource {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            id: SourceId::next(),
            origin: ImageOrigin::File(path.into()),
        }
    }

    #[cfg(test)]
    pub fn from_bytes(label: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            id: SourceId::next(),
            origin: ImageOrigin::Memory {
                label: label.into(),
                bytes: bytes.into(),
            },
        }
    }

    pub fn id(&self) -> SourceId {
        self.id
    }

    pub fn display_name(&self) -> String {
        match &self.origin {
            ImageOrigin::File(path) => path
                .file_name()
                .and_then(|value| value.to_str())
                .unwrap_or("image")
                .to_string(),
            #[cfg(test)]
            ImageOrigin::Memory { label, .. } => label.clone(),
        }
    }

    pub fn read_bytes(&self) -> Result<Arc<[u8]>, AssetError> {
        match &self.origin {
            ImageOrigin::File(path) => read_file(path),
            #[cfg(test)]
            ImageOrigin::Memory { bytes, .. } => Ok(Arc::clone(bytes)),
        }
    }
}

fn read_file(path: &Path) -> Result<Arc<[u8]>, AssetError> {
    std::fs::read(path)
        .map(Arc::from)
        .map_err(|source| AssetError::Read {
            path: path.display().to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::ImageSource;
    use crate::assets::AssetError;

    #[test]
    fn every_selection_gets_a_fresh_id() {
        let a = ImageSource::from_path("same.png");
        let b = ImageSource::from_path("same.png");
        assert_ne!(a.id(), b.id());
        assert_eq!(a.display_name(), "same.png");
    }

    #[test]
    fn missing_file_reports_read_error() {
        let mut path = std::env::temp_dir();
        path.push(format!("orbviz_missing_{}.png", std::process::id()));
        let source = ImageSource::from_path(&path);
        assert!(matches!(source.read_bytes(), Err(AssetError::Read { .. })));
    }

    #[test]
    fn memory_bytes_are_shared_not_copied() {
        let source = ImageSource::from_bytes("mem", vec![9u8, 8, 7]);
        let first = source.read_bytes().unwrap();
        let second = source.read_bytes().unwrap();
        assert!(std::sync::Arc::ptr_eq(&first, &second));
    }
}
