use std::path::{Path, PathBuf};

use tracing::debug;

/// Result of trying to load one image asset.
///
/// A slot without a path, or whose file cannot be decoded, stays hidden.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetSlot {
    pub path: Option<PathBuf>,
    pub alt: String,
    pub visible: bool,
    pub dimensions: Option<(u32, u32)>,
}

impl AssetSlot {
    pub fn hidden(alt: impl Into<String>) -> Self {
        Self {
            path: None,
            alt: alt.into(),
            visible: false,
            dimensions: None,
        }
    }

    pub fn file_name(&self) -> Option<String> {
        self.path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|name| name.to_string_lossy().into_owned())
    }
}

/// Point a slot at `path` and read the image header.
pub fn load_slot(path: Option<PathBuf>, alt: &str) -> AssetSlot {
    let Some(path) = path else {
        return AssetSlot::hidden(alt);
    };
    match image::image_dimensions(&path) {
        Ok(dimensions) => AssetSlot {
            path: Some(path),
            alt: alt.to_string(),
            visible: true,
            dimensions: Some(dimensions),
        },
        Err(err) => {
            debug!(path = %path.display(), error = %err, "asset failed to load");
            AssetSlot {
                path: Some(path),
                alt: alt.to_string(),
                visible: false,
                dimensions: None,
            }
        }
    }
}

pub fn load_background(base: &Path, file: &str) -> AssetSlot {
    if file.trim().is_empty() {
        return AssetSlot::hidden("background");
    }
    load_slot(Some(base.join(file)), "background")
}
