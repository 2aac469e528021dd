//! JSON sidecar holding a text layer next to the image it annotates.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::layer::TextLayer;
use crate::model::{Shape, TextStyle};

pub const FORMAT_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerFile {
    pub version: u32,
    pub style: TextStyle,
    pub shapes: Vec<Shape>,
}

impl LayerFile {
    pub fn from_layer(layer: &TextLayer) -> Self {
        Self {
            version: FORMAT_VERSION,
            style: *layer.style(),
            shapes: layer.shapes().to_vec(),
        }
    }

    pub fn into_layer(self) -> TextLayer {
        TextLayer::with_shapes(self.style, self.shapes)
    }
}

/// `cells.png` → `cells.png.textlayer.json`
pub fn sidecar_path(image_path: &Path) -> PathBuf {
    image_path.with_extension(format!(
        "{}.textlayer.json",
        image_path
            .extension()
            .unwrap_or_default()
            .to_str()
            .unwrap_or("")
    ))
}

/// Reads the sidecar of `image_path`. No sidecar is not an error.
pub fn load(image_path: &Path) -> Result<Option<LayerFile>, StoreError> {
    let path = sidecar_path(image_path);
    if !path.exists() {
        return Ok(None);
    }
    let data = std::fs::read_to_string(&path).map_err(|source| StoreError::Io {
        path: path.clone(),
        source,
    })?;
    let file: LayerFile = serde_json::from_str(&data)?;
    if file.version > FORMAT_VERSION {
        return Err(StoreError::UnsupportedVersion {
            found: file.version,
            supported: FORMAT_VERSION,
        });
    }
    tracing::info!(path = %path.display(), shapes = file.shapes.len(), "loaded text layer");
    Ok(Some(file))
}

pub fn save(image_path: &Path, layer: &TextLayer) -> Result<PathBuf, StoreError> {
    let path = sidecar_path(image_path);
    let data = serde_json::to_string_pretty(&LayerFile::from_layer(layer))?;
    std::fs::write(&path, data).map_err(|source| StoreError::Io {
        path: path.clone(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "saved text layer");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Anchor, Color4, Point, ShapeKind};

    #[test]
    fn sidecar_keeps_image_extension() {
        assert_eq!(
            sidecar_path(Path::new("/data/cells.tif")),
            PathBuf::from("/data/cells.tif.textlayer.json")
        );
    }

    #[test]
    fn missing_sidecar_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(&dir.path().join("img.png")).unwrap().is_none());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("img.png");
        let style = TextStyle {
            color: Color4::from_array([1.0, 0.5, 0.0, 1.0]),
            size: 12,
            rotation: -45,
            anchor: Anchor::LowerRight,
        };
        let mut labeled = Shape::from_corners(ShapeKind::Ellipse, Point::new(1.0, 2.0), Point::new(30.0, 40.0));
        labeled.label = "nucleus".into();
        labeled.style = Some(TextStyle { size: 20, ..style });
        let layer = TextLayer::with_shapes(
            style,
            vec![labeled, Shape::rectangle(Point::new(5.0, 5.0), 16.0, 16.0)],
        );

        let written = save(&image, &layer).unwrap();
        assert!(written.ends_with("img.png.textlayer.json"));

        let file = load(&image).unwrap().unwrap();
        assert_eq!(file, LayerFile::from_layer(&layer));
        let restored = file.into_layer();
        assert_eq!(restored.shapes(), layer.shapes());
        assert_eq!(restored.style(), layer.style());
    }

    #[test]
    fn newer_version_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("img.png");
        let mut file = LayerFile::from_layer(&TextLayer::new(crate::config::LayerConfig::default().initial_style()));
        file.version = FORMAT_VERSION + 1;
        std::fs::write(sidecar_path(&image), serde_json::to_string(&file).unwrap()).unwrap();
        assert!(matches!(load(&image), Err(StoreError::UnsupportedVersion { .. })));
    }

    #[test]
    fn garbage_is_a_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("img.png");
        std::fs::write(sidecar_path(&image), "{ not json").unwrap();
        assert!(matches!(load(&image), Err(StoreError::Json(_))));
    }
}
