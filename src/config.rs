use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::keymap::Keymap;
use crate::model::{Anchor, Color4, Point, TextStyle, MAX_ROTATION, MIN_ROTATION};

pub const CONFIG_FILE_NAME: &str = "text-layer.toml";

const MAX_ROTATION_STEP: i32 = 360;

/// Tunables of the text layer. Every field has a default, so a config file
/// only needs the values it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerConfig {
    pub initial_color: Color4,
    pub initial_font_size: u32,
    pub min_font_size: u32,
    pub max_font_size: u32,
    pub initial_rotation: i32,
    pub initial_anchor: Anchor,
    /// Smallest extent of a drawn shape along columns, in data units.
    pub min_shape_width: f32,
    /// Smallest extent of a drawn shape along rows, in data units.
    pub min_shape_height: f32,
    /// Where "add next" puts the first shape.
    pub default_origin: Point,
    pub rotation_step: i32,
    /// Hit distance for lines, in screen points.
    pub line_hit_tolerance: f32,
    pub text_box_width: f32,
    pub text_box_font_size: f32,
    pub autosave: bool,
    /// `command name → key string` overrides, e.g. `edit_selected = "F2"`.
    pub keys: BTreeMap<String, String>,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            initial_color: Color4::WHITE,
            initial_font_size: 6,
            min_font_size: 2,
            max_font_size: 48,
            initial_rotation: 0,
            initial_anchor: Anchor::Center,
            min_shape_width: 16.0,
            min_shape_height: 16.0,
            default_origin: Point::new(0.0, 0.0),
            rotation_step: 5,
            line_hit_tolerance: 6.0,
            text_box_width: 140.0,
            text_box_font_size: 20.0,
            autosave: true,
            keys: BTreeMap::new(),
        }
    }
}

impl LayerConfig {
    /// `<platform config dir>/text-layer/text-layer.toml`
    pub fn default_path() -> Option<PathBuf> {
        let dirs = ProjectDirs::from("org", "text-layer", "text-layer")?;
        Some(dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Loads `path`, or the default location when `None`. A missing file at
    /// the default location yields the defaults; an explicit path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match Self::default_path() {
                Some(p) => (p, false),
                None => return Ok(Self::default()),
            },
        };
        if !required && !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config = Self::from_toml_str(&raw)?;
        tracing::info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_font_size == 0 || self.min_font_size > self.max_font_size {
            return Err(ConfigError::Invalid {
                field: "min_font_size",
                reason: format!(
                    "need 0 < min_font_size <= max_font_size, got {}..{}",
                    self.min_font_size, self.max_font_size
                ),
            });
        }
        if !(self.min_font_size..=self.max_font_size).contains(&self.initial_font_size) {
            return Err(ConfigError::Invalid {
                field: "initial_font_size",
                reason: format!(
                    "{} is outside {}..={}",
                    self.initial_font_size, self.min_font_size, self.max_font_size
                ),
            });
        }
        if !(MIN_ROTATION..=MAX_ROTATION).contains(&self.initial_rotation) {
            return Err(ConfigError::Invalid {
                field: "initial_rotation",
                reason: format!("{} is outside -180..=180", self.initial_rotation),
            });
        }
        for (field, value) in [
            ("min_shape_width", self.min_shape_width),
            ("min_shape_height", self.min_shape_height),
            ("text_box_width", self.text_box_width),
            ("text_box_font_size", self.text_box_font_size),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be positive, got {value}"),
                });
            }
        }
        if !(self.line_hit_tolerance.is_finite() && self.line_hit_tolerance >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "line_hit_tolerance",
                reason: format!("must be finite and not negative, got {}", self.line_hit_tolerance),
            });
        }
        if !(self.default_origin.row.is_finite() && self.default_origin.col.is_finite()) {
            return Err(ConfigError::Invalid {
                field: "default_origin",
                reason: format!(
                    "must be finite, got ({}, {})",
                    self.default_origin.row, self.default_origin.col
                ),
            });
        }
        if !(1..=MAX_ROTATION_STEP).contains(&self.rotation_step) {
            return Err(ConfigError::Invalid {
                field: "rotation_step",
                reason: format!("{} is outside 1..={MAX_ROTATION_STEP}", self.rotation_step),
            });
        }
        self.keymap()?;
        Ok(())
    }

    pub fn initial_style(&self) -> TextStyle {
        TextStyle {
            color: self.initial_color,
            size: self.initial_font_size,
            rotation: self.initial_rotation,
            anchor: self.initial_anchor,
        }
    }

    pub fn keymap(&self) -> Result<Keymap, ConfigError> {
        Keymap::with_overrides(&self.keys)
    }
}
