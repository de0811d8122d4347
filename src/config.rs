//! User settings, kept as JSON in the platform config directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use eframe::egui::Color32;
use serde::{Deserialize, Serialize};

pub const MIN_FONT_SIZE: f32 = 6.0;
pub const MAX_FONT_SIZE: f32 = 60.0;
pub const DEFAULT_FONT_SIZE: f32 = 14.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// "Monospace", "Proportional" or the name of a loaded font file.
    pub font_family: String,
    pub font_size: f32,
    /// Extra TTF/OTF files registered at startup, keyed by file stem.
    pub font_files: Vec<PathBuf>,
    /// `None` uses the theme's text colour.
    pub text_color: Option<Color32>,
    pub line_number_color: Color32,
    pub show_line_numbers: bool,
    pub word_wrap: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            font_family: "Monospace".to_string(),
            font_size: DEFAULT_FONT_SIZE,
            font_files: Vec::new(),
            text_color: None,
            line_number_color: Color32::from_rgb(0, 255, 255),
            show_line_numbers: false,
            word_wrap: true,
        }
    }
}

impl Settings {
    /// Read settings from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No settings at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", path.display()));
            }
        };
        let mut settings: Self = serde_json::from_str(&text)
            .with_context(|| format!("parsing {}", path.display()))?;
        settings.font_size = clamp_font_size(settings.font_size);
        Ok(settings)
    }

    /// Like [`Settings::load`], but falls back to defaults on any error.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Failed to load settings: {:#}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        }
        let file = fs::File::create(path).with_context(|| format!("writing {}", path.display()))?;
        serde_json::to_writer_pretty(file, self)?;
        log::debug!("Saved settings to {}", path.display());
        Ok(())
    }
}

/// `<config_dir>/yunji/settings.json`, or the temp dir when the platform has
/// no config directory.
pub fn default_settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("yunji")
        .join("settings.json")
}

pub fn clamp_font_size(size: f32) -> f32 {
    if size.is_finite() {
        size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE)
    } else {
        DEFAULT_FONT_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(&dir.path().join("settings.json")).unwrap();
        assert_eq!(settings, Settings::default());
        assert!(settings.word_wrap);
        assert!(!settings.show_line_numbers);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings {
            font_size: 20.0,
            text_color: Some(Color32::from_rgb(10, 20, 30)),
            show_line_numbers: true,
            ..Settings::default()
        };
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), settings);
    }

    #[test]
    fn partial_file_fills_in_defaults_and_clamps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "font_size": 200.0, "word_wrap": false }"#).unwrap();
        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.font_size, MAX_FONT_SIZE);
        assert!(!settings.word_wrap);
        assert_eq!(settings.font_family, "Monospace");
    }

    #[test]
    fn corrupt_file_is_an_error_but_load_or_default_recovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(Settings::load(&path).is_err());
        assert_eq!(Settings::load_or_default(&path), Settings::default());
    }

    #[test]
    fn font_size_clamp() {
        assert_eq!(clamp_font_size(2.0), MIN_FONT_SIZE);
        assert_eq!(clamp_font_size(61.0), MAX_FONT_SIZE);
        assert_eq!(clamp_font_size(f32::NAN), DEFAULT_FONT_SIZE);
    }
}
