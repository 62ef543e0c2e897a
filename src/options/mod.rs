//! Centralized viewer options with TOML preset support.
//!
//! Camera framing, orbit controls, default lighting and model animation are
//! consolidated here. Every viewer built by one coordinator uses the same
//! options. Options serialize to/from TOML.

mod animation;
mod camera;
mod controls;
mod lighting;

use std::path::Path;

pub use animation::AnimationOptions;
pub use camera::CameraOptions;
pub use controls::ControlOptions;
pub use lighting::LightingOptions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::VitrineError;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[lighting]`) work correctly.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Initial camera framing and projection.
    pub camera: CameraOptions,
    /// Orbit controller parameters.
    pub controls: ControlOptions,
    /// Default lights and background.
    pub lighting: LightingOptions,
    /// Per-tick model animation.
    pub animation: AnimationOptions,
}

impl Options {
    /// Generate JSON Schema describing the tweakable options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Parse options from TOML text. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// Returns [`VitrineError::OptionsParse`] on malformed TOML.
    pub fn from_toml_str(content: &str) -> Result<Self, VitrineError> {
        toml::from_str(content)
            .map_err(|e| VitrineError::OptionsParse(e.to_string()))
    }

    /// Load options from a TOML file. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// Returns [`VitrineError`] on I/O or parse failure.
    pub fn load(path: &Path) -> Result<Self, VitrineError> {
        let content = std::fs::read_to_string(path).map_err(VitrineError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Save options to a TOML file (pretty-printed).
    ///
    /// # Errors
    ///
    /// Returns [`VitrineError`] on serialization or I/O failure.
    pub fn save(&self, path: &Path) -> Result<(), VitrineError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| VitrineError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(VitrineError::Io)?;
        }
        std::fs::write(path, content).map_err(VitrineError::Io)
    }

    /// List available preset names (TOML file stems) in a directory.
    #[must_use]
    pub fn list_presets(dir: &Path) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) =
                        path.file_stem().and_then(|s| s.to_str())
                    {
                        names.push(stem.to_owned());
                    }
                }
            }
        }
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = Options::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed: Options = toml::from_str(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r"
[animation]
spin_per_tick = 0.02
";
        let opts = Options::from_toml_str(toml_str).unwrap();
        assert_eq!(opts.animation.spin_per_tick, 0.02);
        assert_eq!(opts.controls.damping_factor, 0.05);
        assert_eq!(opts.camera.distance, 50.0);
        assert_eq!(opts.lighting.directional_position, [5.0, 10.0, 7.5]);
    }

    #[test]
    fn save_load_and_list_presets() {
        let dir = tempfile::tempdir().unwrap();
        let mut opts = Options::default();
        opts.lighting.ambient_intensity = 0.8;
        opts.save(&dir.path().join("presets/bright.toml")).unwrap();
        opts.save(&dir.path().join("presets/alt.toml")).unwrap();

        let loaded =
            Options::load(&dir.path().join("presets/bright.toml")).unwrap();
        assert_eq!(loaded, opts);
        assert_eq!(
            Options::list_presets(&dir.path().join("presets")),
            vec!["alt".to_owned(), "bright".to_owned()]
        );
    }

    #[test]
    fn schema_has_expected_properties() {
        let schema_value =
            serde_json::to_value(Options::json_schema()).unwrap();
        let props = schema_value["properties"].as_object().unwrap();

        assert!(props.contains_key("camera"));
        assert!(props.contains_key("controls"));
        assert!(props.contains_key("lighting"));
        assert!(props.contains_key("animation"));

        let lighting = &props["lighting"]["properties"];
        assert!(lighting.get("ambient_intensity").is_some());
        assert!(lighting.get("directional_position").is_none());
    }
}
