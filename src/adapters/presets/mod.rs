//! Preset catalog adapters.

mod yaml_catalog;

pub use yaml_catalog::{PresetLoadError, YamlPresetCatalog};
