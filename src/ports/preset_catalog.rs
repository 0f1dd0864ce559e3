//! Preset catalog port - static lookup of session templates.

use crate::domain::interview::SessionPreset;

/// Read-only preset lookup.
pub trait PresetCatalog: Send + Sync {
    /// Preset by slug.
    fn find(&self, slug: &str) -> Option<SessionPreset>;

    /// All presets in catalog order.
    fn list(&self) -> Vec<SessionPreset>;
}
