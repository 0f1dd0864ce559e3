//! YAML preset catalog.
//!
//! Presets are read once at startup from a file shaped like:
//!
//! ```yaml
//! presets:
//!   - slug: career
//!     title: Career values
//!     purpose: Understand what I want from work
//!     statements:
//!       - statement: My current role uses my strengths
//!         options: [yes, don't know, rarely, only partly, strengths changed]
//! ```

use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use tokio::fs;

use crate::domain::interview::SessionPreset;
use crate::ports::PresetCatalog;

/// Preset loading errors.
#[derive(Debug, thiserror::Error)]
pub enum PresetLoadError {
    #[error("failed to read presets file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse presets: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("preset '{slug}' is invalid: {reason}")]
    Invalid { slug: String, reason: String },

    #[error("duplicate preset slug '{0}'")]
    DuplicateSlug(String),
}

#[derive(Debug, Deserialize)]
struct PresetFile {
    #[serde(default)]
    presets: Vec<SessionPreset>,
}

/// In-process catalog of presets parsed from YAML.
#[derive(Debug, Clone, Default)]
pub struct YamlPresetCatalog {
    presets: Vec<SessionPreset>,
}

impl YamlPresetCatalog {
    /// A catalog with no presets.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Reads and validates a presets file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, PresetLoadError> {
        let yaml = fs::read_to_string(path.as_ref()).await?;
        Self::from_yaml(&yaml)
    }

    /// Parses and validates presets from a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, PresetLoadError> {
        let file: PresetFile = serde_yaml::from_str(yaml)?;

        let mut seen = HashSet::new();
        for preset in &file.presets {
            if preset.slug.trim().is_empty() {
                return Err(PresetLoadError::Invalid {
                    slug: preset.slug.clone(),
                    reason: "slug is empty".to_string(),
                });
            }
            if preset.purpose.trim().is_empty() {
                return Err(PresetLoadError::Invalid {
                    slug: preset.slug.clone(),
                    reason: "purpose is empty".to_string(),
                });
            }
            if preset.target_question_count == Some(0) {
                return Err(PresetLoadError::Invalid {
                    slug: preset.slug.clone(),
                    reason: "target_question_count must be positive".to_string(),
                });
            }
            preset.drafts().map_err(|e| PresetLoadError::Invalid {
                slug: preset.slug.clone(),
                reason: e.to_string(),
            })?;
            if !seen.insert(preset.slug.clone()) {
                return Err(PresetLoadError::DuplicateSlug(preset.slug.clone()));
            }
        }

        Ok(Self {
            presets: file.presets,
        })
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

impl PresetCatalog for YamlPresetCatalog {
    fn find(&self, slug: &str) -> Option<SessionPreset> {
        self.presets.iter().find(|p| p.slug == slug).cloned()
    }

    fn list(&self) -> Vec<SessionPreset> {
        self.presets.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
presets:
  - slug: career
    title: Career values
    purpose: Understand what I want from work
    report_instructions: Focus on next steps
    target_question_count: 30
    statements:
      - statement: My current role uses my strengths
        detail: Think about the last month
        options: ["yes", "don't know", "rarely", "only partly", "my strengths changed"]
  - slug: blank
    title: Free reflection
    purpose: Reflect on anything
"#;

    #[test]
    fn parses_presets_in_order() {
        let catalog = YamlPresetCatalog::from_yaml(SAMPLE).unwrap();
        assert_eq!(catalog.len(), 2);

        let career = catalog.find("career").unwrap();
        assert_eq!(career.target_question_count, Some(30));
        assert_eq!(career.statements.len(), 1);
        assert_eq!(career.statements[0].detail, "Think about the last month");

        let slugs: Vec<String> = catalog.list().into_iter().map(|p| p.slug).collect();
        assert_eq!(slugs, vec!["career", "blank"]);
    }

    #[test]
    fn unknown_slug_is_none() {
        let catalog = YamlPresetCatalog::from_yaml(SAMPLE).unwrap();
        assert!(catalog.find("missing").is_none());
        assert!(YamlPresetCatalog::empty().find("career").is_none());
    }

    #[test]
    fn rejects_statement_with_wrong_option_count() {
        let yaml = r#"
presets:
  - slug: bad
    title: Bad
    purpose: p
    statements:
      - statement: s
        options: ["yes", "no"]
"#;
        assert!(matches!(
            YamlPresetCatalog::from_yaml(yaml),
            Err(PresetLoadError::Invalid { .. })
        ));
    }

    #[test]
    fn rejects_duplicate_slugs() {
        let yaml = r#"
presets:
  - {slug: a, title: A, purpose: p}
  - {slug: a, title: B, purpose: q}
"#;
        assert!(matches!(
            YamlPresetCatalog::from_yaml(yaml),
            Err(PresetLoadError::DuplicateSlug(_))
        ));
    }

    #[tokio::test]
    async fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let catalog = YamlPresetCatalog::load(file.path()).await.unwrap();
        assert_eq!(catalog.len(), 2);
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = YamlPresetCatalog::load(dir.path().join("nope.yaml")).await;
        assert!(matches!(result, Err(PresetLoadError::Io(_))));
    }
}
