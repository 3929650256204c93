use std::collections::HashMap;

use crate::error::AppError;

/// Flat key to label catalog used for context labels in the lookups.
#[derive(Debug, Clone, Default)]
pub struct Translations {
    labels: HashMap<String, String>,
}

impl Translations {
    pub fn from_map(labels: HashMap<String, String>) -> Self {
        Self { labels }
    }

    /// Loads a JSON object of `"KEY": "Label"` pairs. No path means an empty
    /// catalog.
    pub fn load(path: Option<&str>) -> Result<Self, AppError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path).map_err(|err| {
            AppError::Internal(format!("failed to read translations {}: {}", path, err))
        })?;
        Self::parse(&raw)
            .map_err(|err| AppError::Internal(format!("invalid translations {}: {}", path, err)))
    }

    fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        let labels = serde_json::from_str::<HashMap<String, String>>(raw)?;
        Ok(Self { labels })
    }

    /// Unknown keys come back untouched.
    pub fn translate(&self, key: &str) -> String {
        self.labels
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }
}
