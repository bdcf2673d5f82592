use crate::generate::DEFAULT_MANIFEST;
use serde::Deserialize;

pub const DEFAULT_STORAGE_KEY: &str = "manifest-content";

/// Settings for a [`crate::studio::ManifestStudio`] session.
///
/// Every field is optional when deserializing; missing ones take the defaults.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StudioOptions {
    /// Key the manifest text is stored under.
    pub storage_key: String,
    /// Text used on first launch, on reset, and whenever the stored text is empty.
    pub template: String,
}

impl Default for StudioOptions {
    fn default() -> Self {
        StudioOptions {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            template: DEFAULT_MANIFEST.to_string(),
        }
    }
}

impl StudioOptions {
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }
}
