//! Editing session tying the text store, validator, extractor, generator and
//! permission splice together.
//!
//! The store owns the manifest text. The session keeps only derived state
//! (verdict, extracted info, builder fields) and recomputes all of it after
//! every accepted write.

use crate::config::StudioOptions;
use crate::extract::extract;
use crate::generate::generate;
use crate::insert::{insert_permission, InsertStatus};
use crate::types::{ManifestFields, ManifestInfo, ValidationVerdict};
use crate::validate::validate;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::fmt;

/// Key-value persistence for the manifest text.
pub trait ManifestStore {
    fn load(&self, key: &str) -> Option<String>;
    fn save(&mut self, key: &str, text: &str);
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    pub fn with_value(key: impl Into<String>, text: impl Into<String>) -> Self {
        let mut store = MemoryStore::new();
        store.values.insert(key.into(), text.into());
        store
    }
}

impl ManifestStore for MemoryStore {
    fn load(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn save(&mut self, key: &str, text: &str) {
        self.values.insert(key.to_string(), text.to_string());
    }
}

/// Advisory outcome of a user action, meant for a toast-style notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    PermissionAdded(String),
    PermissionAlreadyExists(String),
    ManifestNotFound(String),
    ManifestReset,
}

impl Notice {
    pub fn message(&self) -> &'static str {
        match self {
            Notice::PermissionAdded(_) => "Permission added to manifest",
            Notice::PermissionAlreadyExists(_) => "Permission already exists in manifest",
            Notice::ManifestNotFound(_) => "Could not find manifest element",
            Notice::ManifestReset => "Manifest reset to default template",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::ManifestNotFound(_))
    }

    fn log(self) -> Self {
        match &self {
            Notice::ManifestNotFound(permission) => warn!("{} ({permission})", self.message()),
            Notice::PermissionAdded(permission) | Notice::PermissionAlreadyExists(permission) => {
                info!("{} ({permission})", self.message())
            }
            Notice::ManifestReset => info!("{}", self.message()),
        }
        self
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

pub struct ManifestStudio<S: ManifestStore> {
    store: S,
    options: StudioOptions,
    verdict: ValidationVerdict,
    info: Option<ManifestInfo>,
    fields: ManifestFields,
}

impl<S: ManifestStore> ManifestStudio<S> {
    pub fn new(store: S, options: StudioOptions) -> Self {
        let mut studio = ManifestStudio {
            store,
            options,
            verdict: ValidationVerdict::from_diagnostics(Vec::new()),
            info: None,
            fields: ManifestFields::default(),
        };
        studio.refresh();
        studio
    }

    pub fn with_store(store: S) -> Self {
        ManifestStudio::new(store, StudioOptions::default())
    }

    /// Current manifest text. Missing or empty stored text reads as the template.
    pub fn text(&self) -> String {
        self.store
            .load(&self.options.storage_key)
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| self.options.template.clone())
    }

    pub fn verdict(&self) -> &ValidationVerdict {
        &self.verdict
    }

    /// Extraction result for the current text; `None` while it does not parse.
    pub fn info(&self) -> Option<&ManifestInfo> {
        self.info.as_ref()
    }

    /// Builder fields. These keep their last good values while the text does not parse.
    pub fn fields(&self) -> &ManifestFields {
        &self.fields
    }

    pub fn options(&self) -> &StudioOptions {
        &self.options
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Replace the text with a direct edit.
    pub fn edit_text(&mut self, text: &str) {
        self.commit(text);
    }

    pub fn reset(&mut self) -> Notice {
        let template = self.options.template.clone();
        self.commit(&template);
        Notice::ManifestReset.log()
    }

    /// Splice a `uses-permission` line into the current text, keeping the rest intact.
    pub fn add_permission(&mut self, permission: &str) -> Notice {
        let result = insert_permission(&self.text(), permission);
        let notice = match result.status {
            InsertStatus::Inserted => {
                self.commit(&result.text);
                Notice::PermissionAdded(permission.to_string())
            }
            InsertStatus::AlreadyExists => Notice::PermissionAlreadyExists(permission.to_string()),
            InsertStatus::ManifestNotFound => Notice::ManifestNotFound(permission.to_string()),
        };
        notice.log()
    }

    pub fn set_package_name(&mut self, package: &str) {
        self.fields.package_name = package.to_string();
        self.regenerate();
    }

    pub fn set_application_label(&mut self, label: &str) {
        self.fields.application_label = label.to_string();
        self.regenerate();
    }

    /// Append an activity. Blank names are ignored and return `false`.
    pub fn add_activity(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        self.fields.activities.push(name.to_string());
        self.regenerate();
        true
    }

    pub fn remove_activity(&mut self, index: usize) -> bool {
        if index >= self.fields.activities.len() {
            return false;
        }
        self.fields.activities.remove(index);
        self.regenerate();
        true
    }

    pub fn remove_permission(&mut self, index: usize) -> bool {
        if index >= self.fields.permissions.len() {
            return false;
        }
        self.fields.permissions.remove(index);
        self.regenerate();
        true
    }

    fn regenerate(&mut self) {
        let text = generate(&self.fields);
        self.commit(&text);
    }

    fn commit(&mut self, text: &str) {
        self.store.save(&self.options.storage_key, text);
        info!(
            "stored {} bytes of manifest text under {:?}",
            text.len(),
            self.options.storage_key
        );
        self.refresh();
    }

    fn refresh(&mut self) {
        let text = self.text();
        self.verdict = validate(&text);
        self.info = extract(&text);
        match &self.info {
            Some(info) => self.fields = info.fields.clone(),
            None => debug!("manifest text not extractable, keeping builder fields"),
        }
    }
}
