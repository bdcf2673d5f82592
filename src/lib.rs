//! # Manifest Studio
//!
//! A library for editing Android `AndroidManifest.xml` text: validation,
//! extraction of builder fields, regeneration from those fields, and a
//! targeted permission splice that leaves the rest of the text alone.
//!
use crate::types::{ManifestFields, ValidationVerdict};

pub mod android;
pub mod config;
pub mod extract;
pub mod generate;
pub mod insert;
pub mod studio;
#[cfg(test)]
mod tests;
pub mod types;
pub mod validate;

pub use crate::extract::extract;
pub use crate::generate::{generate, DEFAULT_MANIFEST};
pub use crate::insert::{insert_permission, InsertStatus, PermissionInsertion};
pub use crate::validate::validate;

/// Validates `text` and, when it is extractable, returns its builder fields as well.
///
/// # Examples
///
/// ```
///  use manifest_studio::{check_manifest, DEFAULT_MANIFEST};
///
///  let (verdict, fields) = check_manifest(DEFAULT_MANIFEST);
///  assert!(verdict.is_valid);
///  assert_eq!(fields.unwrap().package_name, "com.example.myapp");
/// ```
pub fn check_manifest(text: &str) -> (ValidationVerdict, Option<ManifestFields>) {
    let verdict = validate(text);
    let fields = extract(text).map(|info| info.fields);
    (verdict, fields)
}
