//! Line-oriented permission splice.
//!
//! Unlike [`crate::generate::generate`] this never re-renders the document, so
//! comments and any layout the builder fields cannot express are kept as-is.

use crate::generate::permission_line;
use log::warn;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsertStatus {
    Inserted,
    /// The permission string already occurs somewhere in the text.
    AlreadyExists,
    /// No line contains a `<manifest` opening tag.
    ManifestNotFound,
}

/// Result of [`insert_permission`]. `text` is the input unchanged unless
/// `status` is [`InsertStatus::Inserted`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PermissionInsertion {
    pub text: String,
    pub status: InsertStatus,
}

impl PermissionInsertion {
    pub fn inserted(&self) -> bool {
        self.status == InsertStatus::Inserted
    }
}

/// Insert a `uses-permission` line after the `<manifest` opening tag.
///
/// Lines starting with `package=` that follow the tag line, and then blank
/// lines, are skipped so the new line lands on the first content line.
pub fn insert_permission(text: &str, permission: &str) -> PermissionInsertion {
    if text.contains(permission) {
        return PermissionInsertion {
            text: text.to_string(),
            status: InsertStatus::AlreadyExists,
        };
    }

    let mut lines: Vec<&str> = text.split('\n').collect();
    let manifest_line = match lines.iter().position(|line| line.contains("<manifest")) {
        Some(idx) => idx,
        None => {
            warn!("cannot insert {permission}: no <manifest> opening tag found");
            return PermissionInsertion {
                text: text.to_string(),
                status: InsertStatus::ManifestNotFound,
            };
        }
    };

    let mut insert_at = manifest_line + 1;
    while insert_at < lines.len() && lines[insert_at].trim().starts_with("package=") {
        insert_at += 1;
    }
    while insert_at < lines.len() && lines[insert_at].trim().is_empty() {
        insert_at += 1;
    }

    let new_line = permission_line(permission);
    lines.insert(insert_at, &new_line);
    PermissionInsertion {
        text: lines.join("\n"),
        status: InsertStatus::Inserted,
    }
}
