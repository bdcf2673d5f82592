use once_cell::sync::Lazy;
use serde::Serialize;
use std::fmt;

/// Android protection level attached to a platform permission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtectionLevel {
    Normal,
    Dangerous,
}

impl ProtectionLevel {
    pub fn to_str(&self) -> &'static str {
        match self {
            ProtectionLevel::Normal => "normal",
            ProtectionLevel::Dangerous => "dangerous",
        }
    }
}

impl fmt::Display for ProtectionLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

/// One record of the reference permission catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PermissionEntry {
    pub name: &'static str,
    pub category: &'static str,
    pub description: &'static str,
    pub protection_level: ProtectionLevel,
}

const fn entry(
    name: &'static str,
    category: &'static str,
    description: &'static str,
    protection_level: ProtectionLevel,
) -> PermissionEntry {
    PermissionEntry {
        name,
        category,
        description,
        protection_level,
    }
}

use ProtectionLevel::{Dangerous, Normal};

pub static PERMISSIONS: &[PermissionEntry] = &[
    entry("android.permission.INTERNET", "Network", "Allows applications to open network sockets", Normal),
    entry("android.permission.ACCESS_NETWORK_STATE", "Network", "Allows applications to access information about networks", Normal),
    entry("android.permission.ACCESS_WIFI_STATE", "Network", "Allows applications to access information about Wi-Fi networks", Normal),
    entry("android.permission.CAMERA", "Hardware", "Required to access the camera device", Dangerous),
    entry("android.permission.READ_EXTERNAL_STORAGE", "Storage", "Allows an application to read from external storage", Dangerous),
    entry("android.permission.WRITE_EXTERNAL_STORAGE", "Storage", "Allows an application to write to external storage", Dangerous),
    entry("android.permission.ACCESS_FINE_LOCATION", "Location", "Allows an app to access precise location", Dangerous),
    entry("android.permission.ACCESS_COARSE_LOCATION", "Location", "Allows an app to access approximate location", Dangerous),
    entry("android.permission.RECORD_AUDIO", "Hardware", "Allows an application to record audio", Dangerous),
    entry("android.permission.READ_CONTACTS", "Contacts", "Allows an application to read the user's contacts data", Dangerous),
    entry("android.permission.WRITE_CONTACTS", "Contacts", "Allows an application to write the user's contacts data", Dangerous),
    entry("android.permission.SEND_SMS", "SMS", "Allows an application to send SMS messages", Dangerous),
    entry("android.permission.RECEIVE_SMS", "SMS", "Allows an application to receive SMS messages", Dangerous),
    entry("android.permission.READ_PHONE_STATE", "Phone", "Allows read only access to phone state", Dangerous),
    entry("android.permission.CALL_PHONE", "Phone", "Allows an application to initiate a phone call", Dangerous),
    entry("android.permission.BLUETOOTH", "Hardware", "Allows applications to connect to paired bluetooth devices", Normal),
    entry("android.permission.BLUETOOTH_ADMIN", "Hardware", "Allows applications to discover and pair bluetooth devices", Normal),
    entry("android.permission.VIBRATE", "Hardware", "Allows access to the vibrator", Normal),
    entry("android.permission.WAKE_LOCK", "System", "Allows using PowerManager WakeLocks to keep processor from sleeping", Normal),
    entry("android.permission.FOREGROUND_SERVICE", "System", "Allows a regular application to use Service.startForeground", Normal),
];

static CATEGORIES: Lazy<Vec<&'static str>> = Lazy::new(|| {
    let mut seen = Vec::new();
    for permission in PERMISSIONS {
        if !seen.contains(&permission.category) {
            seen.push(permission.category);
        }
    }
    seen
});

/// Distinct categories in the order they first appear in the catalog.
pub fn categories() -> &'static [&'static str] {
    &CATEGORIES
}

/// Case-insensitive substring search over name, description and category.
pub fn search(query: &str) -> Vec<&'static PermissionEntry> {
    let needle = query.to_lowercase();
    PERMISSIONS
        .iter()
        .filter(|p| {
            p.name.to_lowercase().contains(&needle)
                || p.description.to_lowercase().contains(&needle)
                || p.category.to_lowercase().contains(&needle)
        })
        .collect()
}

pub fn lookup(name: &str) -> Option<&'static PermissionEntry> {
    PERMISSIONS.iter().find(|p| p.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_keep_first_appearance_order() {
        assert_eq!(
            categories(),
            &["Network", "Hardware", "Storage", "Location", "Contacts", "SMS", "Phone", "System"]
        );
    }

    #[test]
    fn search_matches_any_field_ignoring_case() {
        let by_category: Vec<_> = search("sms").iter().map(|p| p.name).collect();
        assert_eq!(
            by_category,
            vec!["android.permission.SEND_SMS", "android.permission.RECEIVE_SMS"]
        );

        let by_description = search("VIBRATOR");
        assert_eq!(by_description.len(), 1);
        assert_eq!(by_description[0].name, "android.permission.VIBRATE");

        assert_eq!(search("").len(), PERMISSIONS.len());
        assert!(search("no such permission").is_empty());
    }

    #[test]
    fn lookup_reports_protection_level() {
        let camera = lookup("android.permission.CAMERA").expect("camera entry");
        assert_eq!(camera.protection_level, ProtectionLevel::Dangerous);
        assert_eq!(camera.protection_level.to_string(), "dangerous");
        assert_eq!(
            lookup("android.permission.INTERNET").map(|p| p.protection_level),
            Some(ProtectionLevel::Normal)
        );
        assert!(lookup("android.permission.internet").is_none());
    }
}
