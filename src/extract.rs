//! Pulls builder fields out of manifest text.
//!
//! Extraction is tolerant: as long as the text parses and has a `manifest`
//! element, whatever is present is returned even if validation would fail.

use crate::android::xml::{XmlDocument, XmlElement};
use crate::types::{ActivityInfo, ManifestFields, ManifestInfo, DEFAULT_APP_LABEL};
use log::debug;

pub const MAIN_ACTION: &str = "android.intent.action.MAIN";
pub const LAUNCHER_CATEGORY: &str = "android.intent.category.LAUNCHER";

fn android_name(element: &XmlElement) -> Option<&str> {
    element
        .attribute("android:name")
        .filter(|name| !name.is_empty())
}

fn declares(filter: &XmlElement, tag: &str, name: &str) -> bool {
    filter
        .children
        .iter()
        .any(|child| child.tag == tag && child.attribute("android:name") == Some(name))
}

fn is_launcher(activity: &XmlElement) -> bool {
    activity
        .children
        .iter()
        .filter(|child| child.tag == "intent-filter")
        .any(|filter| {
            declares(filter, "action", MAIN_ACTION)
                && declares(filter, "category", LAUNCHER_CATEGORY)
        })
}

fn activity_info(activity: &XmlElement) -> ActivityInfo {
    ActivityInfo {
        name: android_name(activity).map(str::to_string),
        exported: activity
            .attribute("android:exported")
            .and_then(|value| match value.trim() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            }),
        launcher: is_launcher(activity),
    }
}

/// Extract builder state from manifest text.
///
/// Returns `None` when the text does not parse or has no `manifest` element.
pub fn extract(text: &str) -> Option<ManifestInfo> {
    let document = match XmlDocument::from_string(text) {
        Ok(document) => document,
        Err(err) => {
            debug!("skipping extraction, manifest text does not parse: {err}");
            return None;
        }
    };
    let manifest = document.find_first("manifest")?;

    let application = document.find_first("application");
    let application_label = application
        .and_then(|app| app.attribute("android:label"))
        .unwrap_or(DEFAULT_APP_LABEL)
        .to_string();

    let permissions = document
        .find_all("uses-permission")
        .into_iter()
        .filter_map(android_name)
        .map(str::to_string)
        .collect();

    let activity_details: Vec<ActivityInfo> = document
        .find_all("activity")
        .into_iter()
        .map(activity_info)
        .collect();
    let activities = activity_details
        .iter()
        .filter_map(|activity| activity.name.clone())
        .collect();

    Some(ManifestInfo {
        fields: ManifestFields {
            package_name: manifest.attribute("package").unwrap_or_default().to_string(),
            application_label,
            activities,
            permissions,
        },
        has_application: application.is_some(),
        activity_details,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unparseable_or_rootless_text_yields_none() {
        assert!(extract("").is_none());
        assert!(extract("<manifest>").is_none());
        assert!(extract("<application/>").is_none());
    }

    #[test]
    fn tolerates_invalid_manifest() {
        let info = extract("<manifest><activity/></manifest>").expect("partial info");
        assert_eq!(info.fields.package_name, "");
        assert_eq!(info.fields.application_label, DEFAULT_APP_LABEL);
        assert!(info.fields.activities.is_empty());
        assert!(!info.has_application);
        assert_eq!(info.activity_details.len(), 1);
        assert_eq!(info.activity_details[0].name, None);
    }

    #[test]
    fn collects_names_in_document_order() {
        let text = r#"<manifest xmlns:android="http://schemas.android.com/apk/res/android" package="com.x.y">
    <uses-permission android:name="android.permission.CAMERA" />
    <uses-permission />
    <uses-permission android:name="" />
    <uses-permission android:name="android.permission.CAMERA" />
    <application android:label="Shop">
        <activity android:name=".B" />
        <activity android:name=".A" android:exported="false" />
        <activity />
    </application>
    <uses-permission android:name="android.permission.INTERNET" />
</manifest>"#;
        let info = extract(text).expect("info");
        assert_eq!(info.fields.package_name, "com.x.y");
        assert_eq!(info.fields.application_label, "Shop");
        assert_eq!(
            info.fields.permissions,
            vec![
                "android.permission.CAMERA",
                "android.permission.CAMERA",
                "android.permission.INTERNET"
            ]
        );
        assert_eq!(info.fields.activities, vec![".B", ".A"]);
        assert!(info.has_application);
        assert_eq!(info.activity_details.len(), 3);
        assert_eq!(info.activity_details[0].exported, None);
        assert_eq!(info.activity_details[1].exported, Some(false));
    }

    #[test]
    fn detects_launcher_intent_filter() {
        let text = r#"<manifest package="com.x.y"><application>
    <activity android:name=".Main">
        <intent-filter>
            <action android:name="android.intent.action.MAIN" />
            <category android:name="android.intent.category.LAUNCHER" />
        </intent-filter>
    </activity>
    <activity android:name=".ViewOnly">
        <intent-filter>
            <action android:name="android.intent.action.VIEW" />
            <category android:name="android.intent.category.LAUNCHER" />
        </intent-filter>
    </activity>
</application></manifest>"#;
        let info = extract(text).expect("info");
        let launchers: Vec<_> = info.activity_details.iter().map(|a| a.launcher).collect();
        assert_eq!(launchers, vec![true, false]);
    }

    #[test]
    fn launcher_need_not_be_first_activity() {
        let text = r#"<manifest package="com.x.y"><application>
    <activity android:name=".Settings" />
    <activity android:name=".Home">
        <intent-filter>
            <action android:name="android.intent.action.MAIN" />
            <category android:name="android.intent.category.LAUNCHER" />
        </intent-filter>
    </activity>
</application></manifest>"#;
        let info = extract(text).expect("info");
        assert_eq!(info.fields.activities, vec![".Settings", ".Home"]);
        assert!(!info.activity_details[0].launcher);
        assert!(info.activity_details[1].launcher);
    }
}
