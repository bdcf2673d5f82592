use crate::android::xml::ANDROID_NAMESPACE_URI;
use crate::extract::{LAUNCHER_CATEGORY, MAIN_ACTION};
use crate::types::ManifestFields;

/// Starter manifest shown on first launch and after a reset.
pub const DEFAULT_MANIFEST: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<manifest xmlns:android="http://schemas.android.com/apk/res/android"
    package="com.example.myapp">

    <uses-permission android:name="android.permission.INTERNET" />

    <application
        android:allowBackup="true"
        android:icon="@mipmap/ic_launcher"
        android:label="@string/app_name"
        android:theme="@style/AppTheme">
        
        <activity
            android:name=".MainActivity"
            android:exported="true">
            <intent-filter>
                <action android:name="android.intent.action.MAIN" />
                <category android:name="android.intent.category.LAUNCHER" />
            </intent-filter>
        </activity>
        
    </application>

</manifest>"#;

const APPLICATION_INDENT: &str = "        ";

pub(crate) fn permission_line(name: &str) -> String {
    format!("    <uses-permission android:name=\"{}\" />", name)
}

fn write_activity(name: &str, launcher: bool) -> String {
    let mut out = format!("        <activity\n            android:name=\"{}\"\n", name);
    out.push_str(&format!("            android:exported=\"{}\">", launcher));
    if launcher {
        out.push_str("\n            <intent-filter>");
        out.push_str(&format!(
            "\n                <action android:name=\"{}\" />",
            MAIN_ACTION
        ));
        out.push_str(&format!(
            "\n                <category android:name=\"{}\" />",
            LAUNCHER_CATEGORY
        ));
        out.push_str("\n            </intent-filter>");
    }
    out.push_str("\n        </activity>");
    out
}

/// Render a complete manifest from builder fields.
///
/// Field values are written verbatim; XML special characters in them are not
/// escaped. The activity at index 0 becomes the exported launcher.
pub fn generate(fields: &ManifestFields) -> String {
    let mut out = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n".to_string();
    out.push_str(&format!("<manifest xmlns:android=\"{}\"\n", ANDROID_NAMESPACE_URI));
    out.push_str(&format!("    package=\"{}\">\n\n", fields.package_name));

    let permissions: Vec<String> = fields.permissions.iter().map(|p| permission_line(p)).collect();
    out.push_str(&permissions.join("\n"));
    out.push_str("\n\n");

    out.push_str("    <application\n");
    out.push_str("        android:allowBackup=\"true\"\n");
    out.push_str("        android:icon=\"@mipmap/ic_launcher\"\n");
    out.push_str(&format!("        android:label=\"{}\"\n", fields.application_label));
    out.push_str("        android:theme=\"@style/AppTheme\">\n");
    out.push_str(APPLICATION_INDENT);
    out.push('\n');

    let activities: Vec<String> = fields
        .activities
        .iter()
        .enumerate()
        .map(|(index, name)| write_activity(name, index == 0))
        .collect();
    out.push_str(&activities.join("\n\n"));
    out.push('\n');

    out.push_str(APPLICATION_INDENT);
    out.push_str("\n    </application>\n\n</manifest>");
    out
}
