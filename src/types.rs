/* Shared value types passed between the validator, extractor, generator and studio session */

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;

/// Default `android:label` used when a manifest does not declare one.
pub const DEFAULT_APP_LABEL: &str = "@string/app_name";

/* Custom error for the demo and embedding helpers */
#[derive(Debug)]
pub struct StudioError {
    pub details: String,
}

impl StudioError {
    pub fn new(msg: &str) -> StudioError {
        StudioError {
            details: msg.to_string(),
        }
    }
}

impl fmt::Display for StudioError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.details)
    }
}

impl Error for StudioError {}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn to_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

/// A single validation finding.
///
/// `line` and `column` are 1-based and only present when the finding can be
/// tied to a spot in the text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub message: String,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity: Severity::Error,
            line: None,
            column: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity: Severity::Warning,
            line: None,
            column: None,
        }
    }

    pub fn at(mut self, (line, column): (usize, usize)) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (self.line, self.column) {
            (Some(line), Some(column)) => {
                write!(f, "{}:{}: {}: {}", line, column, self.severity, self.message)
            }
            (Some(line), None) => write!(f, "{}: {}: {}", line, self.severity, self.message),
            _ => write!(f, "{}: {}", self.severity, self.message),
        }
    }
}

/// Outcome of validating a manifest text.
///
/// A verdict is valid only when it carries no diagnostics at all, so a lone
/// warning still makes it invalid.
/// Only serialized: build one through [`ValidationVerdict::from_diagnostics`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationVerdict {
    pub is_valid: bool,
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationVerdict {
    pub fn from_diagnostics(diagnostics: Vec<Diagnostic>) -> Self {
        ValidationVerdict {
            is_valid: diagnostics.is_empty(),
            diagnostics,
        }
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.len() - self.error_count()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Structured builder state for a manifest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestFields {
    pub package_name: String,
    pub application_label: String,
    /// Document order; the first entry is the launcher.
    pub activities: Vec<String>,
    pub permissions: Vec<String>,
}

impl Default for ManifestFields {
    fn default() -> Self {
        ManifestFields {
            package_name: String::new(),
            application_label: DEFAULT_APP_LABEL.to_string(),
            activities: Vec::new(),
            permissions: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityInfo {
    pub name: Option<String>,
    pub exported: Option<bool>,
    /// Carries a MAIN action / LAUNCHER category intent-filter.
    pub launcher: bool,
}

/// Everything pulled out of a manifest text by [`crate::extract::extract`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestInfo {
    pub fields: ManifestFields,
    pub has_application: bool,
    pub activity_details: Vec<ActivityInfo>,
}
