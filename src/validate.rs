//! Structural validation of `AndroidManifest.xml` text.
//!
//! [`validate`] never fails: XML parse errors and structural problems are all
//! reported as [`Diagnostic`]s inside the returned [`ValidationVerdict`].

use crate::android::xml::{line_column, XmlDocument, XmlElement, XmlError};
use crate::types::{Diagnostic, ValidationVerdict};
use log::debug;
use nom::bytes::complete::take_while;
use nom::character::complete::{char, satisfy};
use nom::combinator::{all_consuming, recognize};
use nom::multi::many1;
use nom::sequence::{pair, preceded};
use nom::IResult;

pub const EMPTY_MANIFEST: &str = "Manifest content is empty";
pub const PARSE_FAILED: &str = "Failed to parse XML";
pub const MISSING_MANIFEST: &str = "Root <manifest> element is required";
pub const MISSING_PACKAGE: &str = "manifest element requires \"package\" attribute";
pub const MISSING_APPLICATION: &str = "<application> element is required inside <manifest>";

fn package_segment(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c| c.is_ascii_lowercase()),
        take_while(|c: char| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'),
    ))(input)
}

fn package_segments(input: &str) -> IResult<&str, Vec<&str>> {
    let (input, first) = package_segment(input)?;
    let (input, rest) = many1(preceded(char('.'), package_segment))(input)?;
    let mut segments = vec![first];
    segments.extend(rest);
    Ok((input, segments))
}

/// Java-style package name: at least two dot-separated `[a-z][a-z0-9_]*` segments.
pub fn is_valid_package_name(name: &str) -> bool {
    all_consuming(package_segments)(name).is_ok()
}

fn position_of(text: &str, element: &XmlElement) -> (usize, usize) {
    line_column(text, element.offset)
}

fn parse_failure(text: &str, err: &XmlError) -> Diagnostic {
    let message = if err.message().trim().is_empty() {
        PARSE_FAILED.to_string()
    } else {
        err.to_string()
    };
    let diagnostic = Diagnostic::error(message);
    match err.offset() {
        Some(offset) => diagnostic.at(line_column(text, offset)),
        None => diagnostic,
    }
}

/// Validate manifest text, collecting diagnostics in evaluation order.
pub fn validate(text: &str) -> ValidationVerdict {
    if text.trim().is_empty() {
        return ValidationVerdict::from_diagnostics(vec![Diagnostic::error(EMPTY_MANIFEST)]);
    }

    let document = match XmlDocument::from_string(text) {
        Ok(document) => document,
        Err(err) => {
            debug!("manifest text failed to parse: {err}");
            return ValidationVerdict::from_diagnostics(vec![parse_failure(text, &err)]);
        }
    };

    let manifest = match document.find_first("manifest") {
        Some(manifest) => manifest,
        None => {
            return ValidationVerdict::from_diagnostics(vec![Diagnostic::error(MISSING_MANIFEST)])
        }
    };

    let mut diagnostics = Vec::new();

    match manifest.attribute("package") {
        None => {
            diagnostics.push(Diagnostic::error(MISSING_PACKAGE).at(position_of(text, manifest)));
        }
        // An empty package attribute only counts as present for the check above.
        Some(package) if !package.is_empty() && !is_valid_package_name(package) => {
            diagnostics.push(
                Diagnostic::warning(format!(
                    "Invalid package name: \"{package}\". Must follow Java package naming conventions"
                ))
                .at(position_of(text, manifest)),
            );
        }
        Some(_) => {}
    }

    if document.find_first("application").is_none() {
        diagnostics.push(Diagnostic::error(MISSING_APPLICATION));
    }

    for (index, activity) in document.find_all("activity").into_iter().enumerate() {
        if !activity.has_attribute("android:name") {
            diagnostics.push(
                Diagnostic::error(format!(
                    "Activity at position {} is missing \"android:name\" attribute",
                    index + 1
                ))
                .at(position_of(text, activity)),
            );
        }
    }

    ValidationVerdict::from_diagnostics(diagnostics)
}
