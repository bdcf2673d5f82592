use quick_xml::events::{attributes::AttrError, BytesStart, Event};
use nom::bytes::complete::take_while;
use nom::character::complete::satisfy;
use nom::combinator::{all_consuming, recognize};
use nom::sequence::pair;
use nom::IResult;
use quick_xml::{Error as QuickXmlError, Reader};
use std::str;

pub const ANDROID_NAMESPACE_URI: &str = "http://schemas.android.com/apk/res/android";

/// Result alias for text XML operations.
pub type XmlResult<T> = Result<T, XmlError>;

/// Errors surfaced while reading manifest text into an element tree.
#[derive(Debug)]
pub enum XmlError {
    /// The document is missing the expected structure.
    MalformedDocument {
        message: String,
        offset: Option<usize>,
    },
    /// Tokenizer failure reported by quick-xml.
    Xml {
        message: String,
        offset: Option<usize>,
    },
}

impl XmlError {
    fn malformed(message: impl Into<String>, offset: usize) -> Self {
        XmlError::MalformedDocument {
            message: message.into(),
            offset: Some(offset),
        }
    }

    fn at(self, position: usize) -> Self {
        match self {
            XmlError::MalformedDocument { message, offset } => XmlError::MalformedDocument {
                message,
                offset: offset.or(Some(position)),
            },
            XmlError::Xml { message, offset } => XmlError::Xml {
                message,
                offset: offset.or(Some(position)),
            },
        }
    }

    /// Byte offset into the source text where the failure was detected.
    pub fn offset(&self) -> Option<usize> {
        match self {
            XmlError::MalformedDocument { offset, .. } | XmlError::Xml { offset, .. } => *offset,
        }
    }

    /// The bare failure description, without the category prefix.
    pub fn message(&self) -> &str {
        match self {
            XmlError::MalformedDocument { message, .. } | XmlError::Xml { message, .. } => message,
        }
    }
}

impl std::fmt::Display for XmlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            XmlError::MalformedDocument { message, .. } => {
                write!(f, "Malformed manifest: {message}")
            }
            XmlError::Xml { message, .. } => write!(f, "XML error: {message}"),
        }
    }
}

impl std::error::Error for XmlError {}

impl From<QuickXmlError> for XmlError {
    fn from(value: QuickXmlError) -> Self {
        XmlError::Xml {
            message: value.to_string(),
            offset: None,
        }
    }
}

impl From<AttrError> for XmlError {
    fn from(value: AttrError) -> Self {
        XmlError::Xml {
            message: value.to_string(),
            offset: None,
        }
    }
}

/// 1-based line and column of a byte offset in `text`.
pub fn line_column(text: &str, offset: usize) -> (usize, usize) {
    let mut end = offset.min(text.len());
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    let before = &text[..end];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map(|idx| idx + 1).unwrap_or(0);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

fn is_name_start(c: char) -> bool {
    matches!(c,
        ':' | '_' | 'A'..='Z' | 'a'..='z'
        | '\u{C0}'..='\u{D6}' | '\u{D8}'..='\u{F6}' | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}' | '\u{37F}'..='\u{1FFF}' | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}' | '\u{2C00}'..='\u{2FEF}' | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}' | '\u{FDF0}'..='\u{FFFD}' | '\u{10000}'..='\u{EFFFF}')
}

fn is_name_char(c: char) -> bool {
    is_name_start(c)
        || matches!(c,
            '-' | '.' | '0'..='9' | '\u{B7}' | '\u{300}'..='\u{36F}' | '\u{203F}'..='\u{2040}')
}

fn xml_name(input: &str) -> IResult<&str, &str> {
    recognize(pair(satisfy(is_name_start), take_while(is_name_char)))(input)
}

/// Whether `name` matches the XML 1.0 `Name` production.
pub fn is_xml_name(name: &str) -> bool {
    all_consuming(xml_name)(name).is_ok()
}

fn contains_sequence(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

/// A single attribute, keyed by its qualified name (`android:name`, `package`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XmlAttribute {
    pub name: String,
    pub value: String,
}

/// DOM-style element node for manifest text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XmlElement {
    /// Qualified tag name, prefix included.
    pub tag: String,
    /// Attributes in source order. `xmlns` declarations are not kept.
    pub attributes: Vec<XmlAttribute>,
    pub children: Vec<XmlElement>,
    /// Byte offset of the opening `<`.
    pub offset: usize,
}

impl XmlElement {
    pub fn new(tag: impl Into<String>) -> Self {
        XmlElement {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            offset: 0,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|attr| attr.name == name)
    }

    /// First element named `tag` in document order, starting with `self`.
    pub fn find_first(&self, tag: &str) -> Option<&XmlElement> {
        if self.tag == tag {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find_first(tag))
    }

    /// Every element named `tag` in document order, `self` included.
    pub fn find_all<'a>(&'a self, tag: &str) -> Vec<&'a XmlElement> {
        let mut found = Vec::new();
        collect_named(self, tag, &mut found);
        found
    }
}

fn collect_named<'a>(element: &'a XmlElement, tag: &str, found: &mut Vec<&'a XmlElement>) {
    if element.tag == tag {
        found.push(element);
    }
    for child in &element.children {
        collect_named(child, tag, found);
    }
}

/// A parsed manifest text document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XmlDocument {
    root: XmlElement,
}

impl XmlDocument {
    pub fn root(&self) -> &XmlElement {
        &self.root
    }

    pub fn find_first(&self, tag: &str) -> Option<&XmlElement> {
        self.root.find_first(tag)
    }

    pub fn find_all(&self, tag: &str) -> Vec<&XmlElement> {
        self.root.find_all(tag)
    }

    /// Parse manifest text, rejecting anything that is not a well-formed document.
    ///
    /// Prefixes are not resolved against `xmlns` declarations, so `android:name`
    /// is accepted even when the document never declares the `android` prefix.
    pub fn from_string(xml: &str) -> XmlResult<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);
        let mut buffer = Vec::new();
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            let before = position(&reader);
            let event = reader
                .read_event_into(&mut buffer)
                .map_err(|err| XmlError::from(err).at(position(&reader)))?;
            match event {
                Event::Start(start) => {
                    let element = build_element(&start, tag_offset(xml, before))?;
                    stack.push(element);
                }
                Event::Empty(start) => {
                    let offset = tag_offset(xml, before);
                    let element = build_element(&start, offset)?;
                    attach_element(&mut stack, &mut root, element, offset)?;
                }
                Event::End(_) => {
                    let offset = tag_offset(xml, before);
                    let element = stack.pop().ok_or_else(|| {
                        XmlError::malformed("Unbalanced end tag in manifest", offset)
                    })?;
                    attach_element(&mut stack, &mut root, element, offset)?;
                }
                Event::Text(text) => {
                    if contains_sequence(&text, b"]]>") {
                        return Err(XmlError::malformed(
                            "Character data must not contain \"]]>\"",
                            tag_offset(xml, before),
                        ));
                    }
                    let content = text.unescape().map_err(|err| XmlError::from(err).at(before))?;
                    if stack.is_empty() && !content.trim().is_empty() {
                        return Err(XmlError::malformed(
                            "Text content outside of the root element",
                            tag_offset(xml, before),
                        ));
                    }
                }
                Event::CData(_) => {
                    if stack.is_empty() {
                        return Err(XmlError::malformed(
                            "CDATA section outside of the root element",
                            tag_offset(xml, before),
                        ));
                    }
                }
                Event::Comment(comment) => {
                    if contains_sequence(&comment, b"--") || comment.last() == Some(&b'-') {
                        return Err(XmlError::malformed(
                            "Comments must not contain \"--\"",
                            tag_offset(xml, before),
                        ));
                    }
                }
                Event::Decl(_) => {
                    let offset = tag_offset(xml, before);
                    let leading = xml.get(..offset).unwrap_or_default();
                    if !leading.trim_start_matches('\u{feff}').is_empty() {
                        return Err(XmlError::malformed(
                            "XML declaration is only allowed at the start of the document",
                            offset,
                        ));
                    }
                }
                Event::PI(_) | Event::DocType(_) => {}
                Event::Eof => break,
            }
            buffer.clear();
        }

        if let Some(open) = stack.last() {
            return Err(XmlError::malformed(
                format!("Unclosed <{}> element in manifest", open.tag),
                open.offset,
            ));
        }

        let root = root.ok_or_else(|| {
            XmlError::malformed("Manifest does not have a root element", xml.len())
        })?;

        Ok(XmlDocument { root })
    }
}

fn position(reader: &Reader<&[u8]>) -> usize {
    usize::try_from(reader.buffer_position()).unwrap_or(usize::MAX)
}

// trim_text swallows the whitespace preceding a tag into the same read,
// so the event starts at the first non-whitespace byte after `before`.
fn tag_offset(xml: &str, before: usize) -> usize {
    xml.get(before..)
        .and_then(|rest| rest.find(|c: char| !c.is_whitespace()))
        .map(|skipped| before + skipped)
        .unwrap_or(before)
}

fn attach_element(
    stack: &mut Vec<XmlElement>,
    root: &mut Option<XmlElement>,
    element: XmlElement,
    offset: usize,
) -> XmlResult<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
    } else if root.is_none() {
        *root = Some(element);
    } else {
        return Err(XmlError::malformed(
            "Multiple root elements in manifest",
            offset,
        ));
    }
    Ok(())
}

fn build_element(start: &BytesStart<'_>, offset: usize) -> XmlResult<XmlElement> {
    let name_ref = start.name();
    let tag = str::from_utf8(name_ref.as_ref())
        .map_err(|err| XmlError::malformed(err.to_string(), offset))?;
    if !is_xml_name(tag) {
        return Err(XmlError::malformed(format!("Invalid element name <{tag}>"), offset));
    }
    let mut element = XmlElement::new(tag);
    element.offset = offset;
    for attr in start.attributes() {
        let attr = attr.map_err(|err| XmlError::from(err).at(offset))?;
        let key = str::from_utf8(attr.key.as_ref())
            .map_err(|err| XmlError::malformed(err.to_string(), offset))?;
        if !is_xml_name(key) {
            return Err(XmlError::malformed(
                format!("Invalid attribute name {key:?} on <{tag}>"),
                offset,
            ));
        }
        if attr.value.contains(&b'<') {
            return Err(XmlError::malformed(
                format!("Attribute {key} on <{tag}> contains a raw '<'"),
                offset,
            ));
        }
        let value = attr
            .unescape_value()
            .map_err(|err| XmlError::from(err).at(offset))?
            .into_owned();
        if key == "xmlns" || key.starts_with("xmlns:") {
            continue;
        }
        element.attributes.push(XmlAttribute {
            name: key.to_string(),
            value,
        });
    }
    Ok(element)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<manifest xmlns:android="http://schemas.android.com/apk/res/android" package="com.example.app">
    <!-- network -->
    <uses-permission android:name="android.permission.INTERNET" />
    <application android:label="Demo">
        <activity android:name=".Main" />
        <activity android:name=".Other"></activity>
    </application>
</manifest>"#;

    #[test]
    fn parses_element_tree() {
        let doc = XmlDocument::from_string(SAMPLE).expect("parse sample");
        let root = doc.root();
        assert_eq!(root.tag, "manifest");
        assert_eq!(root.attribute("package"), Some("com.example.app"));
        assert!(!root.has_attribute("xmlns:android"));

        let activities = doc.find_all("activity");
        let names: Vec<_> = activities
            .iter()
            .filter_map(|a| a.attribute("android:name"))
            .collect();
        assert_eq!(names, vec![".Main", ".Other"]);

        let app = root.find_first("application").expect("application child");
        assert_eq!(app.attribute("android:label"), Some("Demo"));
    }

    #[test]
    fn records_element_offsets() {
        let doc = XmlDocument::from_string(SAMPLE).expect("parse sample");
        let manifest = doc.root();
        assert_eq!(line_column(SAMPLE, manifest.offset), (2, 1));
        let activity = doc.find_first("activity").expect("activity");
        assert_eq!(line_column(SAMPLE, activity.offset), (6, 9));
    }

    #[test]
    fn rejects_mismatched_end_tag() {
        let err = XmlDocument::from_string("<manifest><application></manifest>").unwrap_err();
        assert!(matches!(err, XmlError::Xml { .. }), "{err:?}");
        assert!(err.offset().is_some());
    }

    #[test]
    fn rejects_unclosed_element() {
        let text = "<manifest>\n  <application>";
        let err = XmlDocument::from_string(text).unwrap_err();
        assert_eq!(err.message(), "Unclosed <application> element in manifest");
        assert_eq!(err.offset().map(|o| line_column(text, o)), Some((2, 3)));
    }

    #[test]
    fn rejects_multiple_roots_and_stray_text() {
        assert!(XmlDocument::from_string("<a/><b/>").is_err());
        assert!(XmlDocument::from_string("<a/> trailing").is_err());
        assert!(XmlDocument::from_string("no markup at all").is_err());
    }

    #[test]
    fn rejects_bad_entity() {
        assert!(XmlDocument::from_string(r#"<manifest package="a&b"/>"#).is_err());
        assert!(XmlDocument::from_string("<manifest>fish &chips;</manifest>").is_err());
    }

    #[test]
    fn rejects_invalid_names() {
        assert!(!is_xml_name("1manifest"));
        assert!(is_xml_name("android:name"));
        assert!(is_xml_name("intent-filter"));
        let nested = r#"<1manifest><manifest package="a.b"><application/></manifest></1manifest>"#;
        assert!(XmlDocument::from_string(nested).is_err());
        assert!(XmlDocument::from_string(r#"<manifest 9package="a.b"/>"#).is_err());
    }

    #[test]
    fn rejects_raw_lt_in_attribute() {
        let err = XmlDocument::from_string(
            r#"<manifest package="a.b"><application android:label="x<y"/></manifest>"#,
        )
        .unwrap_err();
        assert!(matches!(err, XmlError::MalformedDocument { .. }), "{err:?}");
        assert!(XmlDocument::from_string(r#"<manifest package="a<b"/>"#).is_err());

        let doc = XmlDocument::from_string(r#"<manifest package="a&lt;b"/>"#).expect("escaped lt");
        assert_eq!(doc.root().attribute("package"), Some("a<b"));
    }

    #[test]
    fn rejects_cdata_end_in_text() {
        let text = r#"<manifest package="a.b"><application/>]]></manifest>"#;
        assert!(XmlDocument::from_string(text).is_err());
        assert!(XmlDocument::from_string("<manifest>]]&gt;</manifest>").is_ok());
    }

    #[test]
    fn rejects_late_declaration() {
        let text = "\n<?xml version=\"1.0\"?><manifest package=\"a.b\"><application/></manifest>";
        let err = XmlDocument::from_string(text).unwrap_err();
        assert_eq!(err.offset(), Some(1));
        assert!(XmlDocument::from_string("<manifest/><?xml version=\"1.0\"?>").is_err());
        assert!(XmlDocument::from_string("<?xml version=\"1.0\"?>\n<manifest/>").is_ok());
    }

    #[test]
    fn rejects_double_hyphen_in_comment() {
        assert!(XmlDocument::from_string("<manifest><!-- a -- b --></manifest>").is_err());
        assert!(XmlDocument::from_string("<manifest><!-- a ---></manifest>").is_err());
        assert!(XmlDocument::from_string("<manifest><!-- a - b --></manifest>").is_ok());
    }

    #[test]
    fn undeclared_prefix_is_accepted() {
        let text = r#"<manifest><application android:label="x"/></manifest>"#;
        let doc = XmlDocument::from_string(text).expect("prefixes are not resolved");
        let app = doc.find_first("application").expect("application");
        assert_eq!(app.attribute("android:label"), Some("x"));
    }

    #[test]
    fn line_column_counts_chars() {
        assert_eq!(line_column("ab\ncd", 0), (1, 1));
        assert_eq!(line_column("ab\ncd", 4), (2, 2));
        assert_eq!(line_column("é\nx", 3), (2, 1));
        assert_eq!(line_column("abc", 99), (1, 4));
    }
}
