//! Shared XML helpers for reading and writing package parts.
//!
//! Readers use the attribute helpers over quick-xml `BytesStart` events;
//! writers build XML text directly and go through [`xml_escape`].

use quick_xml::events::BytesStart;

/// Standard XML declaration written at the top of every generated part.
pub const XML_HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n";

/// Extract an attribute value by key, unescaping entities.
///
/// Returns `None` if the attribute is missing or not valid UTF-8.
pub fn attr_string(e: &BytesStart, key: &[u8]) -> Option<String> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == key {
            return attr.unescape_value().ok().map(|s| s.into_owned());
        }
    }
    None
}

/// Extract an attribute by local name (ignoring namespace prefix, so
/// `r:id` matches `id`).
pub fn attr_string_local(e: &BytesStart, key: &[u8]) -> Option<String> {
    for attr in e.attributes().flatten() {
        if attr.key.local_name().as_ref() == key {
            return attr.unescape_value().ok().map(|s| s.into_owned());
        }
    }
    None
}

/// Extract a `usize` attribute value by key.
pub fn attr_usize(e: &BytesStart, key: &[u8]) -> Option<usize> {
    attr_string(e, key).and_then(|s| s.trim().parse().ok())
}

/// Extract a `u8` attribute value by key.
pub fn attr_u8(e: &BytesStart, key: &[u8]) -> Option<u8> {
    attr_string(e, key).and_then(|s| s.trim().parse().ok())
}

/// Extract an `f64` attribute value by key.
pub fn attr_f64(e: &BytesStart, key: &[u8]) -> Option<f64> {
    attr_string(e, key).and_then(|s| s.trim().parse().ok())
}

/// Extract a boolean attribute value by key.
///
/// Returns `None` if missing. Recognizes `"1"`, `"true"` as true.
pub fn attr_bool(e: &BytesStart, key: &[u8]) -> Option<bool> {
    attr_string(e, key).map(|s| matches!(s.as_str(), "1" | "true"))
}

/// Extract a boolean attribute with a default value.
pub fn attr_bool_default(e: &BytesStart, key: &[u8], default: bool) -> bool {
    attr_bool(e, key).unwrap_or(default)
}

/// Extract the `val` attribute as a string. Very common in styles.xml.
pub fn attr_val(e: &BytesStart) -> Option<String> {
    attr_string(e, b"val")
}

/// Escape text for element content or attribute values.
pub fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// `" name=\"value\""` for optional string attributes; empty when `None` or empty.
pub(crate) fn opt_attr(name: &str, value: &str) -> String {
    if value.is_empty() {
        String::new()
    } else {
        format!(" {name}=\"{}\"", xml_escape(value))
    }
}

/// `" name=\"1\""` when `flag` is set.
pub(crate) fn flag_attr(name: &str, flag: bool) -> String {
    if flag {
        format!(" {name}=\"1\"")
    } else {
        String::new()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;

    fn make_start(xml: &str) -> BytesStart<'_> {
        let content = xml
            .trim_start_matches('<')
            .trim_end_matches('>')
            .trim_end_matches('/')
            .trim_end();
        BytesStart::from_content(content, content.find(' ').unwrap_or(content.len()))
    }

    #[test]
    fn test_attr_string_unescapes() {
        let e = make_start(r#"<numFmt formatCode="&quot;$&quot;#,##0" />"#);
        assert_eq!(
            attr_string(&e, b"formatCode"),
            Some("\"$\"#,##0".to_string())
        );
        assert_eq!(attr_string(&e, b"missing"), None);
    }

    #[test]
    fn test_attr_string_local() {
        let e = make_start(r#"<sheet name="Data" r:id="rId3" />"#);
        assert_eq!(attr_string_local(&e, b"id"), Some("rId3".to_string()));
    }

    #[test]
    fn test_numeric_attrs() {
        let e = make_start(r#"<col min="2" max="4" width="12.5" outlineLevel="1" />"#);
        assert_eq!(attr_usize(&e, b"min"), Some(2));
        assert_eq!(attr_u8(&e, b"outlineLevel"), Some(1));
        let w = attr_f64(&e, b"width").unwrap();
        assert!((w - 12.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_attr_bool() {
        let e = make_start(r#"<foo a="1" b="0" c="true" d="false" />"#);
        assert_eq!(attr_bool(&e, b"a"), Some(true));
        assert_eq!(attr_bool(&e, b"b"), Some(false));
        assert_eq!(attr_bool(&e, b"c"), Some(true));
        assert_eq!(attr_bool(&e, b"d"), Some(false));
        assert!(!attr_bool_default(&e, b"missing", false));
    }

    #[test]
    fn test_xml_escape() {
        assert_eq!(xml_escape("a<b & \"c\""), "a&lt;b &amp; &quot;c&quot;");
        assert_eq!(xml_escape("plain"), "plain");
    }

    #[test]
    fn test_opt_and_flag_attrs() {
        assert_eq!(opt_attr("ref", "A1:B2"), " ref=\"A1:B2\"");
        assert_eq!(opt_attr("ref", ""), "");
        assert_eq!(flag_attr("hidden", true), " hidden=\"1\"");
        assert_eq!(flag_attr("hidden", false), "");
    }
}
