//! HTML element classification shared by the tokenizer and serializer.

/// Raw text elements: content runs verbatim up to the matching end tag.
/// https://html.spec.whatwg.org/multipage/syntax.html#raw-text-elements
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Void elements: cannot have children or a closing tag.
/// https://html.spec.whatwg.org/multipage/syntax.html#void-elements
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input",
    "link", "meta", "param", "source", "track", "wbr",
];

pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag.to_ascii_lowercase().as_str())
}

pub fn is_raw_text_element(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&tag.to_ascii_lowercase().as_str())
}

/// Escape text content for output
pub fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;")
}

/// Escape a double-quoted attribute value. `&` is only escaped when
/// references were decoded on the way in.
pub fn escape_attribute(value: &str, escape_ampersand: bool) -> String {
    let value = if escape_ampersand {
        value.replace('&', "&amp;")
    } else {
        value.to_string()
    };
    value.replace('"', "&quot;")
}
