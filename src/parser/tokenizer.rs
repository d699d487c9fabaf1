use super::entities;
use crate::error::{ErrorKind, ParseError};
use crate::html;
use serde::Serialize;

/// Position in source markup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// Byte offset in source
    pub byte: usize,
    /// Line number (0-indexed)
    pub line: usize,
    /// Column number (0-indexed, in characters)
    pub col: usize,
}

/// Span in source markup (a range from start position to end position)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

/// Tag attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub name: String,
    pub value: AttributeValue,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: AttributeValue::String(value.into()),
        }
    }

    /// Attribute without a value: `hidden`, `md8`
    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: AttributeValue::Bool,
        }
    }

    /// Attribute value, empty for bare attributes
    pub fn value_str(&self) -> &str {
        match &self.value {
            AttributeValue::String(value) => value,
            AttributeValue::Bool => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// attr="value", attr='value' or attr=value
    String(String),
    /// No value: disabled
    Bool,
}

/// Start tag: `<name attributes>` or `<name attributes />`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartTag {
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub self_closing: bool,
}

impl StartTag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            self_closing: false,
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(Attribute::new(name, value));
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|attr| attr.name == name)
    }
}

/// Markup tokens, in document order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Token {
    StartTag(StartTag),
    EndTag { name: String },
    Text { content: String },
    /// Comment body, without `<!--` and `-->`
    Comment { content: String },
    /// Markup declaration body, without `<!` and `>`
    Doctype { content: String },
}

impl Token {
    pub fn start_tag(tag: StartTag) -> Self {
        Token::StartTag(tag)
    }

    pub fn end_tag(name: impl Into<String>) -> Self {
        Token::EndTag { name: name.into() }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Token::Text { content: content.into() }
    }

    pub fn comment(content: impl Into<String>) -> Self {
        Token::Comment { content: content.into() }
    }
}

/// Tokenizer configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenizerOptions {
    /// Decode `&amp;`-style references in text and attribute values.
    /// Off by default so the output stays byte-identical to the source.
    pub decode_character_references: bool,
}

/// Tokenizer for boot HTML source
pub struct Tokenizer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    position: Position,
    options: TokenizerOptions,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str, options: TokenizerOptions) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            position: Position::default(),
            options,
        }
    }

    /// Tokenize the entire source
    pub fn tokenize(&mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();
        let mut text_start = self.position.byte;

        while !self.at_eof() {
            if self.peek_char() != Some('<') {
                self.advance();
                continue;
            }

            if self.starts_with("<!--") {
                self.flush_text(&mut tokens, text_start);
                self.tokenize_comment(&mut tokens)?;
            } else if self.starts_with("<!") {
                self.flush_text(&mut tokens, text_start);
                self.tokenize_declaration(&mut tokens)?;
            } else if self.is_end_tag_start() {
                self.flush_text(&mut tokens, text_start);
                self.tokenize_end_tag(&mut tokens)?;
            } else if self.is_start_tag_start() {
                self.flush_text(&mut tokens, text_start);
                self.tokenize_start_tag(&mut tokens)?;
            } else {
                // Stray '<' is plain text
                self.advance();
                continue;
            }

            text_start = self.position.byte;
        }

        self.flush_text(&mut tokens, text_start);
        Ok(tokens)
    }

    fn flush_text(&self, tokens: &mut Vec<Token>, start: usize) {
        if start >= self.position.byte {
            return;
        }
        let raw = &self.source[start..self.position.byte];
        let content = if self.options.decode_character_references {
            entities::decode(raw).into_owned()
        } else {
            raw.to_string()
        };
        tokens.push(Token::Text { content });
    }

    fn tokenize_comment(&mut self, tokens: &mut Vec<Token>) -> Result<(), ParseError> {
        let start = self.position;
        let body_start = start.byte + 4;

        let Some(offset) = self.source[body_start..].find("-->") else {
            self.advance_to(self.bytes.len());
            return Err(ParseError::new(
                ErrorKind::UnterminatedComment,
                "comment is never closed",
                Span { start, end: self.span_end_of(start, 4) },
            )
            .with_help("Close the comment with -->"));
        };

        let body_end = body_start + offset;
        let content = self.source[body_start..body_end].to_string();
        self.advance_to(body_end + 3);
        tokens.push(Token::Comment { content });
        Ok(())
    }

    fn tokenize_declaration(&mut self, tokens: &mut Vec<Token>) -> Result<(), ParseError> {
        let start = self.position;
        let body_start = start.byte + 2;

        let Some(offset) = self.source[body_start..].find('>') else {
            self.advance_to(self.bytes.len());
            return Err(ParseError::new(
                ErrorKind::UnterminatedTag,
                "markup declaration is never closed",
                Span { start, end: self.span_end_of(start, 2) },
            )
            .with_help("Close the declaration with >"));
        };

        let body_end = body_start + offset;
        let content = self.source[body_start..body_end].to_string();
        self.advance_to(body_end + 1);
        tokens.push(Token::Doctype { content });
        Ok(())
    }

    fn tokenize_end_tag(&mut self, tokens: &mut Vec<Token>) -> Result<(), ParseError> {
        let start = self.position;
        self.advance(); // <
        self.advance(); // /

        let name = self.consume_while(is_tag_name_char);
        let name_end = self.position;

        while !self.at_eof() && self.peek_char() != Some('>') {
            self.advance();
        }
        if self.at_eof() {
            return Err(ParseError::new(
                ErrorKind::UnterminatedTag,
                format!("end tag </{}> is never closed", name),
                Span { start, end: name_end },
            )
            .with_help("Add the closing >"));
        }
        self.advance(); // >

        tokens.push(Token::EndTag { name });
        Ok(())
    }

    fn tokenize_start_tag(&mut self, tokens: &mut Vec<Token>) -> Result<(), ParseError> {
        let start = self.position;
        self.advance(); // <

        let name = self.consume_while(is_tag_name_char);
        let name_end = self.position;
        let mut attributes = Vec::new();

        let self_closing = loop {
            self.skip_whitespace();

            match self.peek_char() {
                None => {
                    return Err(ParseError::new(
                        ErrorKind::UnterminatedTag,
                        format!("start tag <{}> is never closed", name),
                        Span { start, end: name_end },
                    )
                    .with_help("Add the closing > or />"));
                }
                Some('>') => {
                    self.advance();
                    break false;
                }
                Some('/') if self.peek_next_char() == Some('>') => {
                    self.advance();
                    self.advance();
                    break true;
                }
                Some('/') => self.advance(),
                Some(_) => attributes.push(self.parse_attribute(Span { start, end: name_end })?),
            }
        };

        let is_raw_text = !self_closing && html::is_raw_text_element(&name);
        let raw_name = name.clone();

        tokens.push(Token::StartTag(StartTag {
            name,
            attributes,
            self_closing,
        }));

        if is_raw_text {
            self.tokenize_raw_text(tokens, &raw_name);
        }

        Ok(())
    }

    /// Consume `<script>`/`<style>` content verbatim up to its end tag
    fn tokenize_raw_text(&mut self, tokens: &mut Vec<Token>, name: &str) {
        let start = self.position.byte;
        let haystack = self.source[start..].to_ascii_lowercase();
        let needle = format!("</{}", name.to_ascii_lowercase());

        let mut search_from = 0;
        let end = loop {
            match haystack[search_from..].find(&needle) {
                Some(offset) => {
                    let candidate = search_from + offset;
                    let after = haystack.as_bytes().get(candidate + needle.len()).copied();
                    match after {
                        None | Some(b'>') | Some(b'/') => break start + candidate,
                        Some(b) if b.is_ascii_whitespace() => break start + candidate,
                        _ => search_from = candidate + needle.len(),
                    }
                }
                None => break self.bytes.len(),
            }
        };

        if end > start {
            let content = self.source[start..end].to_string();
            self.advance_to(end);
            tokens.push(Token::Text { content });
        }
    }

    /// `tag` spans the enclosing `<name`, for errors that need to point back at it
    fn parse_attribute(&mut self, tag: Span) -> Result<Attribute, ParseError> {
        let mut name = self.consume_while(is_attribute_name_char);
        if name.is_empty() {
            // `=` or a quote where a name should be: take it literally
            if let Some(ch) = self.peek_char() {
                name.push(ch);
                self.advance();
            }
            name.push_str(&self.consume_while(is_attribute_name_char));
        }

        let after_name = self.position;
        self.skip_whitespace();

        if self.peek_char() != Some('=') {
            // Boolean attribute; rewind so the whitespace is skipped by the caller
            self.position = after_name;
            return Ok(Attribute {
                name,
                value: AttributeValue::Bool,
            });
        }

        self.advance(); // =
        self.skip_whitespace();

        let raw = match self.peek_char() {
            Some(quote @ ('"' | '\'')) => {
                let quote_pos = self.position;
                self.advance();
                let value_start = self.position.byte;
                let Some(offset) = self.source[value_start..].find(quote) else {
                    self.advance_to(self.bytes.len());
                    return Err(ParseError::new(
                        ErrorKind::UnterminatedAttributeValue,
                        format!("value of attribute '{}' is never closed", name),
                        Span { start: quote_pos, end: self.span_end_of(quote_pos, 1) },
                    )
                    .with_related(tag)
                    .with_related_label("tag opened here")
                    .with_help(format!("Add the closing {}", quote)));
                };
                let value = self.source[value_start..value_start + offset].to_string();
                self.advance_to(value_start + offset + 1);
                value
            }
            _ => self.consume_while(|c| !c.is_whitespace() && c != '>'),
        };

        let value = if self.options.decode_character_references {
            entities::decode(&raw).into_owned()
        } else {
            raw
        };

        Ok(Attribute {
            name,
            value: AttributeValue::String(value),
        })
    }

    // === Low-level helpers ===

    fn at_eof(&self) -> bool {
        self.position.byte >= self.bytes.len()
    }

    fn starts_with(&self, prefix: &str) -> bool {
        self.source[self.position.byte..].starts_with(prefix)
    }

    fn is_start_tag_start(&self) -> bool {
        self.bytes
            .get(self.position.byte + 1)
            .is_some_and(|b| b.is_ascii_alphabetic())
    }

    fn is_end_tag_start(&self) -> bool {
        self.bytes.get(self.position.byte + 1) == Some(&b'/')
            && self
                .bytes
                .get(self.position.byte + 2)
                .is_some_and(|b| b.is_ascii_alphabetic())
    }

    fn peek_char(&self) -> Option<char> {
        if self.at_eof() {
            return None;
        }
        let b = self.bytes[self.position.byte];
        if b < 128 {
            Some(b as char)
        } else {
            self.source[self.position.byte..].chars().next()
        }
    }

    fn peek_next_char(&self) -> Option<char> {
        let mut chars = self.source[self.position.byte..].chars();
        chars.next()?;
        chars.next()
    }

    fn advance(&mut self) {
        let Some(ch) = self.peek_char() else {
            return;
        };

        self.position.byte += ch.len_utf8();

        if ch == '\n' {
            self.position.line += 1;
            self.position.col = 0;
        } else {
            self.position.col += 1;
        }
    }

    fn advance_to(&mut self, byte: usize) {
        while !self.at_eof() && self.position.byte < byte {
            self.advance();
        }
    }

    /// End position of a same-line construct `len` characters long
    fn span_end_of(&self, start: Position, len: usize) -> Position {
        Position {
            byte: start.byte + len,
            line: start.line,
            col: start.col + len,
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn consume_while<F: Fn(char) -> bool>(&mut self, pred: F) -> String {
        let start = self.position.byte;
        while let Some(ch) = self.peek_char() {
            if !pred(ch) {
                break;
            }
            self.advance();
        }
        self.source[start..self.position.byte].to_string()
    }
}

fn is_tag_name_char(c: char) -> bool {
    !c.is_whitespace() && c != '/' && c != '>'
}

fn is_attribute_name_char(c: char) -> bool {
    !c.is_whitespace() && c != '/' && c != '>' && c != '=' && c != '"' && c != '\''
}

/// Tokenize source markup
pub fn tokenize(source: &str, options: TokenizerOptions) -> Result<Vec<Token>, ParseError> {
    Tokenizer::new(source, options).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<Token> {
        tokenize(source, TokenizerOptions::default()).unwrap()
    }

    #[test]
    fn test_simple_markup() {
        let tokens = tokens("<div>Hello</div>\n");
        assert!(matches!(&tokens[0], Token::StartTag(tag) if tag.name == "div"));
        assert!(matches!(&tokens[1], Token::Text { content } if content == "Hello"));
        assert!(matches!(&tokens[2], Token::EndTag { name } if name == "div"));
        assert!(matches!(&tokens[3], Token::Text { content } if content == "\n"));
        assert_eq!(tokens.len(), 4);
    }

    #[test]
    fn test_attribute_forms() {
        let tokens = tokens("<c md8 size:md8-lg4 class=\"a b\" id='x' data-n=3 hidden>");
        let Token::StartTag(tag) = &tokens[0] else {
            panic!("expected start tag, got {:?}", tokens[0]);
        };
        assert_eq!(tag.name, "c");
        let names: Vec<_> = tag.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["md8", "size:md8-lg4", "class", "id", "data-n", "hidden"]);
        assert_eq!(tag.attributes[0].value, AttributeValue::Bool);
        assert_eq!(tag.attribute("class").unwrap().value_str(), "a b");
        assert_eq!(tag.attribute("id").unwrap().value_str(), "x");
        assert_eq!(tag.attribute("data-n").unwrap().value_str(), "3");
    }

    #[test]
    fn test_self_closing_and_multiline_tag() {
        let tokens = tokens("<clearfix/><r\n  xs6\n  class=\"x\">");
        assert!(matches!(&tokens[0], Token::StartTag(tag) if tag.name == "clearfix" && tag.self_closing));
        let Token::StartTag(row) = &tokens[1] else {
            panic!("expected start tag");
        };
        assert_eq!(row.name, "r");
        assert_eq!(row.attributes.len(), 2);
        assert!(!row.self_closing);
    }

    #[test]
    fn test_comment_and_doctype() {
        let tokens = tokens("<!DOCTYPE html><!--[if lt IE 9]> a.css <![endif]-->");
        assert_eq!(tokens[0], Token::Doctype { content: "DOCTYPE html".to_string() });
        assert_eq!(tokens[1], Token::comment("[if lt IE 9]> a.css <![endif]"));
    }

    #[test]
    fn test_stray_angle_bracket_is_text() {
        let tokens = tokens("a < b <3 </ >");
        assert_eq!(tokens, vec![Token::text("a < b <3 </ >")]);
    }

    #[test]
    fn test_script_is_raw_text() {
        let tokens = tokens("<script>if (a<b) { x('</div>'); }</SCRIPT >after");
        assert_eq!(tokens[1], Token::text("if (a<b) { x('</div>'); }"));
        assert_eq!(tokens[2], Token::end_tag("SCRIPT"));
        assert_eq!(tokens[3], Token::text("after"));
    }

    #[test]
    fn test_tag_names_keep_case() {
        let tokens = tokens("<R></R>");
        assert_eq!(tokens[0], Token::start_tag(StartTag::new("R")));
        assert_eq!(tokens[1], Token::end_tag("R"));
    }

    #[test]
    fn test_character_references_preserved_by_default() {
        let tokens = tokens("<a title=\"&amp;\">&lt;x&gt;</a>");
        let Token::StartTag(tag) = &tokens[0] else {
            panic!("expected start tag");
        };
        assert_eq!(tag.attributes[0].value_str(), "&amp;");
        assert_eq!(tokens[1], Token::text("&lt;x&gt;"));
    }

    #[test]
    fn test_character_references_decoded_when_enabled() {
        let options = TokenizerOptions { decode_character_references: true };
        let tokens = tokenize("<a title=\"&amp;\">&lt;x&#62;</a>", options).unwrap();
        let Token::StartTag(tag) = &tokens[0] else {
            panic!("expected start tag");
        };
        assert_eq!(tag.attributes[0].value_str(), "&");
        assert_eq!(tokens[1], Token::text("<x>"));
    }

    #[test]
    fn test_unterminated_comment() {
        let err = tokenize("<p>\n<!-- never", TokenizerOptions::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnterminatedComment);
        assert_eq!(err.span.start.line, 1);
        assert_eq!(err.span.start.col, 0);
    }

    #[test]
    fn test_unterminated_start_tag() {
        let err = tokenize("<div class=\"a\"", TokenizerOptions::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnterminatedTag);
    }

    #[test]
    fn test_unterminated_attribute_value() {
        let err = tokenize("<div class=\"a>text", TokenizerOptions::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnterminatedAttributeValue);
        assert_eq!(err.span.start.col, 11);
    }

    #[test]
    fn test_unterminated_attribute_value_points_at_tag() {
        let source = "<p>
  <c6 class=\"a
  text";
        let err = tokenize(source, TokenizerOptions::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnterminatedAttributeValue);

        let related = err.related_span.expect("related span");
        assert_eq!((related.start.line, related.start.col), (1, 2));
        assert_eq!((related.end.line, related.end.col), (1, 5));

        let rendered = err.render(source, "page.boot.html");
        assert!(rendered.contains("  <c6 class=\"a"));
        assert!(rendered.contains("^^^ tag opened here"));
    }
}
