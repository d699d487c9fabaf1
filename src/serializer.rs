use crate::html;
use crate::parser::{AttributeValue, StartTag, Token};

/// Serializer configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct SerializeOptions {
    /// Escape `&` and `<` in text. Only needed when character
    /// references were decoded by the tokenizer.
    pub escape: bool,
}

/// Turns a token stream back into markup
pub struct Serializer {
    options: SerializeOptions,
    html: String,
    /// Set while inside `<script>`/`<style>`, whose text is never escaped
    in_raw_text: bool,
}

impl Serializer {
    pub fn new(options: SerializeOptions) -> Self {
        Self {
            options,
            html: String::new(),
            in_raw_text: false,
        }
    }

    pub fn write(&mut self, token: &Token) {
        match token {
            Token::StartTag(tag) => {
                self.write_start_tag(tag);
                self.in_raw_text = !tag.self_closing && html::is_raw_text_element(&tag.name);
            }
            Token::EndTag { name } => {
                self.html.push_str("</");
                self.html.push_str(name);
                self.html.push('>');
                self.in_raw_text = false;
            }
            Token::Text { content } => {
                if self.options.escape && !self.in_raw_text {
                    self.html.push_str(&html::escape_text(content));
                } else {
                    self.html.push_str(content);
                }
            }
            Token::Comment { content } => {
                self.html.push_str("<!--");
                self.html.push_str(content);
                self.html.push_str("-->");
            }
            Token::Doctype { content } => {
                self.html.push_str("<!");
                self.html.push_str(content);
                self.html.push('>');
            }
        }
    }

    fn write_start_tag(&mut self, tag: &StartTag) {
        self.html.push('<');
        self.html.push_str(&tag.name);

        for attr in &tag.attributes {
            self.html.push(' ');
            self.html.push_str(&attr.name);
            if let AttributeValue::String(value) = &attr.value {
                self.html.push_str("=\"");
                self.html
                    .push_str(&html::escape_attribute(value, self.options.escape));
                self.html.push('"');
            }
        }

        if tag.self_closing {
            self.html.push_str(" /");
        }
        self.html.push('>');
    }

    pub fn finish(self) -> String {
        self.html
    }
}

/// Serialize a complete token stream
pub fn serialize(tokens: &[Token], options: SerializeOptions) -> String {
    let mut serializer = Serializer::new(options);
    for token in tokens {
        serializer.write(token);
    }
    serializer.finish()
}
