use super::{Context, ElementStack, Expander};
use crate::html;
use crate::parser::{StartTag, Token};
use crate::serializer::{SerializeOptions, serialize};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// `[if lt IE 9]> CONTENT <![endif]`; leading whitespace stays with CONTENT
    static ref IE_CONDITIONAL_COMMENT: Regex =
        Regex::new(r"(?s)^(\s*\[if [^\]]*\]>)(.*?)(\s*<!\[endif\]\s*)$").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShorthandKind {
    /// `<js>`: one `<script src>` per line
    Scripts,
    /// `<css>`: one `<link rel="stylesheet">` per line
    Stylesheets,
}

impl ShorthandKind {
    pub fn from_tag_name(name: &str) -> Option<Self> {
        match name {
            "js" => Some(ShorthandKind::Scripts),
            "css" => Some(ShorthandKind::Stylesheets),
            _ => None,
        }
    }

    pub fn tag_name(self) -> &'static str {
        match self {
            ShorthandKind::Scripts => "js",
            ShorthandKind::Stylesheets => "css",
        }
    }

    /// Tokens for one resource include
    fn resource_tokens(self, url: &str) -> Vec<Token> {
        match self {
            ShorthandKind::Scripts => vec![
                Token::StartTag(StartTag::new("script").with_attribute("src", url)),
                Token::end_tag("script"),
            ],
            ShorthandKind::Stylesheets => vec![Token::StartTag(
                StartTag::new("link")
                    .with_attribute("href", url)
                    .with_attribute("rel", "stylesheet"),
            )],
        }
    }
}

#[derive(Debug)]
enum State {
    Outside,
    Inside {
        kind: ShorthandKind,
        base_indent: String,
    },
}

/// Piece of converted shorthand content
#[derive(Debug, PartialEq)]
enum Piece<'a> {
    Text(String),
    Resource(&'a str),
}

/// Expands `<js>`/`<css>` blocks: every non-blank line of the block becomes
/// one include tag, re-indented to the shorthand's own indentation.
#[derive(Debug)]
pub struct ResourceShorthandExpander {
    state: State,
    content: Vec<Token>,
    nested: ElementStack,
}

impl ResourceShorthandExpander {
    pub fn new() -> Self {
        Self {
            state: State::Outside,
            content: Vec::new(),
            nested: ElementStack::new(),
        }
    }

    pub fn active_shorthand(&self) -> Option<ShorthandKind> {
        match &self.state {
            State::Outside => None,
            State::Inside { kind, .. } => Some(*kind),
        }
    }

    fn convert_content(&mut self) -> Vec<Token> {
        let State::Inside { kind, base_indent } =
            std::mem::replace(&mut self.state, State::Outside)
        else {
            return Vec::new();
        };
        let content = std::mem::take(&mut self.content);
        self.nested.clear();

        let is_text = |token: &Token| matches!(token, Token::Text { .. });
        let first_text = content.iter().position(is_text);
        let last_text = content.iter().rposition(is_text);
        let token_count = content.len();

        log::debug!(
            "expanding <{}> shorthand ({} buffered token(s))",
            kind.tag_name(),
            token_count
        );

        let mut out = Vec::new();
        for (i, token) in content.into_iter().enumerate() {
            match token {
                Token::Text { content } => {
                    let mut text = content.as_str();
                    if first_text == Some(i) {
                        text = text.trim_start();
                    }
                    if last_text == Some(i) {
                        text = text.trim_end();
                    }
                    let followed = i + 1 < token_count;
                    let pieces = convert_lines(text, &base_indent, followed);
                    out.extend(pieces_to_tokens(kind, pieces));
                }
                Token::Comment { content } => {
                    out.push(Token::Comment {
                        content: convert_comment(kind, &content, &base_indent),
                    });
                }
                other => out.push(other),
            }
        }
        out
    }
}

impl Default for ResourceShorthandExpander {
    fn default() -> Self {
        Self::new()
    }
}

impl Expander for ResourceShorthandExpander {
    fn on_start_tag(&mut self, tag: StartTag, ctx: &Context) -> Vec<Token> {
        if self.active_shorthand().is_some() {
            // Content is captured, not structure: nested tags are tracked
            // only to know when their content ends
            if !tag.self_closing && !html::is_void_element(&tag.name) {
                self.nested.push(tag.name);
            }
            return Vec::new();
        }

        match ShorthandKind::from_tag_name(&tag.name) {
            // <js/> has nothing to expand
            Some(_) if tag.self_closing => Vec::new(),
            Some(kind) => {
                self.state = State::Inside {
                    kind,
                    base_indent: ctx.current_indent().to_string(),
                };
                Vec::new()
            }
            None => vec![Token::StartTag(tag)],
        }
    }

    fn on_end_tag(&mut self, name: String, _ctx: &Context) -> Vec<Token> {
        let Some(kind) = self.active_shorthand() else {
            return vec![Token::EndTag { name }];
        };

        if self.nested.has_with_tag_name(&name) {
            self.nested.pop(&name);
            Vec::new()
        } else if name == kind.tag_name() {
            // Nested tags left open are abandoned with their content
            self.convert_content()
        } else {
            Vec::new()
        }
    }

    fn on_text(&mut self, content: String, _ctx: &Context) -> Vec<Token> {
        match self.state {
            State::Outside => vec![Token::Text { content }],
            State::Inside { .. } => {
                if self.nested.is_empty() {
                    self.content.push(Token::Text { content });
                }
                Vec::new()
            }
        }
    }

    fn on_comment(&mut self, content: String, _ctx: &Context) -> Vec<Token> {
        match self.state {
            State::Outside => vec![Token::Comment { content }],
            State::Inside { .. } => {
                if self.nested.is_empty() {
                    self.content.push(Token::Comment { content });
                }
                Vec::new()
            }
        }
    }

    fn on_doctype(&mut self, content: String, _ctx: &Context) -> Vec<Token> {
        match self.state {
            State::Outside => vec![Token::Doctype { content }],
            State::Inside { .. } => Vec::new(),
        }
    }

    fn finish(&mut self, _ctx: &Context) -> Vec<Token> {
        if let State::Inside { kind, .. } = &self.state {
            log::warn!(
                "<{}> shorthand never closed; {} buffered token(s) dropped",
                kind.tag_name(),
                self.content.len()
            );
        }
        self.state = State::Outside;
        self.content.clear();
        self.nested.clear();
        Vec::new()
    }

    fn name(&self) -> &'static str {
        "resource-shorthands"
    }
}

/// Split text into lines, turning every non-blank line into a resource.
///
/// The first line continues whatever precedes it and keeps its own leading
/// whitespace; later lines are re-indented to `base_indent`. A trailing
/// whitespace-only line of a token `followed` by another (a comment on the
/// same line) is that token's indentation and is re-indented too.
fn convert_lines<'a>(text: &'a str, base_indent: &str, followed: bool) -> Vec<Piece<'a>> {
    let mut pieces = Vec::new();
    let mut pending = String::new();
    let line_count = text.split('\n').count();

    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            pending.push('\n');
        }
        let (line, carriage_return) = match line.strip_suffix('\r') {
            Some(line) => (line, true),
            None => (line, false),
        };

        let url = line.trim();
        if url.is_empty() {
            if i > 0 && followed && i + 1 == line_count {
                pending.push_str(base_indent);
            } else {
                pending.push_str(line);
            }
        } else {
            if i > 0 {
                pending.push_str(base_indent);
            } else {
                pending.push_str(&line[..line.len() - line.trim_start().len()]);
            }
            if !pending.is_empty() {
                pieces.push(Piece::Text(std::mem::take(&mut pending)));
            }
            pieces.push(Piece::Resource(url));
        }

        if carriage_return {
            pending.push('\r');
        }
    }

    if !pending.is_empty() {
        pieces.push(Piece::Text(pending));
    }
    pieces
}

fn pieces_to_tokens(kind: ShorthandKind, pieces: Vec<Piece<'_>>) -> Vec<Token> {
    let mut tokens = Vec::new();
    for piece in pieces {
        match piece {
            Piece::Text(text) => tokens.push(Token::Text { content: text }),
            Piece::Resource(url) => tokens.extend(kind.resource_tokens(url)),
        }
    }
    tokens
}

/// Expand the body of an IE conditional comment, keeping the
/// `[if ...]>` / `<![endif]` wrapper verbatim. Other comments are unchanged.
fn convert_comment(kind: ShorthandKind, comment: &str, base_indent: &str) -> String {
    let Some(captures) = IE_CONDITIONAL_COMMENT.captures(comment) else {
        return comment.to_string();
    };

    let mut converted = captures[1].to_string();
    for piece in convert_lines(&captures[2], base_indent, false) {
        match piece {
            Piece::Text(text) => converted.push_str(&text),
            Piece::Resource(url) => converted.push_str(&serialize(
                &kind.resource_tokens(url),
                SerializeOptions::default(),
            )),
        }
    }
    converted.push_str(&captures[3]);
    converted
}
