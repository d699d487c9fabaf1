use super::attribute_rules::{RuleSet, is_size_class};
use super::{Context, Expander};
use crate::parser::{Attribute, AttributeValue, StartTag, Token};
use lazy_static::lazy_static;
use regex::Regex;

const CONTAINER_TAGS: &[&str] = &["container", "container-fluid"];
const CLEARFIX_TAG: &str = "clearfix";
const ROW_TAG: &str = "r";
const COLUMN_TAG: &str = "c";

const GRID_ELEMENT: &str = "div";
const ROW_CLASS: &str = "row";
const DEFAULT_COLUMN_CLASS: &str = "col-md-1";
const IMPLIED_COLUMN_CLASS: &str = "col-md-12";

lazy_static! {
    static ref NUMBERED_COLUMN_TAG: Regex = Regex::new(r"^c([1-9]|1[0-2])$").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnState {
    /// No column start tag seen yet in this row
    Expecting,
    Present,
}

/// One open `<r>`
#[derive(Debug)]
struct RowFrame {
    column: ColumnState,
    implied_column: bool,
}

/// Rewrites grid shorthands (`container`, `r`, `c`, `c1`..`c12`,
/// `clearfix`) into `<div>`s and wraps column-less row content in an
/// implied `col-md-12` column.
///
/// Whitespace and comments that arrive while a row is still waiting for its
/// first column are held back: they belong to the row if a real column
/// follows, or to the implied column if other content comes first.
#[derive(Debug, Default)]
pub struct GridExpander {
    rows: Vec<RowFrame>,
    pending: Vec<Token>,
}

impl GridExpander {
    pub fn new() -> Self {
        Self::default()
    }

    fn expecting_column(&self) -> bool {
        self.rows
            .last()
            .is_some_and(|row| row.column == ColumnState::Expecting)
    }

    /// Emit the implied column and replay held tokens behind it
    fn materialize_implied_column(&mut self, out: &mut Vec<Token>) {
        if !self.expecting_column() {
            return;
        }
        let Some(row) = self.rows.last_mut() else {
            return;
        };
        row.column = ColumnState::Present;
        row.implied_column = true;

        log::debug!(
            "inserting implied column at row depth {} ({} held token(s))",
            self.rows.len(),
            self.pending.len()
        );

        out.push(implied_column_start_tag());
        out.append(&mut self.pending);
    }

    fn process_column_start_tag(&mut self, mut tag: StartTag) -> Vec<Token> {
        // <c/> is an empty column next to the row's content, so the row
        // still wraps that content in an implied column
        let self_closing = std::mem::take(&mut tag.self_closing);
        if !self_closing {
            if let Some(row) = self.rows.last_mut() {
                row.column = ColumnState::Present;
            }
        }

        // Held tokens belong to the row, ahead of the column
        let mut out = std::mem::take(&mut self.pending);

        let numbered = numbered_size_class(&tag.name);
        let converted = RuleSet::column().convert_attributes(&mut tag.attributes);
        let size_class = numbered.or_else(|| {
            if converted.iter().any(|class_name| is_size_class(class_name)) {
                None
            } else {
                Some(DEFAULT_COLUMN_CLASS.to_string())
            }
        });

        let class_names: Vec<String> = size_class.into_iter().chain(converted).collect();
        tag.name = GRID_ELEMENT.to_string();
        prepend_class_names(&mut tag, &class_names);

        out.push(Token::StartTag(tag));
        if self_closing {
            out.push(Token::end_tag(GRID_ELEMENT));
        }
        out
    }

    fn process_start_tag(&mut self, mut tag: StartTag) -> Vec<Token> {
        let rewritten = is_grid_tag(&tag.name);
        let mut closing = Vec::new();

        if CONTAINER_TAGS.contains(&tag.name.as_str()) {
            let class_name = tag.name.clone();
            tag.name = GRID_ELEMENT.to_string();
            append_class_names(&mut tag, &[class_name]);
        } else if tag.name == CLEARFIX_TAG {
            tag.name = GRID_ELEMENT.to_string();
            append_class_names(&mut tag, &[CLEARFIX_TAG.to_string()]);
        } else if tag.name == ROW_TAG {
            if tag.self_closing {
                // An empty row still gets its column, and no frame is left open
                closing.push(implied_column_start_tag());
                closing.push(Token::end_tag(GRID_ELEMENT));
            } else {
                self.rows.push(RowFrame {
                    column: ColumnState::Expecting,
                    implied_column: false,
                });
            }
            tag.name = GRID_ELEMENT.to_string();
            append_class_names(&mut tag, &[ROW_CLASS.to_string()]);
        }

        // <div/> would leave the div open
        if rewritten && tag.self_closing {
            tag.self_closing = false;
            closing.push(Token::end_tag(GRID_ELEMENT));
        }

        let visibility = RuleSet::visibility().convert_attributes(&mut tag.attributes);
        append_class_names(&mut tag, &visibility);

        let mut out = vec![Token::StartTag(tag)];
        out.extend(closing);
        out
    }

    fn process_row_end_tag(&mut self, out: &mut Vec<Token>) {
        let implied_column = self.rows.pop().is_some_and(|row| row.implied_column);

        // Column and row both map to <div>, so closing the implied column
        // is just one more </div>
        if implied_column {
            out.push(Token::end_tag(GRID_ELEMENT));
        }
        out.push(Token::end_tag(GRID_ELEMENT));
    }
}

impl Expander for GridExpander {
    fn on_start_tag(&mut self, tag: StartTag, _ctx: &Context) -> Vec<Token> {
        if is_column_tag(&tag.name) {
            return self.process_column_start_tag(tag);
        }

        let mut out = Vec::new();
        self.materialize_implied_column(&mut out);
        out.extend(self.process_start_tag(tag));
        out
    }

    fn on_end_tag(&mut self, name: String, _ctx: &Context) -> Vec<Token> {
        let mut out = Vec::new();
        self.materialize_implied_column(&mut out);

        if name == ROW_TAG {
            self.process_row_end_tag(&mut out);
        } else if is_grid_tag(&name) {
            out.push(Token::end_tag(GRID_ELEMENT));
        } else {
            out.push(Token::EndTag { name });
        }
        out
    }

    fn on_text(&mut self, content: String, _ctx: &Context) -> Vec<Token> {
        // Whitespace doesn't decide who adopts it; hold it for now
        if self.expecting_column() && content.trim().is_empty() {
            self.pending.push(Token::Text { content });
            return Vec::new();
        }

        let mut out = Vec::new();
        self.materialize_implied_column(&mut out);
        out.push(Token::Text { content });
        out
    }

    fn on_comment(&mut self, content: String, _ctx: &Context) -> Vec<Token> {
        if self.expecting_column() {
            self.pending.push(Token::Comment { content });
            return Vec::new();
        }
        vec![Token::Comment { content }]
    }

    fn on_doctype(&mut self, content: String, _ctx: &Context) -> Vec<Token> {
        let mut out = Vec::new();
        self.materialize_implied_column(&mut out);
        out.push(Token::Doctype { content });
        out
    }

    fn finish(&mut self, _ctx: &Context) -> Vec<Token> {
        if !self.rows.is_empty() {
            log::warn!(
                "{} row(s) never closed; {} held token(s) dropped",
                self.rows.len(),
                self.pending.len()
            );
        }
        self.rows.clear();
        self.pending.clear();
        Vec::new()
    }

    fn name(&self) -> &'static str {
        "grid"
    }
}

fn implied_column_start_tag() -> Token {
    Token::StartTag(StartTag::new(GRID_ELEMENT).with_attribute("class", IMPLIED_COLUMN_CLASS))
}

fn is_column_tag(name: &str) -> bool {
    name == COLUMN_TAG || NUMBERED_COLUMN_TAG.is_match(name)
}

fn is_grid_tag(name: &str) -> bool {
    CONTAINER_TAGS.contains(&name) || name == CLEARFIX_TAG || name == ROW_TAG || is_column_tag(name)
}

/// `c8` -> `col-md-8`; `None` for the bare `c`
fn numbered_size_class(name: &str) -> Option<String> {
    NUMBERED_COLUMN_TAG
        .captures(name)
        .map(|captures| format!("col-md-{}", &captures[1]))
}

fn class_attribute_mut(tag: &mut StartTag) -> &mut Attribute {
    let index = match tag.attributes.iter().position(|attr| attr.name == "class") {
        Some(index) => index,
        None => {
            tag.attributes.push(Attribute::new("class", ""));
            tag.attributes.len() - 1
        }
    };
    &mut tag.attributes[index]
}

fn set_class_names<'a>(tag: &mut StartTag, class_names: impl Iterator<Item = &'a str>) {
    let joined = class_names.collect::<Vec<_>>().join(" ");
    class_attribute_mut(tag).value = AttributeValue::String(joined);
}

/// Existing classes first, then `class_names`
fn append_class_names(tag: &mut StartTag, class_names: &[String]) {
    if class_names.is_empty() {
        return;
    }
    let existing = existing_class_names(tag);
    set_class_names(
        tag,
        existing
            .iter()
            .map(String::as_str)
            .chain(class_names.iter().map(String::as_str)),
    );
}

/// `class_names` first, then existing classes
fn prepend_class_names(tag: &mut StartTag, class_names: &[String]) {
    if class_names.is_empty() {
        return;
    }
    let existing = existing_class_names(tag);
    set_class_names(
        tag,
        class_names
            .iter()
            .map(String::as_str)
            .chain(existing.iter().map(String::as_str)),
    );
}

fn existing_class_names(tag: &StartTag) -> Vec<String> {
    tag.attribute("class")
        .map(|attr| {
            attr.value_str()
                .split_whitespace()
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
