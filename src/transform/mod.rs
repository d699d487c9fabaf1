mod attribute_rules;
mod element_stack;
mod grid;
mod indent;
mod resource_shorthands;

pub use attribute_rules::{ConversionRule, ModifierPattern, RuleSet};
pub use element_stack::ElementStack;
pub use grid::GridExpander;
pub use indent::IndentTracker;
pub use resource_shorthands::ResourceShorthandExpander;

use crate::parser::{StartTag, Token};

/// Read-only state shared with every expander
#[derive(Debug, Default)]
pub struct Context {
    indent: IndentTracker,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indentation of the latest source text token
    pub fn current_indent(&self) -> &str {
        self.indent.current()
    }
}

/// A per-token rewriting stage.
///
/// Each handler receives one token and returns the tokens that take its
/// place, in order: an empty list suppresses it, extra tokens are inserted
/// around it. Returned tokens continue through the remaining expanders only.
pub trait Expander {
    fn on_start_tag(&mut self, tag: StartTag, _ctx: &Context) -> Vec<Token> {
        vec![Token::StartTag(tag)]
    }

    fn on_end_tag(&mut self, name: String, _ctx: &Context) -> Vec<Token> {
        vec![Token::EndTag { name }]
    }

    fn on_text(&mut self, content: String, _ctx: &Context) -> Vec<Token> {
        vec![Token::Text { content }]
    }

    fn on_comment(&mut self, content: String, _ctx: &Context) -> Vec<Token> {
        vec![Token::Comment { content }]
    }

    fn on_doctype(&mut self, content: String, _ctx: &Context) -> Vec<Token> {
        vec![Token::Doctype { content }]
    }

    /// Called once after the last token
    fn finish(&mut self, _ctx: &Context) -> Vec<Token> {
        Vec::new()
    }

    fn name(&self) -> &'static str;
}

/// Dispatcher that runs tokens through an ordered list of expanders
pub struct Transformer {
    expanders: Vec<Box<dyn Expander>>,
    context: Context,
}

impl Transformer {
    pub fn new() -> Self {
        Self {
            expanders: Vec::new(),
            context: Context::new(),
        }
    }

    pub fn add<E: Expander + 'static>(mut self, expander: E) -> Self {
        self.expanders.push(Box::new(expander));
        self
    }

    pub fn len(&self) -> usize {
        self.expanders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expanders.is_empty()
    }

    /// Run a whole document through the expanders
    pub fn transform(&mut self, tokens: Vec<Token>) -> Vec<Token> {
        let mut output = Vec::with_capacity(tokens.len());

        for token in tokens {
            if let Token::Text { content } = &token {
                self.context.indent.update(content);
            }
            self.dispatch(0, token, &mut output);
        }

        for stage in 0..self.expanders.len() {
            let flushed = self.expanders[stage].finish(&self.context);
            for token in flushed {
                self.dispatch(stage + 1, token, &mut output);
            }
        }

        output
    }

    fn dispatch(&mut self, stage: usize, token: Token, output: &mut Vec<Token>) {
        let Some(expander) = self.expanders.get_mut(stage) else {
            output.push(token);
            return;
        };

        log::trace!(target: "boot.transform", "{} <- {:?}", expander.name(), token);

        let ctx = &self.context;
        let results = match token {
            Token::StartTag(tag) => expander.on_start_tag(tag, ctx),
            Token::EndTag { name } => expander.on_end_tag(name, ctx),
            Token::Text { content } => expander.on_text(content, ctx),
            Token::Comment { content } => expander.on_comment(content, ctx),
            Token::Doctype { content } => expander.on_doctype(content, ctx),
        };

        for result in results {
            self.dispatch(stage + 1, result, output);
        }
    }
}

impl Default for Transformer {
    fn default() -> Self {
        Self::new()
    }
}
