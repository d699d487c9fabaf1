mod entities;
pub mod tokenizer;

pub use tokenizer::{
    Attribute, AttributeValue, Position, Span, StartTag, Token, Tokenizer, TokenizerOptions,
    tokenize,
};
