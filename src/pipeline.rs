use crate::Options;
use crate::error::CompileError;
use crate::parser::{Token, TokenizerOptions, tokenize};
use crate::serializer::{SerializeOptions, serialize};
use crate::transform::{GridExpander, ResourceShorthandExpander, Transformer};

/// Tokenize -> expand -> serialize.
///
/// Expanders carry per-document state, so every `compile` call builds a
/// fresh transformer; one pipeline can compile any number of documents.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    options: Options,
}

impl Pipeline {
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    /// Pipeline with every expander enabled
    pub fn standard() -> Self {
        Self::new(Options::default())
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn compile(&self, source: &str) -> Result<String, CompileError> {
        let tokens = self.tokens(source)?;

        let mut transformer = self.transformer();
        log::debug!(
            "compiling {} token(s) through {} expander(s)",
            tokens.len(),
            transformer.len()
        );
        let tokens = transformer.transform(tokens);

        Ok(serialize(
            &tokens,
            SerializeOptions {
                escape: !self.options.preserve_character_references,
            },
        ))
    }

    /// Source token stream, before any expansion
    pub fn tokens(&self, source: &str) -> Result<Vec<Token>, CompileError> {
        let tokens = tokenize(
            source,
            TokenizerOptions {
                decode_character_references: !self.options.preserve_character_references,
            },
        )?;
        Ok(tokens)
    }

    fn transformer(&self) -> Transformer {
        let mut transformer = Transformer::new();
        // Shorthands run first so the includes they emit pass through grid
        if self.options.resource_shorthands {
            transformer = transformer.add(ResourceShorthandExpander::new());
        }
        if self.options.grid {
            transformer = transformer.add(GridExpander::new());
        }
        transformer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_is_reusable() {
        let pipeline = Pipeline::standard();
        let first = pipeline.compile("<r><c>a</c></r>").unwrap();
        let second = pipeline.compile("<r><c>a</c></r>").unwrap();
        assert_eq!(first, second);
        assert_eq!(
            first,
            r#"<div class="row"><div class="col-md-1">a</div></div>"#
        );
    }

    #[test]
    fn test_disabled_expanders_pass_through() {
        let pipeline = Pipeline::new(Options {
            grid: false,
            resource_shorthands: false,
            ..Options::default()
        });
        let source = "<r><c>x</c></r><js>a.js</js>";
        assert_eq!(pipeline.compile(source).unwrap(), source);
    }

    #[test]
    fn test_shorthands_expand_before_grid() {
        let pipeline = Pipeline::standard();
        assert_eq!(
            pipeline.compile("<r><css>a.css</css></r>").unwrap(),
            r#"<div class="row"><div class="col-md-12"><link href="a.css" rel="stylesheet"></div></div>"#
        );
    }

    #[test]
    fn test_tokens_are_unexpanded() {
        let pipeline = Pipeline::standard();
        let tokens = pipeline.tokens("<c1>").unwrap();
        assert_eq!(tokens, vec![Token::StartTag(crate::parser::StartTag::new("c1"))]);
    }
}
