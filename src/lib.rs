//! Compiler for boot HTML: plain HTML extended with grid shorthands
//! (`<container>`, `<r>`, `<c6 xs12>`...), visibility attributes
//! (`hidden:xs-sm`, `visible-block:md`) and resource blocks (`<js>`,
//! `<css>`) that expand into ordinary markup.

pub mod error;
pub mod html;
pub mod parser;
pub mod serializer;
pub mod transform;

mod pipeline;

use std::fs;
use std::path::Path;

pub use error::{CompileError, ErrorKind, ParseError};
pub use parser::{Attribute, AttributeValue, StartTag, Token};
pub use pipeline::Pipeline;

/// Configuration for compilation.
#[derive(Debug, Clone)]
pub struct Options {
    /// Leave `&amp;`-style references untouched instead of decoding them on
    /// input and re-escaping on output
    pub preserve_character_references: bool,
    /// Expand grid tags and column/visibility attributes
    pub grid: bool,
    /// Expand `<js>`/`<css>` blocks
    pub resource_shorthands: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            preserve_character_references: true,
            grid: true,
            resource_shorthands: true,
        }
    }
}

/// Compile a boot HTML document with default options
pub fn compile(source: &str) -> Result<String, CompileError> {
    compile_with(source, Options::default())
}

pub fn compile_with(source: &str, options: Options) -> Result<String, CompileError> {
    Pipeline::new(options).compile(source)
}

/// Read and compile a file. The caller decides where the output goes.
pub fn compile_file(path: &Path, options: Options) -> Result<String, CompileError> {
    let source = fs::read_to_string(path).map_err(|source| CompileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    compile_with(&source, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_row_with_columns() {
        let output = compile("<r>\n  <c4 xs12>A</c4>\n  <c8>B</c8>\n</r>").unwrap();
        assert_eq!(
            output,
            "<div class=\"row\">\n  <div class=\"col-md-4 col-xs-12\">A</div>\n  <div class=\"col-md-8\">B</div>\n</div>"
        );
    }

    #[test]
    fn test_character_references_preserved_by_default() {
        assert_eq!(compile("<p>&amp; &lt;b&gt;</p>").unwrap(), "<p>&amp; &lt;b&gt;</p>");
    }

    #[test]
    fn test_decoding_round_trips_references() {
        let options = Options {
            preserve_character_references: false,
            ..Options::default()
        };
        assert_eq!(
            compile_with("<p title=\"a &amp; b\">x &lt; y &#65;</p>", options).unwrap(),
            "<p title=\"a &amp; b\">x &lt; y A</p>"
        );
    }

    #[test]
    fn test_parse_errors_surface() {
        let err = compile("<p>\n<!-- never closed").unwrap_err();
        assert!(matches!(
            err,
            CompileError::Parse(ParseError {
                kind: ErrorKind::UnterminatedComment,
                ..
            })
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = compile_file(Path::new("/nonexistent/page.boot.html"), Options::default())
            .unwrap_err();
        assert!(matches!(err, CompileError::Io { .. }));
        assert!(err.to_string().contains("page.boot.html"));
    }
}
