//! Expression template compilation.
//!
//! A template is free text with `{path}` placeholders. Compilation runs in
//! three stages:
//!
//! 1. **Extraction**: collect the distinct `{...}` spans.
//! 2. **Normalization**: rewrite each span into a path query relative to the
//!    document's root element.
//! 3. **Resolution**: evaluate `string(path)` through the [`PathResolver`] and
//!    substitute the trimmed results back into the template.

pub mod compiler;
pub mod placeholder;
pub mod resolver;

pub use compiler::ExpressionCompiler;
pub use placeholder::{extract_placeholders, normalize};
pub use resolver::PathResolver;
