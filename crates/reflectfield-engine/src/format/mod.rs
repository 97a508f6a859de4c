//! Value formatting for compiled field values.
//!
//! The formatter turns the substituted template into the stored
//! `value_formatted` and derives the handle:
//!
//! 1. **Transform**: run the selected [`TextFormatter`] from the [`FormatterRegistry`].
//! 2. **Repair**: escape ampersands the transformer left bare.
//! 3. **Fallback**: [`sanitize`] the raw value when nothing usable came back.
//! 4. **Handle**: [`create_handle`] slugs the raw value.

pub mod formatter;
pub mod registry;
pub mod slug;

pub use formatter::{ValueFormatter, escape_ampersands, sanitize};
pub use registry::{FormatterRegistry, FormatterSelection, TextFormatter};
pub use slug::{DEFAULT_HANDLE_MAX_LENGTH, create_handle};
