// Text parsers for user-entered configuration

pub mod color;
pub mod fields;
pub mod lexer;

// Public API re-exports
pub use color::parse_color;
pub use fields::{parse_field_mapping, parse_fields};
