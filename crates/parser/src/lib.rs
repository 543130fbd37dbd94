//! Tree-sitter based structural extraction for docsmith
//!
//! Reports the top-level functions, classes and imports of a source file.
//! Syntax errors come back as an error report instead of failing.
//!
//! # Example
//! ```ignore
//! use parser::{Language, StructureExtractor};
//!
//! let mut extractor = StructureExtractor::new();
//! let report = extractor.analyze(code, &Language::Python);
//! ```

mod parser;
mod python;

pub use parser::{StructureExtractor, analyze};

// Re-export for convenience
pub use docsmith_core::Language;
