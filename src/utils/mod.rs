//! Utility modules for common functionality
//!
//! Provides reusable utilities for file operations and text handling.

pub mod fs;
pub mod text;

pub use fs::FileSystemUtils;
pub use text::Tokenizer;
