//! Dictation adapters. Implement DictationSource.

pub mod line_source;

pub use line_source::LineDictationSource;
