//! Model loading and saving.
//!
//! - [`csv`]: line-oriented replay format, one builder call per record

pub mod csv;

pub use csv::{load_into, load_model, write_model, LoadError, LoadSummary};
