//! Content generator helpers

pub mod prompt_builder;
