//! Small numerical utilities.

pub mod cosine;
