//! Input of graph corpus and output of embedding results.

pub mod dataset;

pub mod output;

pub mod csv;

pub mod bson;
