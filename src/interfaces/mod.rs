//! Input and output adapters for the batch binary.

pub mod csv;
pub mod json;
