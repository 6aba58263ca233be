//! Built-in reference data

pub mod amino_acids;
