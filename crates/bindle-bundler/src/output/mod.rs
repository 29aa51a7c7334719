//! Artifact output.

pub mod writer;

pub use writer::write_artifact;
