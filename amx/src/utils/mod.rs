//! Supporting infrastructure.
//!
//! Little-endian byte serialization and the error types shared by the codec
//! and the pipeline.

pub mod byteorder;
pub mod errors;
