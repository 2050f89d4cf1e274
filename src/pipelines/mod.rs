//! Render pipeline construction.
//!
//! - `basic` builds the depth-tested triangle pipeline
//! - `program` compiles and links the shader stages
//! - `uniform` holds the matrix uniform buffers and their bind groups

pub mod basic;
pub mod program;
pub mod uniform;
