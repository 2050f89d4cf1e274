//! Engine data structures: GPU meshes, shapes and textures.
//!
//! - `shape` contains the uploaded meshes and the shapes placed in the scene
//! - `texture` contains the depth buffer used for depth testing

pub mod shape;
pub mod texture;
