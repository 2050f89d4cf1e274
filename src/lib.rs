//! hi-cubes
//!
//! A small real-time renderer that spells "HI" with four cubes. Every
//! transform is built with the hand-written column-major matrices of
//! [`matrix`] and recomputed from scratch each frame.
//!
//! High-level modules
//! - `app`: the application that reacts to input and animates the letters
//! - `config`: startup configuration and argument handling
//! - `context`: window, surface, device and queue
//! - `data_structures`: GPU meshes, shapes and the depth texture
//! - `flow`: the event loop and the event-callback interface
//! - `matrix`: 4x4 identity, translate, scale, rotate, multiply and perspective
//! - `pipelines`: shader program, render pipeline and matrix uniforms
//! - `render`: per-frame drawing of the scene
//! - `resources`: loading meshes and shader sources from disk
//! - `scene`: placement of the letter parts
//!

pub mod app;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod matrix;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod scene;

pub use matrix::Mat4;
