//! The "HI" layout.
//!
//! Four unit cubes make up the letters: two vertical bars and a tilted cross
//! bar for the H, and a single bar for the I. The whole H spins about the
//! world Y axis while the I spins in place about its own axis.

use crate::matrix::{Mat4, OPENGL_TO_WGPU};

/// Depth at which the letters sit, applied twice (globally and per part).
pub const OUT_Z: f32 = -8.0;
/// Vertical stretch of the letter bars.
pub const VERT_SCALE: f32 = 4.0;
/// Tilt of the H cross bar about Z, in radians.
pub const CROSS_TILT: f32 = 1.0;

/// Vertical field of view handed to the projection, in radians. `70` wraps
/// past a full turn, so the effective half angle is `35 mod PI`, about 0.44.
pub const FOVY: f32 = 70.0;
pub const Z_NEAR: f32 = 0.1;
pub const Z_FAR: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Part {
    HLeft,
    HRight,
    HCross,
    I,
}

impl Part {
    /// Draw order of the parts.
    pub const ALL: [Part; 4] = [Part::HLeft, Part::HRight, Part::I, Part::HCross];

    pub fn label(&self) -> &'static str {
        match self {
            Part::HLeft => "H left",
            Part::HRight => "H right",
            Part::HCross => "H cross",
            Part::I => "I",
        }
    }

    /// The model-view matrix of this part `elapsed` seconds after start.
    pub fn model_view(&self, elapsed: f32) -> Mat4 {
        let glob_rot = Mat4::rotate_y(elapsed);
        let glob_trans = Mat4::translate(0.0, 0.0, OUT_Z);

        match self {
            Part::HLeft => {
                glob_trans
                    * glob_rot
                    * Mat4::translate(-6.0, 0.0, OUT_Z)
                    * Mat4::scale(1.0, VERT_SCALE, 1.0)
            }
            Part::HRight => {
                glob_trans
                    * glob_rot
                    * Mat4::translate(-2.0, 0.0, OUT_Z)
                    * Mat4::scale(1.0, VERT_SCALE, 1.0)
            }
            // The rotation comes last, so the I turns about its own axis.
            Part::I => {
                glob_trans
                    * Mat4::translate(2.0, 0.0, OUT_Z)
                    * Mat4::scale(1.0, VERT_SCALE, 1.0)
                    * glob_rot
            }
            // translate * rotate * scale
            Part::HCross => {
                glob_trans
                    * glob_rot
                    * Mat4::translate(-4.0, 0.0, OUT_Z)
                    * Mat4::rotate_z(CROSS_TILT)
                    * Mat4::scale(0.5, 4.0, 1.0)
            }
        }
    }
}

/// The OpenGL-convention projection for a framebuffer of the given size.
///
/// A zero height is treated as one pixel so a minimised window still yields a
/// finite matrix.
pub fn projection(width: u32, height: u32) -> Mat4 {
    let aspect = width.max(1) as f32 / height.max(1) as f32;
    Mat4::perspective(FOVY, aspect, Z_NEAR, Z_FAR)
}

/// [`projection`] remapped to wgpu's `0..1` clip depth, ready for upload.
pub fn clip_projection(width: u32, height: u32) -> Mat4 {
    OPENGL_TO_WGPU * projection(width, height)
}
