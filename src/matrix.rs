//! Hand-written 4x4 transformation matrices.
//!
//! [`Mat4`] stores sixteen `f32`s in column-major order, the layout both OpenGL
//! and WGSL's `mat4x4<f32>` expect:
//!
//! ```text
//! [ 0  4  8 12]
//! [ 1  5  9 13]
//! [ 2  6 10 14]
//! [ 3  7 11 15]
//! ```
//!
//! The element in row `i` and column `j` lives at index `i + 4 * j`. All
//! constructors are closed-form and build a fresh matrix, so a frame can
//! recompute every transform from scratch.

use std::{
    fmt,
    ops::{Index, Mul},
};

/// Remaps OpenGL clip-space depth (`-1..1`) to the `0..1` range wgpu uses.
///
/// [`Mat4::perspective`] produces an OpenGL-style matrix; multiply it from the
/// left with this one before uploading it.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU: Mat4 = Mat4([
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
]);

/// A column-major 4x4 matrix of `f32`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Mat4(pub [f32; 16]);

#[inline]
const fn idx(row: usize, col: usize) -> usize {
    row + 4 * col
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4([
        1.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ]);

    pub const fn zero() -> Self {
        Mat4([0.0; 16])
    }

    pub const fn identity() -> Self {
        Self::IDENTITY
    }

    /// Translation by `(x, y, z)`, stored in the last column.
    pub fn translate(x: f32, y: f32, z: f32) -> Self {
        let mut t = Self::IDENTITY;
        t.0[idx(0, 3)] = x;
        t.0[idx(1, 3)] = y;
        t.0[idx(2, 3)] = z;
        t
    }

    pub fn scale(x: f32, y: f32, z: f32) -> Self {
        let mut s = Self::zero();
        s.0[idx(0, 0)] = x;
        s.0[idx(1, 1)] = y;
        s.0[idx(2, 2)] = z;
        s.0[idx(3, 3)] = 1.0;
        s
    }

    /// Right-handed rotation about the X axis.
    pub fn rotate_x(radians: f32) -> Self {
        let (s, c) = radians.sin_cos();
        let mut r = Self::zero();
        r.0[idx(0, 0)] = 1.0;
        r.0[idx(1, 1)] = c;
        r.0[idx(1, 2)] = -s;
        r.0[idx(2, 1)] = s;
        r.0[idx(2, 2)] = c;
        r.0[idx(3, 3)] = 1.0;
        r
    }

    /// Right-handed rotation about the Y axis.
    pub fn rotate_y(radians: f32) -> Self {
        let (s, c) = radians.sin_cos();
        let mut r = Self::zero();
        r.0[idx(0, 0)] = c;
        r.0[idx(0, 2)] = s;
        r.0[idx(1, 1)] = 1.0;
        r.0[idx(2, 0)] = -s;
        r.0[idx(2, 2)] = c;
        r.0[idx(3, 3)] = 1.0;
        r
    }

    /// Right-handed rotation about the Z axis.
    pub fn rotate_z(radians: f32) -> Self {
        let (s, c) = radians.sin_cos();
        let mut r = Self::zero();
        r.0[idx(0, 0)] = c;
        r.0[idx(0, 1)] = -s;
        r.0[idx(1, 0)] = s;
        r.0[idx(1, 1)] = c;
        r.0[idx(2, 2)] = 1.0;
        r.0[idx(3, 3)] = 1.0;
        r
    }

    /// The gluPerspective projection.
    ///
    /// `fovy` is the full vertical field of view in radians. The result maps
    /// view-space depth `-near..-far` to OpenGL clip depth `-1..1`; see
    /// [`OPENGL_TO_WGPU`] for the wgpu depth convention.
    pub fn perspective(fovy: f32, aspect: f32, z_near: f32, z_far: f32) -> Self {
        let f = 1.0 / (0.5 * fovy).tan();
        let mut m = Self::zero();
        m.0[0] = f / aspect;
        m.0[5] = f;
        m.0[10] = (z_far + z_near) / (z_near - z_far);
        m.0[11] = -1.0;
        m.0[14] = 2.0 * z_far * z_near / (z_near - z_far);
        m
    }

    /// `self * rhs`: element (i, k) is the dot product of row i of `self`
    /// and column k of `rhs`.
    pub fn mul_mat(&self, rhs: &Mat4) -> Mat4 {
        let mut c = Self::zero();
        for row in 0..4 {
            for col in 0..4 {
                c.0[idx(row, col)] = (0..4)
                    .map(|j| self.0[idx(row, j)] * rhs.0[idx(j, col)])
                    .sum();
            }
        }
        c
    }

    pub fn transpose(&self) -> Mat4 {
        let mut t = Self::zero();
        for row in 0..4 {
            for col in 0..4 {
                t.0[idx(col, row)] = self.0[idx(row, col)];
            }
        }
        t
    }

    /// Applies the matrix to the point `(x, y, z, 1)` and returns the full
    /// homogeneous result.
    pub fn transform_point(&self, p: [f32; 3]) -> [f32; 4] {
        let v = [p[0], p[1], p[2], 1.0];
        let mut out = [0.0; 4];
        for (row, o) in out.iter_mut().enumerate() {
            *o = (0..4).map(|j| self.0[idx(row, j)] * v[j]).sum();
        }
        out
    }

    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.0[idx(row, col)]
    }

    /// Element-wise comparison with an absolute tolerance.
    pub fn approx_eq(&self, other: &Mat4, epsilon: f32) -> bool {
        self.0
            .iter()
            .zip(other.0.iter())
            .all(|(a, b)| (a - b).abs() <= epsilon)
    }

    /// Renders the matrix like [`fmt::Display`], wrapped as `name=[ ... ];`.
    pub fn to_named_string(&self, name: &str) -> String {
        format!("{}=[\n{}];\n", name, self)
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Mat4 {
    type Output = Mat4;

    fn mul(self, rhs: Mat4) -> Self::Output {
        self.mul_mat(&rhs)
    }
}

impl<'a, 'b> Mul<&'b Mat4> for &'a Mat4 {
    type Output = Mat4;

    fn mul(self, rhs: &'b Mat4) -> Self::Output {
        self.mul_mat(rhs)
    }
}

impl Index<(usize, usize)> for Mat4 {
    type Output = f32;

    fn index(&self, (row, col): (usize, usize)) -> &Self::Output {
        &self.0[idx(row, col)]
    }
}

// C's `%- 5.2f`: left aligned, width 5, a space where the sign of a
// non-negative value would go. Negative zero keeps its sign.
fn fmt_element(v: f32) -> String {
    let s = if v.is_sign_negative() {
        format!("{:.2}", v)
    } else {
        format!(" {:.2}", v)
    };
    format!("{:<5}", s)
}

impl fmt::Display for Mat4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..4 {
            for col in 0..4 {
                write!(f, "{} ", fmt_element(self.get(row, col)))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl From<cgmath::Matrix4<f32>> for Mat4 {
    fn from(m: cgmath::Matrix4<f32>) -> Self {
        let cols: [[f32; 4]; 4] = m.into();
        Mat4(bytemuck::cast(cols))
    }
}

impl From<Mat4> for cgmath::Matrix4<f32> {
    fn from(m: Mat4) -> Self {
        let cols: [[f32; 4]; 4] = bytemuck::cast(m.0);
        cols.into()
    }
}
