// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A column-major 4x4 matrix, laid out for direct upload as a shader uniform.

use std::ops::Mul;

/// A 4x4 column-major matrix.
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct Mat4 {
    /// The four columns of the matrix.
    pub cols: [[f32; 4]; 4],
}

impl Mat4 {
    /// The identity matrix.
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Creates a matrix from its columns.
    #[inline]
    pub const fn from_cols(cols: [[f32; 4]; 4]) -> Self {
        Self { cols }
    }

    /// Creates a translation matrix.
    pub fn from_translation(x: f32, y: f32, z: f32) -> Self {
        let mut m = Self::IDENTITY;
        m.cols[3] = [x, y, z, 1.0];
        m
    }

    /// Right-handed orthographic projection mapping depth to `[0, 1]`.
    pub fn orthographic_rh(
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    ) -> Self {
        let rcp_width = 1.0 / (right - left);
        let rcp_height = 1.0 / (top - bottom);
        let r = 1.0 / (near - far);
        Self::from_cols([
            [2.0 * rcp_width, 0.0, 0.0, 0.0],
            [0.0, 2.0 * rcp_height, 0.0, 0.0],
            [0.0, 0.0, r, 0.0],
            [
                -(left + right) * rcp_width,
                -(top + bottom) * rcp_height,
                r * near,
                1.0,
            ],
        ])
    }

    /// Returns element `(row, col)`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.cols[col][row]
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Mat4 {
    type Output = Mat4;

    fn mul(self, rhs: Mat4) -> Mat4 {
        let mut out = [[0.0f32; 4]; 4];
        for (c, out_col) in out.iter_mut().enumerate() {
            for (r, value) in out_col.iter_mut().enumerate() {
                *value = (0..4).map(|k| self.get(r, k) * rhs.get(k, c)).sum();
            }
        }
        Mat4::from_cols(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn identity_is_neutral() {
        let t = Mat4::from_translation(1.0, 2.0, 3.0);
        assert_eq!(Mat4::IDENTITY * t, t);
        assert_eq!(t * Mat4::IDENTITY, t);
    }

    #[test]
    fn translations_compose() {
        let t = Mat4::from_translation(1.0, 0.0, 0.0) * Mat4::from_translation(0.0, 2.0, 0.0);
        assert_eq!(t.cols[3], [1.0, 2.0, 0.0, 1.0]);
    }

    #[test]
    fn orthographic_maps_corners_to_clip_space() {
        let m = Mat4::orthographic_rh(0.0, 800.0, 0.0, 600.0, -1.0, 1.0);
        // x' = 2/800 * 800 - 1
        assert_relative_eq!(m.get(0, 0) * 800.0 + m.get(0, 3), 1.0, epsilon = 1e-6);
        assert_relative_eq!(m.get(1, 1) * 0.0 + m.get(1, 3), -1.0, epsilon = 1e-6);
    }
}
