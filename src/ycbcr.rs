/*
 * Copyright (c) Radzivon Bartoshyk, 2/2025. All rights reserved.
 *
 * Redistribution and use in source and binary forms, with or without modification,
 * are permitted provided that the following conditions are met:
 *
 * 1.  Redistributions of source code must retain the above copyright notice, this
 * list of conditions and the following disclaimer.
 *
 * 2.  Redistributions in binary form must reproduce the above copyright notice,
 * this list of conditions and the following disclaimer in the documentation
 * and/or other materials provided with the distribution.
 *
 * 3.  Neither the name of the copyright holder nor the names of its
 * contributors may be used to endorse or promote products derived from
 * this software without specific prior written permission.
 *
 * THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
 * AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
 * IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
 * DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE
 * FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
 * DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
 * SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
 * CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY,
 * OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
 * OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.
 */
#![forbid(unsafe_code)]
use crate::math::{matrix_invert_3x3, Matrix3x3};
use crate::LumaCoefficients;

/// Full-scale RGB -> YCbCr matrix for a Kr/Kb pair. Y spans [0, 1] for RGB
/// in [0, 1], Cb/Cr span [-0.5, 0.5]; range scaling is applied later during
/// fixed-point quantisation.
pub(crate) fn rgb_to_yuv_matrix(luma: LumaCoefficients) -> Matrix3x3 {
    let cr = luma.kr;
    let cb = luma.kb;
    let cg = 1.0 - cr - cb;
    let bscale = 0.5 / (cb - 1.0);
    let rscale = 0.5 / (cr - 1.0);
    [
        [cr, cg, cb],
        [bscale * cr, bscale * cg, 0.5],
        [0.5, rscale * cg, rscale * cb],
    ]
}

#[inline]
pub(crate) fn yuv_to_rgb_matrix(luma: LumaCoefficients) -> Matrix3x3 {
    matrix_invert_3x3(rgb_to_yuv_matrix(luma))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colorimetry::{luma_coefficients, MatrixCoefficients};
    use crate::math::matrix_mul_vec3;

    #[test]
    fn test_forward_matrix_shape() {
        let luma = luma_coefficients(MatrixCoefficients::Bt709).unwrap();
        let m = rgb_to_yuv_matrix(luma);
        // White maps to Y=1, Cb=Cr=0.
        let white = matrix_mul_vec3(m, [1.0, 1.0, 1.0]);
        assert!((white[0] - 1.0).abs() < 1e-12);
        assert!(white[1].abs() < 1e-12);
        assert!(white[2].abs() < 1e-12);
        // Pure blue and pure red saturate Cb and Cr respectively.
        assert!((matrix_mul_vec3(m, [0.0, 0.0, 1.0])[1] - 0.5).abs() < 1e-12);
        assert!((matrix_mul_vec3(m, [1.0, 0.0, 0.0])[2] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_inverse_canonical_zeros() {
        for matrix in [
            MatrixCoefficients::Bt709,
            MatrixCoefficients::Bt470Bg,
            MatrixCoefficients::Smpte240M,
            MatrixCoefficients::Bt2020Ncl,
        ] {
            let luma = luma_coefficients(matrix).unwrap();
            let inv = yuv_to_rgb_matrix(luma);
            // R has no Cb term, B has no Cr term, Y column is all ones.
            assert!(inv[0][1].abs() < 1e-9, "{:?}", matrix);
            assert!(inv[2][2].abs() < 1e-9, "{:?}", matrix);
            for row in inv.iter() {
                assert!((row[0] - 1.0).abs() < 1e-9, "{:?}", matrix);
            }
        }
    }
}
