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
use crate::math::{matrix_invert_3x3, matrix_mul_3x3, matrix_mul_vec3, Matrix3x3};
use crate::primaries::Chromaticity;

/// Cone response basis used when mapping between white points.
/// See <http://www.brucelindbloom.com/index.html?Eqn_ChromAdapt.html>.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WhitepointAdaptation {
    Bradford,
    VonKries,
    /// Skip adaptation entirely, even when white points differ.
    Identity,
}

const BRADFORD: Matrix3x3 = [
    [0.8951, 0.2664, -0.1614],
    [-0.7502, 1.7135, 0.0367],
    [0.0389, -0.0685, 1.0296],
];

const VON_KRIES: Matrix3x3 = [
    [0.40024, 0.70760, -0.08081],
    [-0.22630, 1.16532, 0.04570],
    [0.00000, 0.00000, 0.91822],
];

/// Builds the 3x3 matrix mapping XYZ values referenced to `wp_src` into XYZ
/// values referenced to `wp_dst`: `A = M^-1 * diag(d/s) * M` with `s`/`d`
/// the white points pushed through the cone basis `M`.
///
/// Must not be called with [`WhitepointAdaptation::Identity`]; the caller
/// skips the adaptation term in that case.
pub(crate) fn whitepoint_adaptation_matrix(
    wp_adapt: WhitepointAdaptation,
    wp_src: Chromaticity,
    wp_dst: Chromaticity,
) -> Matrix3x3 {
    let ma = match wp_adapt {
        WhitepointAdaptation::Bradford => BRADFORD,
        WhitepointAdaptation::VonKries => VON_KRIES,
        WhitepointAdaptation::Identity => unreachable!("identity skips adaptation"),
    };
    let xw_src = wp_src.x.to_f64();
    let yw_src = wp_src.y.to_f64();
    let xw_dst = wp_dst.x.to_f64();
    let yw_dst = wp_dst.y.to_f64();
    let src = [xw_src, yw_src, 1.0 - xw_src - yw_src];
    let dst = [xw_dst, yw_dst, 1.0 - xw_dst - yw_dst];

    let mai = matrix_invert_3x3(ma);
    let s = matrix_mul_vec3(ma, src);
    let d = matrix_mul_vec3(ma, dst);
    let fac: Matrix3x3 = [
        [d[0] / s[0], 0.0, 0.0],
        [0.0, d[1] / s[1], 0.0],
        [0.0, 0.0, d[2] / s[2]],
    ];
    matrix_mul_3x3(matrix_mul_3x3(mai, fac), ma)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primaries::Rational;

    const D65: Chromaticity = Chromaticity {
        x: Rational {
            num: 3127,
            den: 10000,
        },
        y: Rational {
            num: 3290,
            den: 10000,
        },
    };
    const WP_C: Chromaticity = Chromaticity {
        x: Rational {
            num: 310,
            den: 1000,
        },
        y: Rational {
            num: 316,
            den: 1000,
        },
    };

    #[test]
    fn test_same_whitepoint_is_identity() {
        let m = whitepoint_adaptation_matrix(WhitepointAdaptation::Bradford, D65, D65);
        for (i, row) in m.iter().enumerate() {
            for (j, value) in row.iter().enumerate() {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((value - expected).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_adaptation_maps_source_white_to_destination_white() {
        for adapt in [WhitepointAdaptation::Bradford, WhitepointAdaptation::VonKries] {
            let m = whitepoint_adaptation_matrix(adapt, WP_C, D65);
            let src = [0.310, 0.316, 1.0 - 0.310 - 0.316];
            let mapped = crate::math::matrix_mul_vec3(m, src);
            let dst = [0.3127, 0.3290, 1.0 - 0.3127 - 0.3290];
            for (a, b) in mapped.iter().zip(dst.iter()) {
                assert!((a - b).abs() < 1e-9, "{} vs {}", a, b);
            }
        }
    }
}
