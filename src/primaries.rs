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
use crate::chromatic_adaptation::{whitepoint_adaptation_matrix, WhitepointAdaptation};
use crate::math::{matrix_invert_3x3, matrix_mul_3x3, Matrix3x3};
use crate::ColorPrimaries;

/// Exact rational, so two descriptions compare without float equality traps.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Rational {
    pub num: i32,
    pub den: i32,
}

impl Rational {
    #[inline]
    pub const fn new(num: i32, den: i32) -> Rational {
        Rational { num, den }
    }

    #[inline]
    pub fn to_f64(self) -> f64 {
        self.num as f64 / self.den as f64
    }
}

/// CIE 1931 xy coordinate.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Chromaticity {
    pub x: Rational,
    pub y: Rational,
}

const fn xy(x_num: i32, y_num: i32) -> Chromaticity {
    Chromaticity {
        x: Rational::new(x_num, 100_000),
        y: Rational::new(y_num, 100_000),
    }
}

/// Chromaticities of the red, green and blue primaries plus the reference
/// white, fully describing an RGB color volume.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ColorPrimariesDesc {
    pub red: Chromaticity,
    pub green: Chromaticity,
    pub blue: Chromaticity,
    pub white: Chromaticity,
}

const WHITE_D65: Chromaticity = xy(31_270, 32_900);
const WHITE_C: Chromaticity = xy(31_000, 31_600);
const WHITE_DCI: Chromaticity = xy(31_400, 35_100);
const WHITE_E: Chromaticity = Chromaticity {
    x: Rational::new(1, 3),
    y: Rational::new(1, 3),
};

/// Chromaticities for each named set of primaries, per ITU-R H.273.
pub const fn primaries_desc(primaries: ColorPrimaries) -> Option<ColorPrimariesDesc> {
    match primaries {
        ColorPrimaries::Bt709 => Some(ColorPrimariesDesc {
            red: xy(64_000, 33_000),
            green: xy(30_000, 60_000),
            blue: xy(15_000, 6_000),
            white: WHITE_D65,
        }),
        ColorPrimaries::Bt470M => Some(ColorPrimariesDesc {
            red: xy(67_000, 33_000),
            green: xy(21_000, 71_000),
            blue: xy(14_000, 8_000),
            white: WHITE_C,
        }),
        ColorPrimaries::Bt470Bg => Some(ColorPrimariesDesc {
            red: xy(64_000, 33_000),
            green: xy(29_000, 60_000),
            blue: xy(15_000, 6_000),
            white: WHITE_D65,
        }),
        ColorPrimaries::Smpte170M | ColorPrimaries::Smpte240M => Some(ColorPrimariesDesc {
            red: xy(63_000, 34_000),
            green: xy(31_000, 59_500),
            blue: xy(15_500, 7_000),
            white: WHITE_D65,
        }),
        ColorPrimaries::Film => Some(ColorPrimariesDesc {
            red: xy(68_100, 31_900),
            green: xy(24_300, 69_200),
            blue: xy(14_500, 4_900),
            white: WHITE_C,
        }),
        ColorPrimaries::Bt2020 => Some(ColorPrimariesDesc {
            red: xy(70_800, 29_200),
            green: xy(17_000, 79_700),
            blue: xy(13_100, 4_600),
            white: WHITE_D65,
        }),
        ColorPrimaries::Smpte428 => Some(ColorPrimariesDesc {
            red: xy(73_500, 26_500),
            green: xy(27_400, 71_800),
            blue: xy(16_700, 900),
            white: WHITE_E,
        }),
        ColorPrimaries::Smpte431 => Some(ColorPrimariesDesc {
            red: xy(68_000, 32_000),
            green: xy(26_500, 69_000),
            blue: xy(15_000, 6_000),
            white: WHITE_DCI,
        }),
        ColorPrimaries::Smpte432 => Some(ColorPrimariesDesc {
            red: xy(68_000, 32_000),
            green: xy(26_500, 69_000),
            blue: xy(15_000, 6_000),
            white: WHITE_D65,
        }),
        ColorPrimaries::Ebu3213 => Some(ColorPrimariesDesc {
            red: xy(63_000, 34_000),
            green: xy(29_500, 60_500),
            blue: xy(15_500, 7_700),
            white: WHITE_D65,
        }),
        ColorPrimaries::Unspecified => None,
    }
}

/// RGB -> XYZ for a primary set: columns are the primaries' XYZ directions,
/// scaled so that RGB (1,1,1) lands exactly on the white point.
pub(crate) fn rgb_to_xyz_matrix(desc: &ColorPrimariesDesc) -> Matrix3x3 {
    let xr = desc.red.x.to_f64();
    let yr = desc.red.y.to_f64();
    let xg = desc.green.x.to_f64();
    let yg = desc.green.y.to_f64();
    let xb = desc.blue.x.to_f64();
    let yb = desc.blue.y.to_f64();
    let xw = desc.white.x.to_f64();
    let yw = desc.white.y.to_f64();

    let chroma: Matrix3x3 = [
        [xr / yr, xg / yg, xb / yb],
        [1.0, 1.0, 1.0],
        [(1.0 - xr - yr) / yr, (1.0 - xg - yg) / yg, (1.0 - xb - yb) / yb],
    ];
    let inverse = matrix_invert_3x3(chroma);
    let white = [xw / yw, 1.0, (1.0 - xw - yw) / yw];
    let sr = inverse[0][0] * white[0] + inverse[0][1] * white[1] + inverse[0][2] * white[2];
    let sg = inverse[1][0] * white[0] + inverse[1][1] * white[1] + inverse[1][2] * white[2];
    let sb = inverse[2][0] * white[0] + inverse[2][1] * white[1] + inverse[2][2] * white[2];
    [
        [chroma[0][0] * sr, chroma[0][1] * sg, chroma[0][2] * sb],
        [chroma[1][0] * sr, chroma[1][1] * sg, chroma[1][2] * sb],
        [chroma[2][0] * sr, chroma[2][1] * sg, chroma[2][2] * sb],
    ]
}

/// Linear RGB -> linear RGB mapping between two primary sets:
/// `(RGB->XYZ)_out^-1 * A * (RGB->XYZ)_in`, with the chromatic adaptation
/// term `A` present only when white points differ and adaptation is not
/// identity.
pub(crate) fn primary_mapping_matrix(
    in_desc: &ColorPrimariesDesc,
    out_desc: &ColorPrimariesDesc,
    wp_adapt: WhitepointAdaptation,
) -> Matrix3x3 {
    let rgb2xyz_in = rgb_to_xyz_matrix(in_desc);
    let xyz2rgb_out = matrix_invert_3x3(rgb_to_xyz_matrix(out_desc));
    if in_desc.white != out_desc.white && wp_adapt != WhitepointAdaptation::Identity {
        let adaptation = whitepoint_adaptation_matrix(wp_adapt, in_desc.white, out_desc.white);
        matrix_mul_3x3(matrix_mul_3x3(xyz2rgb_out, adaptation), rgb2xyz_in)
    } else {
        matrix_mul_3x3(xyz2rgb_out, rgb2xyz_in)
    }
}
