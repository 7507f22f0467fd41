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

/// Matrix coefficients as specified in [ITU-R H.273](https://www.itu.int/rec/T-REC-H.273/en),
/// declaring the YCbCr <-> RGB transform of a stream.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MatrixCoefficients {
    Unspecified,
    Bt709,
    Fcc,
    Bt470Bg,
    Smpte170M,
    Smpte240M,
    Bt2020Ncl,
    /// GBR identity, listed for completeness; there are no luma coefficients
    /// to derive from it.
    Rgb,
    YCgCo,
}

/// Color primaries as specified in [ITU-R H.273](https://www.itu.int/rec/T-REC-H.273/en).
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ColorPrimaries {
    Unspecified,
    Bt709,
    Bt470M,
    Bt470Bg,
    Smpte170M,
    Smpte240M,
    Film,
    Bt2020,
    Smpte428,
    Smpte431,
    Smpte432,
    Ebu3213,
}

/// Transfer characteristics as specified in [ITU-R H.273](https://www.itu.int/rec/T-REC-H.273/en).
///
/// Tags without an analytic alpha/beta/gamma/delta parameterisation
/// (SMPTE 2084, the log families, BT.1361, SMPTE 428) may only appear on the
/// output side, backed by a caller supplied delinearisation function.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TransferCharacteristic {
    Unspecified,
    Bt709,
    Gamma22,
    Gamma28,
    Smpte170M,
    Smpte240M,
    Linear,
    Srgb,
    Xvycc,
    Bt2020_10,
    Bt2020_12,
    Smpte2084,
    Smpte428,
    Log,
    LogSqrt,
    Bt1361,
}

/// Declares YUV range, TV (limited) or PC (full).
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ColorRange {
    /// Resolved to TV with a one-shot warning.
    Unspecified,
    /// Limited range, Y in [16 << (depth - 8), 235 << (depth - 8)].
    Tv,
    /// Full range, Y in [0, (1 << depth) - 1].
    Pc,
}

/// Colorimetric tags carried by a frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ColorMetadata {
    pub matrix: MatrixCoefficients,
    pub primaries: ColorPrimaries,
    pub transfer: TransferCharacteristic,
    pub range: ColorRange,
}

impl Default for ColorMetadata {
    fn default() -> Self {
        ColorMetadata {
            matrix: MatrixCoefficients::Unspecified,
            primaries: ColorPrimaries::Unspecified,
            transfer: TransferCharacteristic::Unspecified,
            range: ColorRange::Unspecified,
        }
    }
}

/// Kr/Kb pair defining a YCbCr matrix; Kg is always `1 - kr - kb`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LumaCoefficients {
    pub kr: f64,
    pub kb: f64,
}

/// Luma coefficients for the matrices that have them. Identity (GBR) and
/// YCgCo deliberately resolve to `None`.
pub const fn luma_coefficients(matrix: MatrixCoefficients) -> Option<LumaCoefficients> {
    match matrix {
        MatrixCoefficients::Bt709 => Some(LumaCoefficients {
            kr: 0.2126,
            kb: 0.0722,
        }),
        MatrixCoefficients::Fcc => Some(LumaCoefficients { kr: 0.30, kb: 0.11 }),
        MatrixCoefficients::Bt470Bg | MatrixCoefficients::Smpte170M => Some(LumaCoefficients {
            kr: 0.299,
            kb: 0.114,
        }),
        MatrixCoefficients::Smpte240M => Some(LumaCoefficients {
            kr: 0.212,
            kb: 0.087,
        }),
        MatrixCoefficients::Bt2020Ncl => Some(LumaCoefficients {
            kr: 0.2627,
            kb: 0.0593,
        }),
        MatrixCoefficients::Unspecified | MatrixCoefficients::Rgb | MatrixCoefficients::YCgCo => {
            None
        }
    }
}

/// Black level offset and code value spans for one side of the conversion.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RangeScale {
    pub offset: i32,
    pub y_range: i32,
    pub uv_range: i32,
}

/// Range scaling for a resolved (non `Unspecified`) range. The caller is
/// responsible for the one-shot warning when it substitutes TV for an
/// unspecified range.
pub const fn range_scale(range: ColorRange, depth: u32) -> RangeScale {
    match range {
        ColorRange::Tv | ColorRange::Unspecified => RangeScale {
            offset: 16 << (depth - 8),
            y_range: 219 << (depth - 8),
            uv_range: 224 << (depth - 8),
        },
        ColorRange::Pc => RangeScale {
            offset: 0,
            y_range: (1 << depth) - 1,
            uv_range: (1 << depth) - 1,
        },
    }
}

/// Named colorspace shorthands, each expanding to a canonical
/// (matrix, primaries, transfer) triple.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ColorspacePreset {
    Unspecified,
    Bt470M,
    Bt470Bg,
    Bt601_6_525,
    Bt601_6_625,
    Bt709,
    Smpte170M,
    Smpte240M,
    Bt2020,
}

impl ColorspacePreset {
    pub const fn matrix(self) -> MatrixCoefficients {
        match self {
            ColorspacePreset::Unspecified => MatrixCoefficients::Unspecified,
            ColorspacePreset::Bt470M => MatrixCoefficients::Smpte170M,
            ColorspacePreset::Bt470Bg => MatrixCoefficients::Bt470Bg,
            ColorspacePreset::Bt601_6_525 => MatrixCoefficients::Smpte170M,
            ColorspacePreset::Bt601_6_625 => MatrixCoefficients::Bt470Bg,
            ColorspacePreset::Bt709 => MatrixCoefficients::Bt709,
            ColorspacePreset::Smpte170M => MatrixCoefficients::Smpte170M,
            ColorspacePreset::Smpte240M => MatrixCoefficients::Smpte240M,
            ColorspacePreset::Bt2020 => MatrixCoefficients::Bt2020Ncl,
        }
    }

    pub const fn primaries(self) -> ColorPrimaries {
        match self {
            ColorspacePreset::Unspecified => ColorPrimaries::Unspecified,
            ColorspacePreset::Bt470M => ColorPrimaries::Bt470M,
            ColorspacePreset::Bt470Bg => ColorPrimaries::Bt470Bg,
            ColorspacePreset::Bt601_6_525 => ColorPrimaries::Smpte170M,
            ColorspacePreset::Bt601_6_625 => ColorPrimaries::Bt470Bg,
            ColorspacePreset::Bt709 => ColorPrimaries::Bt709,
            ColorspacePreset::Smpte170M => ColorPrimaries::Smpte170M,
            ColorspacePreset::Smpte240M => ColorPrimaries::Smpte240M,
            ColorspacePreset::Bt2020 => ColorPrimaries::Bt2020,
        }
    }

    pub const fn transfer(self) -> TransferCharacteristic {
        match self {
            ColorspacePreset::Unspecified => TransferCharacteristic::Unspecified,
            ColorspacePreset::Bt470M => TransferCharacteristic::Gamma22,
            ColorspacePreset::Bt470Bg => TransferCharacteristic::Gamma28,
            ColorspacePreset::Bt601_6_525 => TransferCharacteristic::Smpte170M,
            ColorspacePreset::Bt601_6_625 => TransferCharacteristic::Smpte170M,
            ColorspacePreset::Bt709 => TransferCharacteristic::Bt709,
            ColorspacePreset::Smpte170M => TransferCharacteristic::Smpte170M,
            ColorspacePreset::Smpte240M => TransferCharacteristic::Smpte240M,
            ColorspacePreset::Bt2020 => TransferCharacteristic::Bt2020_10,
        }
    }
}
