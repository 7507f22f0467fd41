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
//! Colorspace conversion for planar video frames.
//!
//! Converts between YCbCr matrices, color primaries, transfer
//! characteristics and TV/PC ranges, optionally changing bit depth and
//! chroma subsampling layout. Supported formats are planar YUV 4:2:0, 4:2:2
//! and 4:4:4 at 8, 10 and 12 bits, and planar G-B-R(A) at half and single
//! float precision; conversions never cross the YUV/RGB family boundary.
//!
//! Integer formats run through a fixed-point pipeline: YUV is expanded to an
//! int16 linear-light RGB intermediate ([0.0, 1.0] spanning [0, 28672], the
//! rest of the range kept as headroom), tone curves are applied through
//! 32768-entry LUTs, primaries are mapped with a 14-bit fractional 3x3
//! matrix and the result is quantised back with optional Floyd-Steinberg
//! style dithering. Half-float frames use 65536-entry bit-pattern LUTs;
//! single-float frames evaluate the transfer closed forms per pixel. When
//! only matrix, range or depth change, the whole pipeline collapses into a
//! single composed YUV->YUV matrix, or a plain copy when nothing changes at
//! all.
//!
//! Chroma is resampled nearest-neighbour in both directions. Convert to
//! 4:4:4 with a real scaler first when that matters.

mod chromatic_adaptation;
mod colorimetry;
mod convert_error;
mod engine;
mod gamma_lut;
mod images;
mod lrgb_to_yuv;
mod math;
mod options;
mod pixel_format;
mod planner;
mod primaries;
mod rgb_ops;
mod scratch;
mod transfer;
mod ycbcr;
mod yuv_to_lrgb;
mod yuv_to_yuv;

pub use chromatic_adaptation::WhitepointAdaptation;
pub use colorimetry::{
    luma_coefficients, range_scale, ColorMetadata, ColorPrimaries, ColorRange, ColorspacePreset,
    LumaCoefficients, MatrixCoefficients, RangeScale, TransferCharacteristic,
};
pub use convert_error::{ConvertError, MismatchedSize};
pub use engine::ColorspaceConverter;
pub use images::{PlaneRef, PlaneRefMut, VideoFrame, VideoFrameMut};
pub use options::{ConverterOptions, DitherMode};
pub use pixel_format::PixelFormat;
pub use primaries::{primaries_desc, Chromaticity, ColorPrimariesDesc, Rational};
pub use transfer::{TransferCharacteristics, TrcFunction};
