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
use crate::chromatic_adaptation::WhitepointAdaptation;
use crate::colorimetry::{
    ColorPrimaries, ColorRange, ColorspacePreset, MatrixCoefficients, TransferCharacteristic,
};
use crate::pixel_format::PixelFormat;
use crate::transfer::TrcFunction;

/// Dithering applied while quantising RGB back to YUV.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DitherMode {
    None,
    /// Floyd-Steinberg style error diffusion.
    Fsb,
}

/// Converter configuration. Output-side fields describe the colorimetry to
/// produce; `i`-prefixed fields override what the input frames claim about
/// themselves.
#[derive(Debug, Clone, Copy)]
pub struct ConverterOptions {
    /// Expands to output (matrix, primaries, transfer) at once; individual
    /// overrides below still win.
    pub all: ColorspacePreset,
    /// Input-side preset override.
    pub iall: ColorspacePreset,
    pub space: MatrixCoefficients,
    pub ispace: MatrixCoefficients,
    pub range: ColorRange,
    pub irange: ColorRange,
    pub primaries: ColorPrimaries,
    pub iprimaries: ColorPrimaries,
    pub trc: TransferCharacteristic,
    pub itrc: TransferCharacteristic,
    /// When set, planning fails unless the output frame uses exactly this
    /// format.
    pub format: Option<PixelFormat>,
    /// Skip primary mapping and tone mapping entirely.
    pub fast: bool,
    pub dither: DitherMode,
    pub wp_adapt: WhitepointAdaptation,
    /// Delinearisation for non-analytic output transfers (PQ, HLG, log).
    pub out_trc_fn: Option<TrcFunction>,
}

impl Default for ConverterOptions {
    fn default() -> Self {
        ConverterOptions {
            all: ColorspacePreset::Unspecified,
            iall: ColorspacePreset::Unspecified,
            space: MatrixCoefficients::Unspecified,
            ispace: MatrixCoefficients::Unspecified,
            range: ColorRange::Unspecified,
            irange: ColorRange::Unspecified,
            primaries: ColorPrimaries::Unspecified,
            iprimaries: ColorPrimaries::Unspecified,
            trc: TransferCharacteristic::Unspecified,
            itrc: TransferCharacteristic::Unspecified,
            format: None,
            fast: false,
            dither: DitherMode::None,
            wp_adapt: WhitepointAdaptation::Bradford,
            out_trc_fn: None,
        }
    }
}
