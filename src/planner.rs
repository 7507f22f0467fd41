/*
 * Copyright (c) Radzivon Bartoshyk, 3/2025. All rights reserved.
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
use crate::colorimetry::{
    luma_coefficients, range_scale, ColorMetadata, ColorPrimaries, ColorRange, LumaCoefficients,
    MatrixCoefficients, RangeScale, TransferCharacteristic,
};
use crate::convert_error::ConvertError;
use crate::gamma_lut::{GammaLut, GammaLutF16, RGB_ONE};
use crate::math::{matrix_mul_3x3, Matrix3x3, IDENTITY_3X3};
use crate::options::ConverterOptions;
use crate::pixel_format::PixelFormat;
use crate::primaries::{primaries_desc, primary_mapping_matrix, ColorPrimariesDesc};
use crate::transfer::{transfer_characteristics, Delinearizer, TransferCharacteristics};
use crate::ycbcr::{rgb_to_yuv_matrix, yuv_to_rgb_matrix};

/// Everything a slice worker reads: coefficient tables, LUTs, passthrough
/// flags. Immutable during frame execution, rebuilt piecewise when the
/// relevant metadata changes.
///
/// Coefficient scalars are replicated over 8 lanes so SIMD kernels can
/// broadcast-load them; the scalar kernels only ever read lane 0.
pub(crate) struct Plan {
    pub lrgb2lrgb_passthrough: bool,
    pub rgb2rgb_passthrough: bool,
    pub yuv2yuv_fastmode: bool,
    pub yuv2yuv_passthrough: bool,

    pub lrgb2lrgb_coeffs: [[[i16; 8]; 3]; 3],
    pub lrgb2lrgb_coeffsf: [[[f32; 8]; 3]; 3],
    pub yuv2rgb_coeffs: [[[i16; 8]; 3]; 3],
    pub rgb2yuv_coeffs: [[[i16; 8]; 3]; 3],
    pub yuv2yuv_coeffs: [[[i16; 8]; 3]; 3],
    pub yuv_offset: [[i16; 8]; 2],

    // Double precision mirrors kept for composing the yuv2yuv matrix.
    yuv2rgb_dbl: Matrix3x3,
    rgb2yuv_dbl: Matrix3x3,

    pub lut: Option<GammaLut>,
    pub lut_f16: Option<GammaLutF16>,

    /// Resolved input transfer, for the float pipelines' linear shortcut and
    /// closed-form linearisation.
    pub in_trc: TransferCharacteristic,
    pub in_txchr: Option<TransferCharacteristics>,
    pub delinearizer: Option<Delinearizer>,
}

impl Default for Plan {
    fn default() -> Self {
        Plan {
            lrgb2lrgb_passthrough: true,
            rgb2rgb_passthrough: true,
            yuv2yuv_fastmode: false,
            yuv2yuv_passthrough: false,
            lrgb2lrgb_coeffs: [[[0; 8]; 3]; 3],
            lrgb2lrgb_coeffsf: [[[0.0; 8]; 3]; 3],
            yuv2rgb_coeffs: [[[0; 8]; 3]; 3],
            rgb2yuv_coeffs: [[[0; 8]; 3]; 3],
            yuv2yuv_coeffs: [[[0; 8]; 3]; 3],
            yuv_offset: [[0; 8]; 2],
            yuv2rgb_dbl: IDENTITY_3X3,
            rgb2yuv_dbl: IDENTITY_3X3,
            lut: None,
            lut_f16: None,
            in_trc: TransferCharacteristic::Unspecified,
            in_txchr: None,
            delinearizer: None,
        }
    }
}

#[inline]
fn splat(value: i32) -> [i16; 8] {
    [value as i16; 8]
}

pub(crate) fn quantize_lrgb_to_lrgb(m: &Matrix3x3) -> ([[[i16; 8]; 3]; 3], [[[f32; 8]; 3]; 3]) {
    let mut fixed = [[[0i16; 8]; 3]; 3];
    let mut float = [[[0f32; 8]; 3]; 3];
    for (row, (fixed_row, float_row)) in m.iter().zip(fixed.iter_mut().zip(float.iter_mut())) {
        for (value, (fixed_value, float_value)) in
            row.iter().zip(fixed_row.iter_mut().zip(float_row.iter_mut()))
        {
            *fixed_value = splat((16384.0 * value).round() as i32);
            *float_value = [*value as f32; 8];
        }
    }
    (fixed, float)
}

/// YUV -> RGB quantisation; the 28672 scale of the intermediate and the
/// input range normalisation are folded into the coefficients.
pub(crate) fn quantize_yuv_to_rgb(
    m: &Matrix3x3,
    scale: &RangeScale,
    depth: u32,
) -> [[[i16; 8]; 3]; 3] {
    let mut out = [[[0i16; 8]; 3]; 3];
    let bits = (1i64 << (depth - 1)) as f64;
    for (row, out_row) in m.iter().zip(out.iter_mut()) {
        let mut in_rng = scale.y_range as f64;
        for (value, out_value) in row.iter().zip(out_row.iter_mut()) {
            *out_value = splat((RGB_ONE as f64 * bits * value / in_rng).round() as i32);
            in_rng = scale.uv_range as f64;
        }
    }
    out
}

/// RGB -> YUV quantisation, the exact opposite scaling.
pub(crate) fn quantize_rgb_to_yuv(
    m: &Matrix3x3,
    scale: &RangeScale,
    depth: u32,
) -> [[[i16; 8]; 3]; 3] {
    let mut out = [[[0i16; 8]; 3]; 3];
    let bits = (1i64 << (29 - depth)) as f64;
    let mut out_rng = scale.y_range as f64;
    for (row, out_row) in m.iter().zip(out.iter_mut()) {
        for (value, out_value) in row.iter().zip(out_row.iter_mut()) {
            *out_value = splat((bits * out_rng * value / RGB_ONE as f64).round() as i32);
        }
        out_rng = scale.uv_range as f64;
    }
    out
}

/// Composed YUV -> YUV quantisation used by the fast mode; folds both sides'
/// ranges and depths into one 14-bit fractional matrix.
pub(crate) fn quantize_yuv_to_yuv(
    yuv2rgb: &Matrix3x3,
    rgb2yuv: &Matrix3x3,
    in_scale: &RangeScale,
    out_scale: &RangeScale,
    in_depth: u32,
    out_depth: u32,
) -> [[[i16; 8]; 3]; 3] {
    let composed = matrix_mul_3x3(*rgb2yuv, *yuv2rgb);
    let mut out = [[[0i16; 8]; 3]; 3];
    let depth_scale = (1i64 << in_depth) as f64 / (1i64 << out_depth) as f64;
    let mut out_rng = out_scale.y_range as f64;
    for (row, out_row) in composed.iter().zip(out.iter_mut()) {
        let mut in_rng = in_scale.y_range as f64;
        for (value, out_value) in row.iter().zip(out_row.iter_mut()) {
            *out_value = splat((16384.0 * value * out_rng * depth_scale / in_rng).round() as i32);
            in_rng = in_scale.uv_range as f64;
        }
        out_rng = out_scale.uv_range as f64;
    }
    out
}

/// Cached derived state, each value keyed by the metadata tags it was built
/// from; a frame only rebuilds the pieces whose tags changed.
pub(crate) struct Planner {
    pub plan: Plan,

    in_primaries: Option<ColorPrimariesDesc>,
    out_primaries: Option<ColorPrimariesDesc>,
    in_txchr: Option<TransferCharacteristics>,
    out_delin: Option<Delinearizer>,
    out_trc_is_fn: bool,
    in_lumacoef: Option<LumaCoefficients>,
    out_lumacoef: Option<LumaCoefficients>,

    // Frame-visible tags the caches above were built against.
    in_prm_tag: ColorPrimaries,
    out_prm_tag: ColorPrimaries,
    in_trc_tag: TransferCharacteristic,
    out_trc_tag: TransferCharacteristic,
    in_csp_tag: MatrixCoefficients,
    out_csp_tag: MatrixCoefficients,
    in_rng_tag: ColorRange,
    out_rng_tag: ColorRange,
    in_format: Option<PixelFormat>,
    out_format: Option<PixelFormat>,

    // Resolved values.
    pub in_rng: ColorRange,
    pub out_rng: ColorRange,

    did_warn_range: bool,
}

impl Default for Planner {
    fn default() -> Self {
        Planner {
            plan: Plan::default(),
            in_primaries: None,
            out_primaries: None,
            in_txchr: None,
            out_delin: None,
            out_trc_is_fn: false,
            in_lumacoef: None,
            out_lumacoef: None,
            in_prm_tag: ColorPrimaries::Unspecified,
            out_prm_tag: ColorPrimaries::Unspecified,
            in_trc_tag: TransferCharacteristic::Unspecified,
            out_trc_tag: TransferCharacteristic::Unspecified,
            in_csp_tag: MatrixCoefficients::Unspecified,
            out_csp_tag: MatrixCoefficients::Unspecified,
            in_rng_tag: ColorRange::Unspecified,
            out_rng_tag: ColorRange::Unspecified,
            in_format: None,
            out_format: None,
            in_rng: ColorRange::Unspecified,
            out_rng: ColorRange::Unspecified,
            did_warn_range: false,
        }
    }
}

impl Planner {
    pub(crate) fn new() -> Planner {
        Planner::default()
    }

    /// Whether the one-shot "range unspecified" warning has fired.
    #[cfg(test)]
    pub(crate) fn did_warn(&self) -> bool {
        self.did_warn_range
    }

    fn resolve_range(&mut self, rng: ColorRange, depth: u32) -> RangeScale {
        if rng == ColorRange::Unspecified && !self.did_warn_range {
            log::warn!("Input range not set, assuming tv/mpeg");
            self.did_warn_range = true;
        }
        range_scale(rng, depth)
    }

    /// Rebuilds the stale parts of the plan for a (input, output) pair.
    /// Mirrors of the inputs that did not change keep their derived tables.
    pub(crate) fn update(
        &mut self,
        opts: &ConverterOptions,
        in_format: &PixelFormat,
        in_meta: &ColorMetadata,
        out_format: &PixelFormat,
        out_meta: &ColorMetadata,
    ) -> Result<(), ConvertError> {
        in_format.check_supported()?;
        out_format.check_supported()?;
        if in_format.rgb != out_format.rgb {
            return Err(ConvertError::FamilyMismatch);
        }
        let is_float = in_format.float;
        let is_float16 = is_float && in_format.depth == 16;

        let format_changed = self.in_format != Some(*in_format) || self.out_format != Some(*out_format);
        if format_changed {
            // Depth feeds every fixed-point table.
            self.in_lumacoef = None;
            self.out_lumacoef = None;
        }
        if in_meta.primaries != self.in_prm_tag {
            self.in_primaries = None;
        }
        if out_meta.primaries != self.out_prm_tag {
            self.out_primaries = None;
        }
        if in_meta.transfer != self.in_trc_tag {
            self.in_txchr = None;
        }
        if out_meta.transfer != self.out_trc_tag {
            self.out_delin = None;
        }
        if in_meta.matrix != self.in_csp_tag || in_meta.range != self.in_rng_tag {
            self.in_lumacoef = None;
        }
        if out_meta.matrix != self.out_csp_tag || out_meta.range != self.out_rng_tag {
            self.out_lumacoef = None;
        }

        if self.in_primaries.is_none() || self.out_primaries.is_none() {
            let mut in_prm = in_meta.primaries;
            if opts.iall != crate::ColorspacePreset::Unspecified {
                in_prm = opts.iall.primaries();
            }
            if opts.iprimaries != ColorPrimaries::Unspecified {
                in_prm = opts.iprimaries;
            }
            let in_desc = primaries_desc(in_prm).ok_or(ConvertError::UnknownPrimaries)?;
            let out_desc =
                primaries_desc(out_meta.primaries).ok_or(ConvertError::UnknownPrimaries)?;
            self.in_primaries = Some(in_desc);
            self.out_primaries = Some(out_desc);
            self.plan.lrgb2lrgb_passthrough = in_desc == out_desc;
            if !self.plan.lrgb2lrgb_passthrough {
                let rgb2rgb = primary_mapping_matrix(&in_desc, &out_desc, opts.wp_adapt);
                let (fixed, float) = quantize_lrgb_to_lrgb(&rgb2rgb);
                self.plan.lrgb2lrgb_coeffs = fixed;
                self.plan.lrgb2lrgb_coeffsf = float;
            }
        }

        let in_txchr = match self.in_txchr {
            Some(txchr) => txchr,
            None => {
                self.plan.lut = None;
                self.plan.lut_f16 = None;
                let mut in_trc = in_meta.transfer;
                if opts.iall != crate::ColorspacePreset::Unspecified {
                    in_trc = opts.iall.transfer();
                }
                if opts.itrc != TransferCharacteristic::Unspecified {
                    in_trc = opts.itrc;
                }
                let txchr =
                    transfer_characteristics(in_trc).ok_or(ConvertError::UnknownTransfer)?;
                self.in_txchr = Some(txchr);
                self.plan.in_trc = in_trc;
                self.plan.in_txchr = Some(txchr);
                txchr
            }
        };

        let out_delin = match self.out_delin {
            Some(delin) => delin,
            None => {
                self.plan.lut = None;
                self.plan.lut_f16 = None;
                let delin = match transfer_characteristics(out_meta.transfer) {
                    Some(txchr) => {
                        self.out_trc_is_fn = false;
                        Delinearizer::Analytic(txchr)
                    }
                    None => {
                        let f = opts.out_trc_fn.ok_or(ConvertError::UnknownTransfer)?;
                        if out_meta.transfer == TransferCharacteristic::Unspecified {
                            return Err(ConvertError::UnknownTransfer);
                        }
                        self.out_trc_is_fn = true;
                        Delinearizer::Function(f)
                    }
                };
                self.out_delin = Some(delin);
                self.plan.delinearizer = Some(delin);
                delin
            }
        };
        let same_transfer = !self.out_trc_is_fn
            && match out_delin {
                Delinearizer::Analytic(out_txchr) => out_txchr == in_txchr,
                Delinearizer::Function(_) => false,
            };
        self.plan.rgb2rgb_passthrough =
            opts.fast || (self.plan.lrgb2lrgb_passthrough && same_transfer);

        if !self.plan.rgb2rgb_passthrough {
            if !is_float && self.plan.lut.is_none() {
                self.plan.lut = Some(GammaLut::build(&in_txchr, out_delin)?);
            } else if is_float16 && self.plan.lut_f16.is_none() {
                self.plan.lut_f16 = Some(GammaLutF16::build(&in_txchr, out_delin)?);
            }
        }

        let mut redo_yuv2rgb = false;
        let mut redo_rgb2yuv = false;

        let in_lumacoef = match self.in_lumacoef {
            Some(coeffs) => coeffs,
            None => {
                let mut in_csp = in_meta.matrix;
                if opts.iall != crate::ColorspacePreset::Unspecified {
                    in_csp = opts.iall.matrix();
                }
                if opts.ispace != MatrixCoefficients::Unspecified {
                    in_csp = opts.ispace;
                }
                let mut in_rng = in_meta.range;
                if opts.irange != ColorRange::Unspecified {
                    in_rng = opts.irange;
                }
                let coeffs = luma_coefficients(in_csp).ok_or(ConvertError::UnknownMatrix)?;
                self.in_lumacoef = Some(coeffs);
                self.in_rng = in_rng;
                redo_yuv2rgb = true;
                coeffs
            }
        };

        let out_lumacoef = match self.out_lumacoef {
            Some(coeffs) => coeffs,
            None => {
                let coeffs =
                    luma_coefficients(out_meta.matrix).ok_or(ConvertError::UnknownMatrix)?;
                self.out_lumacoef = Some(coeffs);
                self.out_rng = out_meta.range;
                redo_rgb2yuv = true;
                coeffs
            }
        };

        let fmt_identical = in_format.log2_chroma_w == out_format.log2_chroma_w
            && in_format.log2_chroma_h == out_format.log2_chroma_h;
        self.plan.yuv2yuv_fastmode = self.plan.rgb2rgb_passthrough && fmt_identical;
        self.plan.yuv2yuv_passthrough = self.plan.yuv2yuv_fastmode
            && self.in_rng == self.out_rng
            && self.in_lumacoef == self.out_lumacoef
            && in_format.depth == out_format.depth;

        if !self.plan.yuv2yuv_passthrough && !in_format.rgb {
            if redo_yuv2rgb {
                let scale = self.resolve_range(self.in_rng, in_format.depth);
                self.plan.yuv_offset[0] = splat(scale.offset);
                self.plan.yuv2rgb_dbl = yuv_to_rgb_matrix(in_lumacoef);
                self.plan.yuv2rgb_coeffs =
                    quantize_yuv_to_rgb(&self.plan.yuv2rgb_dbl, &scale, in_format.depth);
                debug_assert_eq!(self.plan.yuv2rgb_coeffs[0][1][0], 0);
                debug_assert_eq!(self.plan.yuv2rgb_coeffs[2][2][0], 0);
                debug_assert_eq!(
                    self.plan.yuv2rgb_coeffs[0][0][0],
                    self.plan.yuv2rgb_coeffs[1][0][0]
                );
                debug_assert_eq!(
                    self.plan.yuv2rgb_coeffs[0][0][0],
                    self.plan.yuv2rgb_coeffs[2][0][0]
                );
            }

            if redo_rgb2yuv {
                let scale = self.resolve_range(self.out_rng, out_format.depth);
                self.plan.yuv_offset[1] = splat(scale.offset);
                self.plan.rgb2yuv_dbl = rgb_to_yuv_matrix(out_lumacoef);
                self.plan.rgb2yuv_coeffs =
                    quantize_rgb_to_yuv(&self.plan.rgb2yuv_dbl, &scale, out_format.depth);
                debug_assert_eq!(
                    self.plan.rgb2yuv_coeffs[1][2][0],
                    self.plan.rgb2yuv_coeffs[2][0][0]
                );
            }

            if self.plan.yuv2yuv_fastmode && (redo_yuv2rgb || redo_rgb2yuv) {
                let in_scale = range_scale(self.in_rng, in_format.depth);
                let out_scale = range_scale(self.out_rng, out_format.depth);
                self.plan.yuv2yuv_coeffs = quantize_yuv_to_yuv(
                    &self.plan.yuv2rgb_dbl,
                    &self.plan.rgb2yuv_dbl,
                    &in_scale,
                    &out_scale,
                    in_format.depth,
                    out_format.depth,
                );
                debug_assert_eq!(self.plan.yuv2yuv_coeffs[1][0][0], 0);
                debug_assert_eq!(self.plan.yuv2yuv_coeffs[2][0][0], 0);
            }
        }

        self.in_prm_tag = in_meta.primaries;
        self.out_prm_tag = out_meta.primaries;
        self.in_trc_tag = in_meta.transfer;
        self.out_trc_tag = out_meta.transfer;
        self.in_csp_tag = in_meta.matrix;
        self.out_csp_tag = out_meta.matrix;
        self.in_rng_tag = in_meta.range;
        self.out_rng_tag = out_meta.range;
        self.in_format = Some(*in_format);
        self.out_format = Some(*out_format);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tv_meta(matrix: MatrixCoefficients) -> ColorMetadata {
        ColorMetadata {
            matrix,
            primaries: ColorPrimaries::Bt709,
            transfer: TransferCharacteristic::Bt709,
            range: ColorRange::Tv,
        }
    }

    #[test]
    fn test_quantized_off_diagonal_zeros_all_depths_and_ranges() {
        // Canonical YUV->RGB zeros must survive quantisation everywhere.
        for matrix in [
            MatrixCoefficients::Bt709,
            MatrixCoefficients::Fcc,
            MatrixCoefficients::Bt470Bg,
            MatrixCoefficients::Smpte240M,
            MatrixCoefficients::Bt2020Ncl,
        ] {
            let luma = luma_coefficients(matrix).unwrap();
            let m = yuv_to_rgb_matrix(luma);
            for depth in [8u32, 10, 12] {
                for range in [ColorRange::Tv, ColorRange::Pc] {
                    let coeffs = quantize_yuv_to_rgb(&m, &range_scale(range, depth), depth);
                    assert_eq!(coeffs[0][1][0], 0, "{:?} {} {:?}", matrix, depth, range);
                    assert_eq!(coeffs[2][2][0], 0, "{:?} {} {:?}", matrix, depth, range);
                    assert_eq!(coeffs[0][0][0], coeffs[1][0][0]);
                    assert_eq!(coeffs[0][0][0], coeffs[2][0][0]);
                }
            }
        }
    }

    #[test]
    fn test_passthrough_detection() {
        let opts = ConverterOptions::default();
        let mut planner = Planner::new();
        let meta = tv_meta(MatrixCoefficients::Bt709);
        planner
            .update(
                &opts,
                &PixelFormat::YUV420P8,
                &meta,
                &PixelFormat::YUV420P8,
                &meta,
            )
            .unwrap();
        assert!(planner.plan.lrgb2lrgb_passthrough);
        assert!(planner.plan.rgb2rgb_passthrough);
        assert!(planner.plan.yuv2yuv_fastmode);
        assert!(planner.plan.yuv2yuv_passthrough);
        assert!(planner.plan.lut.is_none());
    }

    #[test]
    fn test_matrix_change_selects_full_path() {
        let opts = ConverterOptions::default();
        let mut planner = Planner::new();
        let mut in_meta = tv_meta(MatrixCoefficients::Smpte170M);
        in_meta.transfer = TransferCharacteristic::Smpte170M;
        let out_meta = tv_meta(MatrixCoefficients::Bt709);
        planner
            .update(
                &opts,
                &PixelFormat::YUV420P8,
                &in_meta,
                &PixelFormat::YUV420P8,
                &out_meta,
            )
            .unwrap();
        // Same primaries and an identical analytic curve behind a different
        // transfer tag: the composed fast mode absorbs the matrix change.
        assert!(planner.plan.lrgb2lrgb_passthrough);
        assert!(planner.plan.rgb2rgb_passthrough);
        assert!(planner.plan.yuv2yuv_fastmode);
        assert!(!planner.plan.yuv2yuv_passthrough);
    }

    #[test]
    fn test_range_only_conversion_is_fastmode() {
        let opts = ConverterOptions::default();
        let mut planner = Planner::new();
        let in_meta = tv_meta(MatrixCoefficients::Bt2020Ncl);
        let mut out_meta = in_meta;
        out_meta.range = ColorRange::Pc;
        planner
            .update(
                &opts,
                &PixelFormat::YUV444P12,
                &in_meta,
                &PixelFormat::YUV444P12,
                &out_meta,
            )
            .unwrap();
        assert!(planner.plan.yuv2yuv_fastmode);
        assert!(!planner.plan.yuv2yuv_passthrough);
    }

    #[test]
    fn test_family_crossing_rejected() {
        let opts = ConverterOptions::default();
        let mut planner = Planner::new();
        let meta = tv_meta(MatrixCoefficients::Bt709);
        let res = planner.update(
            &opts,
            &PixelFormat::YUV420P8,
            &meta,
            &PixelFormat::GBRPF32,
            &meta,
        );
        assert_eq!(res, Err(ConvertError::FamilyMismatch));
    }

    #[test]
    fn test_unknown_tags_error() {
        let opts = ConverterOptions::default();
        let mut planner = Planner::new();
        let mut in_meta = tv_meta(MatrixCoefficients::Bt709);
        in_meta.primaries = ColorPrimaries::Unspecified;
        let out_meta = tv_meta(MatrixCoefficients::Bt709);
        let res = planner.update(
            &opts,
            &PixelFormat::YUV420P8,
            &in_meta,
            &PixelFormat::YUV420P8,
            &out_meta,
        );
        assert_eq!(res, Err(ConvertError::UnknownPrimaries));
    }

    #[test]
    fn test_non_analytic_output_requires_function() {
        let opts = ConverterOptions::default();
        let mut planner = Planner::new();
        let in_meta = tv_meta(MatrixCoefficients::Bt709);
        let mut out_meta = in_meta;
        out_meta.transfer = TransferCharacteristic::Smpte2084;
        let res = planner.update(
            &opts,
            &PixelFormat::YUV420P8,
            &in_meta,
            &PixelFormat::YUV420P8,
            &out_meta,
        );
        assert_eq!(res, Err(ConvertError::UnknownTransfer));

        fn flat(_: f64) -> f64 {
            0.5
        }
        let opts = ConverterOptions {
            out_trc_fn: Some(flat),
            ..ConverterOptions::default()
        };
        let mut planner = Planner::new();
        planner
            .update(
                &opts,
                &PixelFormat::YUV420P8,
                &in_meta,
                &PixelFormat::YUV420P8,
                &out_meta,
            )
            .unwrap();
        assert!(!planner.plan.rgb2rgb_passthrough);
        assert!(planner.plan.lut.is_some());
    }
}
