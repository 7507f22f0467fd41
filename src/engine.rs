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
use crate::colorimetry::{ColorMetadata, TransferCharacteristic};
use crate::convert_error::ConvertError;
use crate::images::{VideoFrame, VideoFrameMut, YuvSample};
use crate::lrgb_to_yuv::{select_lrgb_to_yuv, select_lrgb_to_yuv_fsb};
use crate::options::{ConverterOptions, DitherMode};
use crate::pixel_format::{PixelFormat, SampleKind};
use crate::planner::{Plan, Planner};
use crate::rgb_ops::{
    apply_delinearize_f32, apply_linearize_f32, apply_lut, apply_lut_f16, multiply3x3,
    multiply3x3_f16, multiply3x3_f32,
};
use crate::scratch::{DitherScratch, ScratchManager};
use crate::yuv_to_lrgb::select_yuv_to_lrgb;
use crate::yuv_to_yuv::select_yuv_to_yuv;
use num_traits::AsPrimitive;
#[cfg(feature = "rayon")]
use rayon::iter::{IntoParallelRefMutIterator, ParallelIterator};

/// Planar colorspace converter. Owns the derived plan, which is rebuilt
/// piecewise when frame metadata changes, and the intermediate buffers,
/// which are resized when frame geometry changes. Per-slice execution
/// allocates nothing.
pub struct ColorspaceConverter {
    opts: ConverterOptions,
    planner: Planner,
    scratch: ScratchManager,
}

impl ColorspaceConverter {
    pub fn new(opts: ConverterOptions) -> ColorspaceConverter {
        ColorspaceConverter {
            opts,
            planner: Planner::new(),
            scratch: ScratchManager::new(),
        }
    }

    pub fn options(&self) -> &ConverterOptions {
        &self.opts
    }

    /// Converts one frame, partitioning it into horizontal slices across the
    /// available workers.
    pub fn convert(
        &mut self,
        input: &VideoFrame,
        output: &mut VideoFrameMut,
    ) -> Result<(), ConvertError> {
        let n_slices = default_slice_count(input.height);
        self.convert_with_slices(input, output, n_slices)
    }

    /// Colorimetry the output frame will be tagged with, before conversion.
    fn resolve_output_metadata(&self, input: &VideoFrame, out_format: &PixelFormat) -> ColorMetadata {
        let opts = &self.opts;
        let primaries = if opts.primaries != crate::ColorPrimaries::Unspecified {
            opts.primaries
        } else {
            opts.all.primaries()
        };
        let transfer = if opts.trc != TransferCharacteristic::Unspecified {
            opts.trc
        } else {
            let mut trc = opts.all.transfer();
            if trc == TransferCharacteristic::Bt2020_10 && out_format.depth >= 12 {
                trc = TransferCharacteristic::Bt2020_12;
            }
            trc
        };
        let matrix = if opts.space != crate::MatrixCoefficients::Unspecified {
            opts.space
        } else {
            opts.all.matrix()
        };
        let range = if opts.range != crate::ColorRange::Unspecified {
            opts.range
        } else {
            input.color.range
        };
        ColorMetadata {
            matrix,
            primaries,
            transfer,
            range,
        }
    }

    pub(crate) fn convert_with_slices(
        &mut self,
        input: &VideoFrame,
        output: &mut VideoFrameMut,
        n_slices: usize,
    ) -> Result<(), ConvertError> {
        if input.width != output.width || input.height != output.height {
            return Err(ConvertError::ImageDimensionsNotMatch);
        }
        if input.width % 2 != 0 || input.height % 2 != 0 {
            return Err(ConvertError::OddDimensions(input.width, input.height));
        }
        if let Some(required) = self.opts.format {
            if output.format != required {
                return Err(ConvertError::InvalidFormat);
            }
        }
        if input.format.float && input.format.depth != output.format.depth {
            return Err(ConvertError::InvalidFormat);
        }
        output.color = self.resolve_output_metadata(input, &output.format);
        input.check_constraints()?;
        output.check_constraints()?;

        let out_meta = output.color;
        self.planner
            .update(&self.opts, &input.format, &input.color, &output.format, &out_meta)?;
        let plan = &self.planner.plan;

        if plan.yuv2yuv_passthrough {
            return copy_frame(input, output);
        }

        let bounds = slice_bounds(input.height as usize, n_slices);
        match (input.format.sample_kind(), output.format.sample_kind()) {
            (SampleKind::F32, SampleKind::F32) => {
                run_f32(plan, &mut self.scratch, input, output, &bounds)
            }
            (SampleKind::U16, SampleKind::U16) if input.format.float => {
                run_f16(plan, &mut self.scratch, input, output, &bounds)
            }
            (SampleKind::U8, SampleKind::U8) => {
                run_int::<u8, u8>(plan, &mut self.scratch, input, output, &bounds, self.opts.dither)
            }
            (SampleKind::U8, SampleKind::U16) => {
                run_int::<u8, u16>(plan, &mut self.scratch, input, output, &bounds, self.opts.dither)
            }
            (SampleKind::U16, SampleKind::U8) => {
                run_int::<u16, u8>(plan, &mut self.scratch, input, output, &bounds, self.opts.dither)
            }
            (SampleKind::U16, SampleKind::U16) => {
                run_int::<u16, u16>(plan, &mut self.scratch, input, output, &bounds, self.opts.dither)
            }
            _ => Err(ConvertError::InvalidFormat),
        }
    }
}

fn default_slice_count(height: u32) -> usize {
    #[cfg(feature = "rayon")]
    {
        rayon::current_num_threads()
            .min((height as usize + 1) / 2)
            .max(1)
    }
    #[cfg(not(feature = "rayon"))]
    {
        let _ = height;
        1
    }
}

/// Contiguous slice bounds on luma rows, aligned to chroma row pairs:
/// `h1 = 2 * floor(j * ceil(H / 2) / N)`.
fn slice_bounds(height: usize, n_slices: usize) -> Vec<(usize, usize)> {
    let h_half = (height + 1) / 2;
    let n = n_slices.clamp(1, h_half);
    (0..n)
        .filter_map(|j| {
            let h1 = 2 * (j * h_half / n);
            let h2 = 2 * ((j + 1) * h_half / n);
            (h2 > h1).then_some((h1, h2))
        })
        .collect()
}

/// Splits a plane into disjoint mutable row chunks, one per slice; the last
/// chunk takes the remainder so short final rows stay covered.
fn split_rows_mut<'a, T>(
    plane: &'a mut [T],
    stride: usize,
    rows_per_slice: &[usize],
) -> Vec<&'a mut [T]> {
    let mut chunks = Vec::with_capacity(rows_per_slice.len());
    let mut rest = plane;
    for (i, &rows) in rows_per_slice.iter().enumerate() {
        if i + 1 == rows_per_slice.len() {
            chunks.push(std::mem::take(&mut rest));
        } else {
            let (head, tail) = std::mem::take(&mut rest).split_at_mut(rows * stride);
            chunks.push(head);
            rest = tail;
        }
    }
    chunks
}

fn copy_plane<T: Copy>(
    dst: &mut [T],
    dst_stride: usize,
    src: &[T],
    src_stride: usize,
    w: usize,
    h: usize,
) {
    for (dst_row, src_row) in dst
        .chunks_mut(dst_stride)
        .zip(src.chunks(src_stride))
        .take(h)
    {
        dst_row[..w].copy_from_slice(&src_row[..w]);
    }
}

fn copy_typed_frame<T: Copy + YuvSample>(
    input: &VideoFrame,
    output: &mut VideoFrameMut,
) -> Result<(), ConvertError> {
    let w = input.width as usize;
    let h = input.height as usize;
    let fmt = input.format;
    for plane in 0..3 {
        let (pw, ph) = if !fmt.rgb && (plane == 1 || plane == 2) {
            (fmt.chroma_width(w), fmt.chroma_height(h))
        } else {
            (w, h)
        };
        let src = T::plane(&input.planes[plane])?;
        let src_stride = input.strides[plane];
        let dst_stride = output.strides[plane];
        let dst = T::plane_mut(&mut output.planes[plane])?;
        copy_plane(dst, dst_stride, src, src_stride, pw, ph);
    }
    if fmt.alpha && output.format.alpha {
        let src = T::plane(&input.planes[3])?;
        let src_stride = input.strides[3];
        let dst_stride = output.strides[3];
        let dst = T::plane_mut(&mut output.planes[3])?;
        copy_plane(dst, dst_stride, src, src_stride, w, h);
    }
    Ok(())
}

fn copy_frame(input: &VideoFrame, output: &mut VideoFrameMut) -> Result<(), ConvertError> {
    match input.format.sample_kind() {
        SampleKind::U8 => copy_typed_frame::<u8>(input, output),
        SampleKind::U16 => copy_typed_frame::<u16>(input, output),
        SampleKind::F32 => {
            let w = input.width as usize;
            let h = input.height as usize;
            let planes = if input.format.alpha && output.format.alpha {
                4
            } else {
                3
            };
            for plane in 0..planes {
                let src = input.planes[plane].as_f32()?;
                let src_stride = input.strides[plane];
                let dst_stride = output.strides[plane];
                let dst = output.planes[plane].as_f32_mut()?;
                copy_plane(dst, dst_stride, src, src_stride, w, h);
            }
            Ok(())
        }
    }
}

fn for_each_job<J: Send>(jobs: &mut [J], f: impl Fn(&mut J) + Send + Sync) {
    #[cfg(feature = "rayon")]
    {
        jobs.par_iter_mut().for_each(|job| f(job));
    }
    #[cfg(not(feature = "rayon"))]
    {
        jobs.iter_mut().for_each(|job| f(job));
    }
}

struct FastJob<'a, Tin, Tout> {
    h: usize,
    in_planes: [&'a [Tin]; 3],
    out_planes: [&'a mut [Tout]; 3],
}

struct IntJob<'a, Tin, Tout> {
    h: usize,
    in_planes: [&'a [Tin]; 3],
    out_planes: [&'a mut [Tout]; 3],
    rgb: [&'a mut [i16]; 3],
    dither: Option<DitherScratch>,
}

/// Fixed-point pipeline for the planar YUV formats.
fn run_int<Tin, Tout>(
    plan: &Plan,
    scratch: &mut ScratchManager,
    input: &VideoFrame,
    output: &mut VideoFrameMut,
    bounds: &[(usize, usize)],
    dither: DitherMode,
) -> Result<(), ConvertError>
where
    Tin: YuvSample,
    Tout: YuvSample,
    i32: AsPrimitive<Tout>,
{
    let w = input.width as usize;
    let h = input.height as usize;
    let in_fmt = input.format;
    let out_fmt = output.format;
    let in_ss_h = in_fmt.log2_chroma_h as usize;
    let out_ss_h = out_fmt.log2_chroma_h as usize;

    let in_y = Tin::plane(&input.planes[0])?;
    let in_u = Tin::plane(&input.planes[1])?;
    let in_v = Tin::plane(&input.planes[2])?;
    let in_strides = [input.strides[0], input.strides[1], input.strides[2]];
    let out_strides = [output.strides[0], output.strides[1], output.strides[2]];

    let [p0, p1, p2, _] = &mut output.planes;
    let out_y_all = Tout::plane_mut(p0)?;
    let out_u_all = Tout::plane_mut(p1)?;
    let out_v_all = Tout::plane_mut(p2)?;

    let luma_rows: Vec<usize> = bounds.iter().map(|&(h1, h2)| h2 - h1).collect();
    let out_chroma_rows: Vec<usize> = bounds.iter().map(|&(h1, h2)| (h2 - h1) >> out_ss_h).collect();
    let out_y_chunks = split_rows_mut(out_y_all, out_strides[0], &luma_rows);
    let out_u_chunks = split_rows_mut(out_u_all, out_strides[1], &out_chroma_rows);
    let out_v_chunks = split_rows_mut(out_v_all, out_strides[2], &out_chroma_rows);

    let in_planes_for = |&(h1, _): &(usize, usize)| -> [&[Tin]; 3] {
        [
            &in_y[h1 * in_strides[0]..],
            &in_u[(h1 >> in_ss_h) * in_strides[1]..],
            &in_v[(h1 >> in_ss_h) * in_strides[2]..],
        ]
    };

    if plan.yuv2yuv_fastmode {
        let kernel = select_yuv_to_yuv::<Tin, Tout>(
            in_fmt.depth,
            out_fmt.depth,
            in_fmt.subsampling_index(),
        );
        let mut jobs: Vec<FastJob<Tin, Tout>> = Vec::with_capacity(bounds.len());
        for ((((h1, h2), out_y), out_u), out_v) in bounds
            .iter()
            .copied()
            .zip(out_y_chunks)
            .zip(out_u_chunks)
            .zip(out_v_chunks)
        {
            jobs.push(FastJob {
                h: h2 - h1,
                in_planes: in_planes_for(&(h1, h2)),
                out_planes: [out_y, out_u, out_v],
            });
        }
        for_each_job(&mut jobs, |job| {
            kernel(
                &mut job.out_planes,
                out_strides,
                job.in_planes,
                in_strides,
                w,
                job.h,
                &plan.yuv2yuv_coeffs,
                &plan.yuv_offset,
            );
        });
        return Ok(());
    }

    let (rgb_stride, rgb_all) = scratch.ensure_i16(w, h)?;
    let [rgb_r_all, rgb_g_all, rgb_b_all] = rgb_all;
    let rgb_r_chunks = split_rows_mut(rgb_r_all, rgb_stride, &luma_rows);
    let rgb_g_chunks = split_rows_mut(rgb_g_all, rgb_stride, &luma_rows);
    let rgb_b_chunks = split_rows_mut(rgb_b_all, rgb_stride, &luma_rows);

    let mut jobs: Vec<IntJob<Tin, Tout>> = Vec::with_capacity(bounds.len());
    for (((((((h1, h2), out_y), out_u), out_v), rgb_r), rgb_g), rgb_b) in bounds
        .iter()
        .copied()
        .zip(out_y_chunks)
        .zip(out_u_chunks)
        .zip(out_v_chunks)
        .zip(rgb_r_chunks)
        .zip(rgb_g_chunks)
        .zip(rgb_b_chunks)
    {
        let dither_scratch = if dither == DitherMode::Fsb {
            Some(DitherScratch::alloc(w, out_fmt.chroma_width(w))?)
        } else {
            None
        };
        jobs.push(IntJob {
            h: h2 - h1,
            in_planes: in_planes_for(&(h1, h2)),
            out_planes: [out_y, out_u, out_v],
            rgb: [rgb_r, rgb_g, rgb_b],
            dither: dither_scratch,
        });
    }

    let yuv2rgb = select_yuv_to_lrgb::<Tin>(in_fmt.depth, in_fmt.subsampling_index());
    let rgb2yuv = select_lrgb_to_yuv::<Tout>(out_fmt.depth, out_fmt.subsampling_index());
    let rgb2yuv_fsb = select_lrgb_to_yuv_fsb::<Tout>(out_fmt.depth, out_fmt.subsampling_index());

    for_each_job(&mut jobs, |job| {
        yuv2rgb(
            &mut job.rgb,
            rgb_stride,
            job.in_planes,
            in_strides,
            w,
            job.h,
            &plan.yuv2rgb_coeffs,
            &plan.yuv_offset[0],
        );
        if !plan.rgb2rgb_passthrough {
            if let Some(lut) = plan.lut.as_ref() {
                apply_lut(&mut job.rgb, rgb_stride, w, job.h, lut.lin());
                if !plan.lrgb2lrgb_passthrough {
                    multiply3x3(&mut job.rgb, rgb_stride, w, job.h, &plan.lrgb2lrgb_coeffs);
                }
                apply_lut(&mut job.rgb, rgb_stride, w, job.h, lut.delin());
            }
        }
        let [rgb_r, rgb_g, rgb_b] = &job.rgb;
        let rgb_shared: [&[i16]; 3] = [&**rgb_r, &**rgb_g, &**rgb_b];
        match job.dither.as_mut() {
            Some(dither_scratch) => {
                dither_scratch.reset();
                rgb2yuv_fsb(
                    &mut job.out_planes,
                    out_strides,
                    rgb_shared,
                    rgb_stride,
                    w,
                    job.h,
                    &plan.rgb2yuv_coeffs,
                    &plan.yuv_offset[1],
                    dither_scratch,
                );
            }
            None => {
                rgb2yuv(
                    &mut job.out_planes,
                    out_strides,
                    rgb_shared,
                    rgb_stride,
                    w,
                    job.h,
                    &plan.rgb2yuv_coeffs,
                    &plan.yuv_offset[1],
                );
            }
        }
    });

    Ok(())
}

struct FloatJob<'a, T> {
    h: usize,
    in_planes: [&'a [T]; 3],
    out_planes: [&'a mut [T]; 3],
    rgb: [&'a mut [T]; 3],
    alpha: Option<(&'a mut [T], &'a [T])>,
}

/// Builds per-slice jobs for one of the float pipelines. Planes are
/// reordered from storage G,B,R into working R,G,B.
fn build_float_jobs<'a, T: Copy>(
    bounds: &[(usize, usize)],
    in_planes: [&'a [T]; 3],
    in_strides: [usize; 3],
    out_planes: [&'a mut [T]; 3],
    out_strides: [usize; 3],
    rgb_planes: [&'a mut [T]; 3],
    rgb_stride: usize,
    alpha: Option<(&'a mut [T], &'a [T])>,
    alpha_strides: [usize; 2],
) -> Vec<FloatJob<'a, T>> {
    let rows: Vec<usize> = bounds.iter().map(|&(h1, h2)| h2 - h1).collect();
    let [out_r, out_g, out_b] = out_planes;
    let out_r_chunks = split_rows_mut(out_r, out_strides[0], &rows);
    let out_g_chunks = split_rows_mut(out_g, out_strides[1], &rows);
    let out_b_chunks = split_rows_mut(out_b, out_strides[2], &rows);
    let [rgb_r, rgb_g, rgb_b] = rgb_planes;
    let rgb_r_chunks = split_rows_mut(rgb_r, rgb_stride, &rows);
    let rgb_g_chunks = split_rows_mut(rgb_g, rgb_stride, &rows);
    let rgb_b_chunks = split_rows_mut(rgb_b, rgb_stride, &rows);
    let (alpha_dst, alpha_src) = match alpha {
        Some((dst, src)) => (Some(dst), Some(src)),
        None => (None, None),
    };
    let mut alpha_dst_chunks = alpha_dst
        .map(|dst| split_rows_mut(dst, alpha_strides[0], &rows))
        .unwrap_or_default()
        .into_iter();

    let mut jobs = Vec::with_capacity(bounds.len());
    for (((((((h1, h2), out_r), out_g), out_b), rgb_r), rgb_g), rgb_b) in bounds
        .iter()
        .copied()
        .zip(out_r_chunks)
        .zip(out_g_chunks)
        .zip(out_b_chunks)
        .zip(rgb_r_chunks)
        .zip(rgb_g_chunks)
        .zip(rgb_b_chunks)
    {
        let alpha_pair = alpha_dst_chunks
            .next()
            .zip(alpha_src.map(|src| &src[h1 * alpha_strides[1]..]));
        jobs.push(FloatJob {
            h: h2 - h1,
            in_planes: [
                &in_planes[0][h1 * in_strides[0]..],
                &in_planes[1][h1 * in_strides[1]..],
                &in_planes[2][h1 * in_strides[2]..],
            ],
            out_planes: [out_r, out_g, out_b],
            rgb: [rgb_r, rgb_g, rgb_b],
            alpha: alpha_pair,
        });
    }
    jobs
}

fn copy_float_planes<T: Copy>(job: &mut FloatJob<T>, in_strides: [usize; 3], out_strides: [usize; 3], w: usize) {
    for ((dst, dst_stride), (src, src_stride)) in job
        .out_planes
        .iter_mut()
        .zip(out_strides)
        .zip(job.in_planes.iter().zip(in_strides))
    {
        copy_plane(&mut **dst, dst_stride, &**src, src_stride, w, job.h);
    }
}

/// Half-float pipeline: every tone stage is a 65536-entry bit-pattern LUT.
fn run_f16(
    plan: &Plan,
    scratch: &mut ScratchManager,
    input: &VideoFrame,
    output: &mut VideoFrameMut,
    bounds: &[(usize, usize)],
) -> Result<(), ConvertError> {
    let w = input.width as usize;
    let h = input.height as usize;
    let has_alpha = input.format.alpha && output.format.alpha;

    // G,B,R storage order to R,G,B working order.
    let in_planes = [
        input.planes[2].as_u16()?,
        input.planes[0].as_u16()?,
        input.planes[1].as_u16()?,
    ];
    let in_strides = [input.strides[2], input.strides[0], input.strides[1]];
    let out_strides = [output.strides[2], output.strides[0], output.strides[1]];
    let alpha_strides = [output.strides[3], input.strides[3]];

    let [p0, p1, p2, p3] = &mut output.planes;
    let out_planes = [p2.as_u16_mut()?, p0.as_u16_mut()?, p1.as_u16_mut()?];
    let alpha = if has_alpha {
        Some((p3.as_u16_mut()?, input.planes[3].as_u16()?))
    } else {
        None
    };

    let (rgb_stride, rgb_planes) = scratch.ensure_u16(w, h)?;
    let mut jobs = build_float_jobs(
        bounds,
        in_planes,
        in_strides,
        out_planes,
        out_strides,
        rgb_planes,
        rgb_stride,
        alpha,
        alpha_strides,
    );

    let direct_delin =
        plan.in_trc == TransferCharacteristic::Linear && plan.lrgb2lrgb_passthrough;

    for_each_job(&mut jobs, |job| {
        if plan.rgb2rgb_passthrough {
            copy_float_planes(job, in_strides, out_strides, w);
        } else if let Some(lut) = plan.lut_f16.as_ref() {
            let rgb_strides = [rgb_stride; 3];
            if direct_delin {
                let [out_r, out_g, out_b] = &mut job.out_planes;
                apply_lut_f16(
                    [&mut **out_r, &mut **out_g, &mut **out_b],
                    out_strides,
                    job.in_planes,
                    in_strides,
                    w,
                    job.h,
                    lut.delin(),
                );
            } else {
                {
                    let [rgb_r, rgb_g, rgb_b] = &mut job.rgb;
                    apply_lut_f16(
                        [&mut **rgb_r, &mut **rgb_g, &mut **rgb_b],
                        rgb_strides,
                        job.in_planes,
                        in_strides,
                        w,
                        job.h,
                        lut.lin(),
                    );
                }
                if !plan.lrgb2lrgb_passthrough {
                    multiply3x3_f16(&mut job.rgb, rgb_stride, w, job.h, &plan.lrgb2lrgb_coeffsf);
                }
                let [rgb_r, rgb_g, rgb_b] = &job.rgb;
                let rgb_shared: [&[u16]; 3] = [&**rgb_r, &**rgb_g, &**rgb_b];
                let [out_r, out_g, out_b] = &mut job.out_planes;
                apply_lut_f16(
                    [&mut **out_r, &mut **out_g, &mut **out_b],
                    out_strides,
                    rgb_shared,
                    rgb_strides,
                    w,
                    job.h,
                    lut.delin(),
                );
            }
        }
        if let Some((alpha_dst, alpha_src)) = job.alpha.as_mut() {
            copy_plane(&mut **alpha_dst, alpha_strides[0], &**alpha_src, alpha_strides[1], w, job.h);
        }
    });

    Ok(())
}

/// Single-float pipeline: closed-form transfer math per pixel, no LUT.
fn run_f32(
    plan: &Plan,
    scratch: &mut ScratchManager,
    input: &VideoFrame,
    output: &mut VideoFrameMut,
    bounds: &[(usize, usize)],
) -> Result<(), ConvertError> {
    let w = input.width as usize;
    let h = input.height as usize;
    let has_alpha = input.format.alpha && output.format.alpha;

    let in_planes = [
        input.planes[2].as_f32()?,
        input.planes[0].as_f32()?,
        input.planes[1].as_f32()?,
    ];
    let in_strides = [input.strides[2], input.strides[0], input.strides[1]];
    let out_strides = [output.strides[2], output.strides[0], output.strides[1]];
    let alpha_strides = [output.strides[3], input.strides[3]];

    let [p0, p1, p2, p3] = &mut output.planes;
    let out_planes = [p2.as_f32_mut()?, p0.as_f32_mut()?, p1.as_f32_mut()?];
    let alpha = if has_alpha {
        Some((p3.as_f32_mut()?, input.planes[3].as_f32()?))
    } else {
        None
    };

    let (rgb_stride, rgb_planes) = scratch.ensure_f32(w, h)?;
    let mut jobs = build_float_jobs(
        bounds,
        in_planes,
        in_strides,
        out_planes,
        out_strides,
        rgb_planes,
        rgb_stride,
        alpha,
        alpha_strides,
    );

    let direct_delin =
        plan.in_trc == TransferCharacteristic::Linear && plan.lrgb2lrgb_passthrough;
    let in_txchr = plan.in_txchr;
    let delinearizer = plan.delinearizer;

    for_each_job(&mut jobs, |job| {
        if plan.rgb2rgb_passthrough {
            copy_float_planes(job, in_strides, out_strides, w);
        } else if let (Some(in_txchr), Some(delinearizer)) = (in_txchr, delinearizer) {
            let rgb_strides = [rgb_stride; 3];
            if direct_delin {
                let [out_r, out_g, out_b] = &mut job.out_planes;
                apply_delinearize_f32(
                    [&mut **out_r, &mut **out_g, &mut **out_b],
                    out_strides,
                    job.in_planes,
                    in_strides,
                    w,
                    job.h,
                    delinearizer,
                );
            } else {
                {
                    let [rgb_r, rgb_g, rgb_b] = &mut job.rgb;
                    apply_linearize_f32(
                        [&mut **rgb_r, &mut **rgb_g, &mut **rgb_b],
                        rgb_strides,
                        job.in_planes,
                        in_strides,
                        w,
                        job.h,
                        &in_txchr,
                    );
                }
                if !plan.lrgb2lrgb_passthrough {
                    multiply3x3_f32(&mut job.rgb, rgb_stride, w, job.h, &plan.lrgb2lrgb_coeffsf);
                }
                let [rgb_r, rgb_g, rgb_b] = &job.rgb;
                let rgb_shared: [&[f32]; 3] = [&**rgb_r, &**rgb_g, &**rgb_b];
                let [out_r, out_g, out_b] = &mut job.out_planes;
                apply_delinearize_f32(
                    [&mut **out_r, &mut **out_g, &mut **out_b],
                    out_strides,
                    rgb_shared,
                    rgb_strides,
                    w,
                    job.h,
                    delinearizer,
                );
            }
        }
        if let Some((alpha_dst, alpha_src)) = job.alpha.as_mut() {
            copy_plane(&mut **alpha_dst, alpha_strides[0], &**alpha_src, alpha_strides[1], w, job.h);
        }
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chromatic_adaptation::WhitepointAdaptation;
    use crate::colorimetry::{
        luma_coefficients, range_scale, ColorPrimaries, ColorRange, ColorspacePreset,
        MatrixCoefficients,
    };
    use crate::images::{PlaneRef, PlaneRefMut};
    use crate::math::matrix_mul_vec3;
    use crate::primaries::{primaries_desc, primary_mapping_matrix};
    use crate::transfer::transfer_characteristics;
    use crate::ycbcr::{rgb_to_yuv_matrix, yuv_to_rgb_matrix};
    use half::f16;
    use rand::Rng;

    struct Yuv8Buffers {
        y: Vec<u8>,
        u: Vec<u8>,
        v: Vec<u8>,
        w: u32,
        h: u32,
        format: PixelFormat,
    }

    impl Yuv8Buffers {
        fn alloc(format: PixelFormat, w: u32, h: u32) -> Yuv8Buffers {
            let cw = format.chroma_width(w as usize);
            let ch = format.chroma_height(h as usize);
            Yuv8Buffers {
                y: vec![0u8; w as usize * h as usize],
                u: vec![0u8; cw * ch],
                v: vec![0u8; cw * ch],
                w,
                h,
                format,
            }
        }

        fn frame(&self, color: ColorMetadata) -> VideoFrame<'_> {
            let cw = self.format.chroma_width(self.w as usize);
            VideoFrame {
                format: self.format,
                planes: [
                    PlaneRef::U8(&self.y),
                    PlaneRef::U8(&self.u),
                    PlaneRef::U8(&self.v),
                    PlaneRef::None,
                ],
                strides: [self.w as usize, cw, cw, 0],
                width: self.w,
                height: self.h,
                color,
            }
        }

        fn frame_mut(&mut self) -> VideoFrameMut<'_> {
            let cw = self.format.chroma_width(self.w as usize);
            VideoFrameMut {
                format: self.format,
                planes: [
                    PlaneRefMut::U8(&mut self.y),
                    PlaneRefMut::U8(&mut self.u),
                    PlaneRefMut::U8(&mut self.v),
                    PlaneRefMut::None,
                ],
                strides: [self.w as usize, cw, cw, 0],
                width: self.w,
                height: self.h,
                color: ColorMetadata::default(),
            }
        }
    }

    fn bt709_meta() -> ColorMetadata {
        ColorMetadata {
            matrix: MatrixCoefficients::Bt709,
            primaries: ColorPrimaries::Bt709,
            transfer: TransferCharacteristic::Bt709,
            range: ColorRange::Tv,
        }
    }

    /// Fills 4:2:0 planes from random in-gamut RGB, quantised through the
    /// exact double-precision forward transform.
    fn fill_from_random_rgb(buffers: &mut Yuv8Buffers, matrix: MatrixCoefficients) {
        let mut rng = rand::thread_rng();
        let m = rgb_to_yuv_matrix(luma_coefficients(matrix).unwrap());
        let scale = range_scale(ColorRange::Tv, 8);
        let w = buffers.w as usize;
        let cw = buffers.format.chroma_width(w);
        for cy in 0..buffers.format.chroma_height(buffers.h as usize) {
            for cx in 0..cw {
                let rgb = [
                    rng.gen_range(0.0..1.0f64),
                    rng.gen_range(0.0..1.0f64),
                    rng.gen_range(0.0..1.0f64),
                ];
                let yuv = matrix_mul_vec3(m, rgb);
                buffers.u[cy * cw + cx] = (128.0 + yuv[1] * scale.uv_range as f64)
                    .round()
                    .clamp(0.0, 255.0) as u8;
                buffers.v[cy * cw + cx] = (128.0 + yuv[2] * scale.uv_range as f64)
                    .round()
                    .clamp(0.0, 255.0) as u8;
                // Luma varies inside the block but stays tied to the block's
                // chroma so every pixel remains a valid in-gamut sample.
                for sub in 0..4 {
                    let x = cx * 2 + (sub & 1);
                    let y = cy * 2 + (sub >> 1);
                    let jitter = rng.gen_range(-0.02..0.02f64);
                    let luma = (yuv[0] + jitter).clamp(0.05, 0.95);
                    buffers.y[y * w + x] = (scale.offset as f64 + luma * scale.y_range as f64)
                        .round()
                        .clamp(0.0, 255.0) as u8;
                }
            }
        }
    }

    #[test]
    fn test_identity_conversion_is_byte_exact() {
        let mut src = Yuv8Buffers::alloc(PixelFormat::YUV420P8, 96, 96);
        fill_from_random_rgb(&mut src, MatrixCoefficients::Bt709);
        let mut dst = Yuv8Buffers::alloc(PixelFormat::YUV420P8, 96, 96);
        let opts = ConverterOptions {
            all: ColorspacePreset::Bt709,
            ..ConverterOptions::default()
        };
        let mut converter = ColorspaceConverter::new(opts);
        let input = src.frame(bt709_meta());
        let mut output = dst.frame_mut();
        converter.convert(&input, &mut output).unwrap();
        assert!(converter.planner.plan.yuv2yuv_passthrough);
        assert_eq!(output.color, bt709_meta());
        drop(output);
        assert_eq!(src.y, dst.y);
        assert_eq!(src.u, dst.u);
        assert_eq!(src.v, dst.v);
    }

    #[test]
    fn test_matrix_and_primaries_round_trip() {
        // bt709 -> bt2020 -> bt709 on in-gamut data comes back within one
        // code value on average.
        let mut src = Yuv8Buffers::alloc(PixelFormat::YUV420P8, 96, 96);
        fill_from_random_rgb(&mut src, MatrixCoefficients::Bt709);
        let mut mid = Yuv8Buffers::alloc(PixelFormat::YUV420P8, 96, 96);
        let mut back = Yuv8Buffers::alloc(PixelFormat::YUV420P8, 96, 96);

        let mut to2020 = ColorspaceConverter::new(ConverterOptions {
            all: ColorspacePreset::Bt2020,
            ..ConverterOptions::default()
        });
        let mut mid_frame = mid.frame_mut();
        to2020.convert(&src.frame(bt709_meta()), &mut mid_frame).unwrap();
        let mid_meta = mid_frame.color;
        drop(mid_frame);
        assert_eq!(mid_meta.matrix, MatrixCoefficients::Bt2020Ncl);

        let mut to709 = ColorspaceConverter::new(ConverterOptions {
            all: ColorspacePreset::Bt709,
            ..ConverterOptions::default()
        });
        let mut back_frame = back.frame_mut();
        to709.convert(&mid.frame(mid_meta), &mut back_frame).unwrap();
        drop(back_frame);

        for (name, a, b) in [
            ("y", &src.y, &back.y),
            ("u", &src.u, &back.u),
            ("v", &src.v, &back.v),
        ] {
            let total: f64 = a
                .iter()
                .zip(b.iter())
                .map(|(&x, &y)| (x as f64 - y as f64).abs())
                .sum();
            let mean = total / a.len() as f64;
            assert!(mean < 1.0, "{} mean abs diff {}", name, mean);
        }
    }

    #[test]
    fn test_f32_linear_round_trip() {
        let w = 64usize;
        let h = 64usize;
        let mut rng = rand::thread_rng();
        let g: Vec<f32> = (0..w * h).map(|_| rng.gen_range(0.0..1.0)).collect();
        let b: Vec<f32> = (0..w * h).map(|_| rng.gen_range(0.0..1.0)).collect();
        let r: Vec<f32> = (0..w * h).map(|_| rng.gen_range(0.0..1.0)).collect();
        let mut lin = (vec![0f32; w * h], vec![0f32; w * h], vec![0f32; w * h]);
        let mut out = (vec![0f32; w * h], vec![0f32; w * h], vec![0f32; w * h]);

        let srgb_meta = ColorMetadata {
            matrix: MatrixCoefficients::Bt709,
            primaries: ColorPrimaries::Bt709,
            transfer: TransferCharacteristic::Srgb,
            range: ColorRange::Pc,
        };
        fn gbr_frame<'a>(
            g: &'a [f32],
            b: &'a [f32],
            r: &'a [f32],
            w: usize,
            h: usize,
            color: ColorMetadata,
        ) -> VideoFrame<'a> {
            VideoFrame {
                format: PixelFormat::GBRPF32,
                planes: [
                    PlaneRef::F32(g),
                    PlaneRef::F32(b),
                    PlaneRef::F32(r),
                    PlaneRef::None,
                ],
                strides: [w, w, w, 0],
                width: w as u32,
                height: h as u32,
                color,
            }
        }

        let mut to_linear = ColorspaceConverter::new(ConverterOptions {
            space: MatrixCoefficients::Bt709,
            primaries: ColorPrimaries::Bt709,
            trc: TransferCharacteristic::Linear,
            range: ColorRange::Pc,
            ..ConverterOptions::default()
        });
        let mut mid_out = VideoFrameMut {
            format: PixelFormat::GBRPF32,
            planes: [
                PlaneRefMut::F32(&mut lin.0),
                PlaneRefMut::F32(&mut lin.1),
                PlaneRefMut::F32(&mut lin.2),
                PlaneRefMut::None,
            ],
            strides: [w, w, w, 0],
            width: w as u32,
            height: h as u32,
            color: ColorMetadata::default(),
        };
        to_linear
            .convert(&gbr_frame(&g, &b, &r, w, h, srgb_meta), &mut mid_out)
            .unwrap();
        let mid_meta = mid_out.color;
        drop(mid_out);
        assert_eq!(mid_meta.transfer, TransferCharacteristic::Linear);

        let mut to_srgb = ColorspaceConverter::new(ConverterOptions {
            space: MatrixCoefficients::Bt709,
            primaries: ColorPrimaries::Bt709,
            trc: TransferCharacteristic::Srgb,
            range: ColorRange::Pc,
            ..ConverterOptions::default()
        });
        let mut back_out = VideoFrameMut {
            format: PixelFormat::GBRPF32,
            planes: [
                PlaneRefMut::F32(&mut out.0),
                PlaneRefMut::F32(&mut out.1),
                PlaneRefMut::F32(&mut out.2),
                PlaneRefMut::None,
            ],
            strides: [w, w, w, 0],
            width: w as u32,
            height: h as u32,
            color: ColorMetadata::default(),
        };
        to_srgb
            .convert(&gbr_frame(&lin.0, &lin.1, &lin.2, w, h, mid_meta), &mut back_out)
            .unwrap();
        drop(back_out);

        for (orig, round) in [(&g, &out.0), (&b, &out.1), (&r, &out.2)] {
            let max = orig
                .iter()
                .zip(round.iter())
                .map(|(&x, &y)| (x - y).abs())
                .fold(0f32, f32::max);
            assert!(max < 1e-4, "max diff {}", max);
        }
    }

    #[test]
    fn test_f16_fast_mode_is_identity() {
        let w = 32usize;
        let h = 32usize;
        let mut rng = rand::thread_rng();
        // Arbitrary half bit patterns; the copy must not reinterpret them.
        let planes: Vec<Vec<u16>> = (0..3)
            .map(|_| (0..w * h).map(|_| rng.gen::<u16>()).collect())
            .collect();
        let mut out_planes = vec![vec![0u16; w * h]; 3];

        let meta = ColorMetadata {
            matrix: MatrixCoefficients::Bt709,
            primaries: ColorPrimaries::Bt709,
            transfer: TransferCharacteristic::Srgb,
            range: ColorRange::Pc,
        };
        let mut converter = ColorspaceConverter::new(ConverterOptions {
            space: MatrixCoefficients::Bt709,
            primaries: ColorPrimaries::Bt709,
            trc: TransferCharacteristic::Srgb,
            range: ColorRange::Pc,
            fast: true,
            ..ConverterOptions::default()
        });
        let input = VideoFrame {
            format: PixelFormat::GBRPF16,
            planes: [
                PlaneRef::U16(&planes[0]),
                PlaneRef::U16(&planes[1]),
                PlaneRef::U16(&planes[2]),
                PlaneRef::None,
            ],
            strides: [w, w, w, 0],
            width: w as u32,
            height: h as u32,
            color: meta,
        };
        let [o0, o1, o2] = &mut out_planes[..] else {
            unreachable!()
        };
        let mut output = VideoFrameMut {
            format: PixelFormat::GBRPF16,
            planes: [
                PlaneRefMut::U16(o0),
                PlaneRefMut::U16(o1),
                PlaneRefMut::U16(o2),
                PlaneRefMut::None,
            ],
            strides: [w, w, w, 0],
            width: w as u32,
            height: h as u32,
            color: ColorMetadata::default(),
        };
        converter.convert(&input, &mut output).unwrap();
        assert!(converter.planner.plan.yuv2yuv_passthrough);
        drop(output);
        assert_eq!(planes[0], out_planes[0]);
        assert_eq!(planes[1], out_planes[1]);
        assert_eq!(planes[2], out_planes[2]);
    }

    #[test]
    fn test_f16_srgb_to_linear_values() {
        let w = 32usize;
        let h = 2usize;
        let half = |v: f32| f16::from_f32(v).to_bits();
        let g = vec![half(0.5); w * h];
        let b = vec![half(0.25); w * h];
        let r = vec![half(1.0); w * h];
        let mut out = vec![vec![0u16; w * h]; 3];

        let meta = ColorMetadata {
            matrix: MatrixCoefficients::Bt709,
            primaries: ColorPrimaries::Bt709,
            transfer: TransferCharacteristic::Srgb,
            range: ColorRange::Pc,
        };
        let mut converter = ColorspaceConverter::new(ConverterOptions {
            space: MatrixCoefficients::Bt709,
            primaries: ColorPrimaries::Bt709,
            trc: TransferCharacteristic::Linear,
            range: ColorRange::Pc,
            ..ConverterOptions::default()
        });
        let input = VideoFrame {
            format: PixelFormat::GBRPF16,
            planes: [
                PlaneRef::U16(&g),
                PlaneRef::U16(&b),
                PlaneRef::U16(&r),
                PlaneRef::None,
            ],
            strides: [w, w, w, 0],
            width: w as u32,
            height: h as u32,
            color: meta,
        };
        let [o0, o1, o2] = &mut out[..] else {
            unreachable!()
        };
        let mut output = VideoFrameMut {
            format: PixelFormat::GBRPF16,
            planes: [
                PlaneRefMut::U16(o0),
                PlaneRefMut::U16(o1),
                PlaneRefMut::U16(o2),
                PlaneRefMut::None,
            ],
            strides: [w, w, w, 0],
            width: w as u32,
            height: h as u32,
            color: ColorMetadata::default(),
        };
        converter.convert(&input, &mut output).unwrap();
        drop(output);

        let srgb = transfer_characteristics(TransferCharacteristic::Srgb).unwrap();
        for (plane, signal) in [(&out[0], 0.5f64), (&out[1], 0.25), (&out[2], 1.0)] {
            let expected = srgb.linearize(signal) as f32;
            let got = f16::from_bits(plane[0]).to_f32();
            assert!(
                (got - expected).abs() < 2e-3,
                "signal {}: {} vs {}",
                signal,
                got,
                expected
            );
            assert!(plane.iter().all(|&bits| bits == plane[0]));
        }
    }

    #[test]
    fn test_range_conversion_fastmode_closed_form() {
        let w = 64usize;
        let h = 4usize;
        let mut rng = rand::thread_rng();
        let y: Vec<u16> = (0..w * h).map(|_| rng.gen_range(256..3761)).collect();
        let u = vec![2048u16; w * h];
        let v = vec![2048u16; w * h];
        let mut out = vec![vec![0u16; w * h]; 3];

        let meta = ColorMetadata {
            matrix: MatrixCoefficients::Bt2020Ncl,
            primaries: ColorPrimaries::Bt2020,
            transfer: TransferCharacteristic::Bt2020_12,
            range: ColorRange::Tv,
        };
        let mut converter = ColorspaceConverter::new(ConverterOptions {
            space: MatrixCoefficients::Bt2020Ncl,
            primaries: ColorPrimaries::Bt2020,
            trc: TransferCharacteristic::Bt2020_12,
            range: ColorRange::Pc,
            ..ConverterOptions::default()
        });
        let input = VideoFrame {
            format: PixelFormat::YUV444P12,
            planes: [
                PlaneRef::U16(&y),
                PlaneRef::U16(&u),
                PlaneRef::U16(&v),
                PlaneRef::None,
            ],
            strides: [w, w, w, 0],
            width: w as u32,
            height: h as u32,
            color: meta,
        };
        let [o0, o1, o2] = &mut out[..] else {
            unreachable!()
        };
        let mut output = VideoFrameMut {
            format: PixelFormat::YUV444P12,
            planes: [
                PlaneRefMut::U16(o0),
                PlaneRefMut::U16(o1),
                PlaneRefMut::U16(o2),
                PlaneRefMut::None,
            ],
            strides: [w, w, w, 0],
            width: w as u32,
            height: h as u32,
            color: ColorMetadata::default(),
        };
        converter.convert(&input, &mut output).unwrap();
        assert!(converter.planner.plan.yuv2yuv_fastmode);
        assert!(!converter.planner.plan.yuv2yuv_passthrough);
        drop(output);

        for (&src, &dst) in y.iter().zip(out[0].iter()) {
            let exact = (src as f64 - 256.0) * 4095.0 / 3504.0;
            assert!(
                (dst as f64 - exact).abs() <= 1.0,
                "luma {} -> {} (exact {})",
                src,
                dst,
                exact
            );
        }
        assert!(out[1].iter().all(|&value| value == 2048));
    }

    #[test]
    fn test_full_path_matches_double_reference() {
        let w = 96usize;
        let h = 96usize;
        let mut src = Yuv8Buffers::alloc(PixelFormat::YUV420P8, w as u32, h as u32);
        // Smooth gradient.
        for y in 0..h {
            for x in 0..w {
                src.y[y * w + x] = (16 + (x * 219) / (w - 1)) as u8;
            }
        }
        let cw = w / 2;
        for cy in 0..h / 2 {
            for cx in 0..cw {
                src.u[cy * cw + cx] = (96 + (cx * 64) / (cw - 1)) as u8;
                src.v[cy * cw + cx] = (112 + (cy * 32) / (h / 2 - 1)) as u8;
            }
        }
        let in_meta = ColorMetadata {
            matrix: MatrixCoefficients::Smpte170M,
            primaries: ColorPrimaries::Smpte170M,
            transfer: TransferCharacteristic::Smpte170M,
            range: ColorRange::Tv,
        };
        let mut dst = Yuv8Buffers::alloc(PixelFormat::YUV420P8, w as u32, h as u32);
        let mut converter = ColorspaceConverter::new(ConverterOptions {
            all: ColorspacePreset::Bt709,
            ..ConverterOptions::default()
        });
        let mut output = dst.frame_mut();
        converter.convert(&src.frame(in_meta), &mut output).unwrap();
        drop(output);

        // Double precision mirror of the whole pipeline, no fixed point.
        let in_scale = range_scale(ColorRange::Tv, 8);
        let yuv2rgb =
            yuv_to_rgb_matrix(luma_coefficients(MatrixCoefficients::Smpte170M).unwrap());
        let rgb2yuv = rgb_to_yuv_matrix(luma_coefficients(MatrixCoefficients::Bt709).unwrap());
        let in_txchr = transfer_characteristics(TransferCharacteristic::Smpte170M).unwrap();
        let out_txchr = transfer_characteristics(TransferCharacteristic::Bt709).unwrap();
        let map = primary_mapping_matrix(
            &primaries_desc(ColorPrimaries::Smpte170M).unwrap(),
            &primaries_desc(ColorPrimaries::Bt709).unwrap(),
            WhitepointAdaptation::Bradford,
        );
        let reference = |x: usize, y: usize| -> [f64; 3] {
            let luma = (src.y[y * w + x] as f64 - in_scale.offset as f64) / in_scale.y_range as f64;
            let cb = (src.u[(y / 2) * cw + x / 2] as f64 - 128.0) / in_scale.uv_range as f64;
            let cr = (src.v[(y / 2) * cw + x / 2] as f64 - 128.0) / in_scale.uv_range as f64;
            let rgb = matrix_mul_vec3(yuv2rgb, [luma, cb, cr]);
            let lin = [
                in_txchr.linearize(rgb[0]),
                in_txchr.linearize(rgb[1]),
                in_txchr.linearize(rgb[2]),
            ];
            let mapped = matrix_mul_vec3(map, lin);
            let delin = [
                out_txchr.delinearize(mapped[0]),
                out_txchr.delinearize(mapped[1]),
                out_txchr.delinearize(mapped[2]),
            ];
            matrix_mul_vec3(rgb2yuv, delin)
        };
        for y in 0..h {
            for x in 0..w {
                let expected = reference(x, y);
                let y_code = in_scale.offset as f64 + expected[0] * in_scale.y_range as f64;
                let got = dst.y[y * w + x] as f64;
                assert!(
                    (got - y_code.round().clamp(0.0, 255.0)).abs() <= 2.0,
                    "luma at ({}, {}): {} vs {}",
                    x,
                    y,
                    got,
                    y_code
                );
            }
        }
        for cy in 0..h / 2 {
            for cx in 0..cw {
                let expected = reference(cx * 2, cy * 2);
                let u_code = 128.0 + expected[1] * in_scale.uv_range as f64;
                let v_code = 128.0 + expected[2] * in_scale.uv_range as f64;
                let got_u = dst.u[cy * cw + cx] as f64;
                let got_v = dst.v[cy * cw + cx] as f64;
                assert!((got_u - u_code.round().clamp(0.0, 255.0)).abs() <= 2.0);
                assert!((got_v - v_code.round().clamp(0.0, 255.0)).abs() <= 2.0);
            }
        }
    }

    #[test]
    fn test_odd_dimensions_rejected() {
        let mut src = Yuv8Buffers::alloc(PixelFormat::YUV444P8, 98, 96);
        let mut dst = Yuv8Buffers::alloc(PixelFormat::YUV444P8, 98, 96);
        src.w = 97;
        dst.w = 97;
        let mut converter = ColorspaceConverter::new(ConverterOptions {
            all: ColorspacePreset::Bt709,
            ..ConverterOptions::default()
        });
        let input = src.frame(bt709_meta());
        let mut output = dst.frame_mut();
        assert_eq!(
            converter.convert(&input, &mut output),
            Err(ConvertError::OddDimensions(97, 96))
        );
    }

    #[test]
    fn test_unspecified_range_assumes_tv_and_warns_once() {
        let mut src = Yuv8Buffers::alloc(PixelFormat::YUV420P8, 32, 32);
        fill_from_random_rgb(&mut src, MatrixCoefficients::Bt709);
        let mut meta = bt709_meta();
        meta.range = ColorRange::Unspecified;
        let opts = ConverterOptions {
            all: ColorspacePreset::Bt709,
            range: ColorRange::Pc,
            ..ConverterOptions::default()
        };

        let mut dst_unspec = Yuv8Buffers::alloc(PixelFormat::YUV420P8, 32, 32);
        let mut converter = ColorspaceConverter::new(opts);
        let mut output = dst_unspec.frame_mut();
        converter.convert(&src.frame(meta), &mut output).unwrap();
        drop(output);
        assert!(converter.planner.did_warn());

        // Second frame keeps converting without issue.
        let mut output = dst_unspec.frame_mut();
        converter.convert(&src.frame(meta), &mut output).unwrap();
        drop(output);

        let mut dst_tv = Yuv8Buffers::alloc(PixelFormat::YUV420P8, 32, 32);
        let mut converter_tv = ColorspaceConverter::new(opts);
        let mut output = dst_tv.frame_mut();
        converter_tv
            .convert(&src.frame(bt709_meta()), &mut output)
            .unwrap();
        drop(output);
        assert!(!converter_tv.planner.did_warn());

        assert_eq!(dst_unspec.y, dst_tv.y);
        assert_eq!(dst_unspec.u, dst_tv.u);
        assert_eq!(dst_unspec.v, dst_tv.v);
    }

    #[test]
    fn test_slice_count_does_not_change_output() {
        let mut src = Yuv8Buffers::alloc(PixelFormat::YUV420P8, 96, 96);
        fill_from_random_rgb(&mut src, MatrixCoefficients::Smpte170M);
        let in_meta = ColorMetadata {
            matrix: MatrixCoefficients::Smpte170M,
            primaries: ColorPrimaries::Smpte170M,
            transfer: TransferCharacteristic::Smpte170M,
            range: ColorRange::Tv,
        };
        let opts = ConverterOptions {
            all: ColorspacePreset::Bt709,
            ..ConverterOptions::default()
        };

        let mut single = Yuv8Buffers::alloc(PixelFormat::YUV420P8, 96, 96);
        let mut converter = ColorspaceConverter::new(opts);
        let mut output = single.frame_mut();
        converter
            .convert_with_slices(&src.frame(in_meta), &mut output, 1)
            .unwrap();
        drop(output);

        let mut split = Yuv8Buffers::alloc(PixelFormat::YUV420P8, 96, 96);
        let mut converter = ColorspaceConverter::new(opts);
        let mut output = split.frame_mut();
        converter
            .convert_with_slices(&src.frame(in_meta), &mut output, 4)
            .unwrap();
        drop(output);

        assert_eq!(single.y, split.y);
        assert_eq!(single.u, split.u);
        assert_eq!(single.v, split.v);
    }

    #[test]
    fn test_slice_bounds_cover_frame() {
        for height in [2usize, 64, 96, 1080] {
            for n in [1usize, 2, 3, 4, 7, 16] {
                let bounds = slice_bounds(height, n);
                assert_eq!(bounds.first().unwrap().0, 0);
                assert_eq!(bounds.last().unwrap().1, height);
                for pair in bounds.windows(2) {
                    assert_eq!(pair[0].1, pair[1].0);
                }
                for &(h1, h2) in &bounds {
                    assert_eq!(h1 % 2, 0);
                    assert!(h2 > h1);
                }
            }
        }
    }

    #[test]
    fn test_dither_stays_close_to_undithered() {
        let mut src = Yuv8Buffers::alloc(PixelFormat::YUV420P8, 64, 64);
        fill_from_random_rgb(&mut src, MatrixCoefficients::Smpte170M);
        let in_meta = ColorMetadata {
            matrix: MatrixCoefficients::Smpte170M,
            primaries: ColorPrimaries::Smpte170M,
            transfer: TransferCharacteristic::Smpte170M,
            range: ColorRange::Tv,
        };

        let mut plain = Yuv8Buffers::alloc(PixelFormat::YUV420P8, 64, 64);
        let mut converter = ColorspaceConverter::new(ConverterOptions {
            all: ColorspacePreset::Bt709,
            ..ConverterOptions::default()
        });
        let mut output = plain.frame_mut();
        converter.convert(&src.frame(in_meta), &mut output).unwrap();
        drop(output);

        let mut dithered = Yuv8Buffers::alloc(PixelFormat::YUV420P8, 64, 64);
        let mut converter = ColorspaceConverter::new(ConverterOptions {
            all: ColorspacePreset::Bt709,
            dither: DitherMode::Fsb,
            ..ConverterOptions::default()
        });
        let mut output = dithered.frame_mut();
        converter.convert(&src.frame(in_meta), &mut output).unwrap();
        drop(output);

        for (a, b) in plain.y.iter().zip(dithered.y.iter()) {
            assert!((*a as i32 - *b as i32).abs() <= 2);
        }
    }

    #[test]
    fn test_depth_change_through_full_path() {
        let mut src = Yuv8Buffers::alloc(PixelFormat::YUV420P8, 32, 32);
        fill_from_random_rgb(&mut src, MatrixCoefficients::Smpte170M);
        let in_meta = ColorMetadata {
            matrix: MatrixCoefficients::Smpte170M,
            primaries: ColorPrimaries::Smpte170M,
            transfer: TransferCharacteristic::Smpte170M,
            range: ColorRange::Tv,
        };
        let w = 32usize;
        let mut out = vec![vec![0u16; w * w]; 3];
        let mut converter = ColorspaceConverter::new(ConverterOptions {
            all: ColorspacePreset::Bt709,
            ..ConverterOptions::default()
        });
        let [o0, o1, o2] = &mut out[..] else {
            unreachable!()
        };
        let mut output = VideoFrameMut {
            format: PixelFormat::YUV444P12,
            planes: [
                PlaneRefMut::U16(o0),
                PlaneRefMut::U16(o1),
                PlaneRefMut::U16(o2),
                PlaneRefMut::None,
            ],
            strides: [w, w, w, 0],
            width: w as u32,
            height: w as u32,
            color: ColorMetadata::default(),
        };
        converter.convert(&src.frame(in_meta), &mut output).unwrap();
        let out_meta = output.color;
        drop(output);
        // Preset transfer bumps to the 12-bit bt2020 curve only for bt2020;
        // bt709 stays bt709.
        assert_eq!(out_meta.transfer, TransferCharacteristic::Bt709);
        assert!(out[0].iter().all(|&value| value <= 4095));
        let luma_span = out[0].iter().copied().max().unwrap() as i32
            - out[0].iter().copied().min().unwrap() as i32;
        assert!(luma_span > 0);
    }
}
