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
use crate::rgb_ops::clip_int16;
use num_traits::AsPrimitive;

/// YUV to int16 linear-scale RGB kernel for one slice. Strides are in
/// elements; width and height are even and the slice starts on a chroma row
/// boundary.
pub(crate) type Yuv2RgbFn<T> = fn(
    rgb: &mut [&mut [i16]; 3],
    rgb_stride: usize,
    yuv: [&[T]; 3],
    yuv_strides: [usize; 3],
    width: usize,
    height: usize,
    coeffs: &[[[i16; 8]; 3]; 3],
    yuv_offset: &[i16; 8],
);

/// Converts YUV code values into the pseudo-restricted int16 RGB
/// intermediate where [0.0, 1.0] spans [0, 28672] and the rest of the int16
/// range absorbs out-of-range excursions. Chroma is read nearest-neighbour
/// at luma resolution; use a real resampler upstream if that is not good
/// enough.
fn yuv_to_lrgb<T, const BIT_DEPTH: usize, const SS_W: usize, const SS_H: usize>(
    rgb: &mut [&mut [i16]; 3],
    rgb_stride: usize,
    yuv: [&[T]; 3],
    yuv_strides: [usize; 3],
    width: usize,
    height: usize,
    coeffs: &[[[i16; 8]; 3]; 3],
    yuv_offset: &[i16; 8],
) where
    T: Copy + AsPrimitive<i32>,
{
    let cy = coeffs[0][0][0] as i32;
    let crv = coeffs[0][2][0] as i32;
    let cgu = coeffs[1][1][0] as i32;
    let cgv = coeffs[1][2][0] as i32;
    let cbu = coeffs[2][1][0] as i32;
    debug_assert_eq!(coeffs[0][1][0], 0);
    debug_assert_eq!(coeffs[2][2][0], 0);
    debug_assert_eq!(coeffs[1][0][0] as i32, cy);
    debug_assert_eq!(coeffs[2][0][0] as i32, cy);

    let sh = (BIT_DEPTH - 1) as i32;
    let rnd = 1i32 << (sh - 1);
    let y_off = yuv_offset[0] as i32;
    let uv_off = 128i32 << (BIT_DEPTH - 8);

    let [y_plane, u_plane, v_plane] = yuv;
    let [y_stride, u_stride, v_stride] = yuv_strides;
    let [rgb0, rgb1, rgb2] = rgb;

    for chroma_row in 0..(height >> SS_H) {
        let u_row = &u_plane[chroma_row * u_stride..][..width >> SS_W];
        let v_row = &v_plane[chroma_row * v_stride..][..width >> SS_W];
        for sub in 0..(1usize << SS_H) {
            let row = (chroma_row << SS_H) + sub;
            let y_row = &y_plane[row * y_stride..][..width];
            let r_row = &mut rgb0[row * rgb_stride..][..width];
            let g_row = &mut rgb1[row * rgb_stride..][..width];
            let b_row = &mut rgb2[row * rgb_stride..][..width];
            for (x, ((r, g), b)) in r_row
                .iter_mut()
                .zip(g_row.iter_mut())
                .zip(b_row.iter_mut())
                .enumerate()
            {
                let y_value = (y_row[x].as_() - y_off) * cy;
                let u_value = u_row[x >> SS_W].as_() - uv_off;
                let v_value = v_row[x >> SS_W].as_() - uv_off;
                *r = clip_int16((y_value + crv * v_value + rnd) >> sh);
                *g = clip_int16((y_value + cgu * u_value + cgv * v_value + rnd) >> sh);
                *b = clip_int16((y_value + cbu * u_value + rnd) >> sh);
            }
        }
    }
}

/// Kernel selection by (depth index, subsampling index); a tag-to-function
/// map instead of dynamic dispatch on the hot path.
pub(crate) fn select_yuv_to_lrgb<T>(depth: u32, ss_index: usize) -> Yuv2RgbFn<T>
where
    T: Copy + AsPrimitive<i32>,
{
    match (depth, ss_index) {
        (8, 0) => yuv_to_lrgb::<T, 8, 0, 0>,
        (8, 1) => yuv_to_lrgb::<T, 8, 1, 0>,
        (8, _) => yuv_to_lrgb::<T, 8, 1, 1>,
        (10, 0) => yuv_to_lrgb::<T, 10, 0, 0>,
        (10, 1) => yuv_to_lrgb::<T, 10, 1, 0>,
        (10, _) => yuv_to_lrgb::<T, 10, 1, 1>,
        (_, 0) => yuv_to_lrgb::<T, 12, 0, 0>,
        (_, 1) => yuv_to_lrgb::<T, 12, 1, 0>,
        (_, _) => yuv_to_lrgb::<T, 12, 1, 1>,
    }
}
