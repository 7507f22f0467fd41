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
use crate::scratch::DitherScratch;
use num_traits::AsPrimitive;

/// int16 linear-scale RGB to YUV kernel for one slice.
pub(crate) type Rgb2YuvFn<T> = fn(
    yuv: &mut [&mut [T]; 3],
    yuv_strides: [usize; 3],
    rgb: [&[i16]; 3],
    rgb_stride: usize,
    width: usize,
    height: usize,
    coeffs: &[[[i16; 8]; 3]; 3],
    yuv_offset: &[i16; 8],
);

/// Error-diffusion variant; the scratch belongs to this slice alone.
pub(crate) type Rgb2YuvFsbFn<T> = fn(
    yuv: &mut [&mut [T]; 3],
    yuv_strides: [usize; 3],
    rgb: [&[i16]; 3],
    rgb_stride: usize,
    width: usize,
    height: usize,
    coeffs: &[[[i16; 8]; 3]; 3],
    yuv_offset: &[i16; 8],
    dither: &mut DitherScratch,
);

#[inline]
fn clip_depth<T, const BIT_DEPTH: usize>(v: i32) -> T
where
    T: Copy + 'static,
    i32: AsPrimitive<T>,
{
    let max_value = (1i32 << BIT_DEPTH) - 1;
    v.clamp(0, max_value).as_()
}

/// Writes YUV from the int16 RGB intermediate. Luma is computed per pixel,
/// chroma nearest-neighbour from the top-left sample of each subsampling
/// block.
fn lrgb_to_yuv<T, const BIT_DEPTH: usize, const SS_W: usize, const SS_H: usize>(
    yuv: &mut [&mut [T]; 3],
    yuv_strides: [usize; 3],
    rgb: [&[i16]; 3],
    rgb_stride: usize,
    width: usize,
    height: usize,
    coeffs: &[[[i16; 8]; 3]; 3],
    yuv_offset: &[i16; 8],
) where
    T: Copy + 'static,
    i32: AsPrimitive<T>,
{
    let cry = coeffs[0][0][0] as i32;
    let cgy = coeffs[0][1][0] as i32;
    let cby = coeffs[0][2][0] as i32;
    let cru = coeffs[1][0][0] as i32;
    let cgu = coeffs[1][1][0] as i32;
    let cbu = coeffs[1][2][0] as i32;
    let crv = coeffs[2][0][0] as i32;
    let cgv = coeffs[2][1][0] as i32;
    let cbv = coeffs[2][2][0] as i32;
    debug_assert_eq!(coeffs[1][2][0], coeffs[2][0][0]);

    let sh = (29 - BIT_DEPTH) as i32;
    let rnd = 1i32 << (sh - 1);
    let y_off = yuv_offset[0] as i32;
    let uv_off = 128i32 << (BIT_DEPTH - 8);

    let [rgb0, rgb1, rgb2] = rgb;
    let [y_plane, u_plane, v_plane] = yuv;
    let [y_stride, u_stride, v_stride] = yuv_strides;

    for chroma_row in 0..(height >> SS_H) {
        for sub in 0..(1usize << SS_H) {
            let row = (chroma_row << SS_H) + sub;
            let r_row = &rgb0[row * rgb_stride..][..width];
            let g_row = &rgb1[row * rgb_stride..][..width];
            let b_row = &rgb2[row * rgb_stride..][..width];
            let y_row = &mut y_plane[row * y_stride..][..width];
            for (((y, r), g), b) in y_row
                .iter_mut()
                .zip(r_row.iter())
                .zip(g_row.iter())
                .zip(b_row.iter())
            {
                let luma = cry * *r as i32 + cgy * *g as i32 + cby * *b as i32;
                *y = clip_depth::<T, BIT_DEPTH>(y_off + ((luma + rnd) >> sh));
            }
        }
        let top = chroma_row << SS_H;
        let r_row = &rgb0[top * rgb_stride..][..width];
        let g_row = &rgb1[top * rgb_stride..][..width];
        let b_row = &rgb2[top * rgb_stride..][..width];
        let u_row = &mut u_plane[chroma_row * u_stride..][..width >> SS_W];
        let v_row = &mut v_plane[chroma_row * v_stride..][..width >> SS_W];
        for (x, (u, v)) in u_row.iter_mut().zip(v_row.iter_mut()).enumerate() {
            let r = r_row[x << SS_W] as i32;
            let g = g_row[x << SS_W] as i32;
            let b = b_row[x << SS_W] as i32;
            *u = clip_depth::<T, BIT_DEPTH>(uv_off + ((cru * r + cgu * g + cbu * b + rnd) >> sh));
            *v = clip_depth::<T, BIT_DEPTH>(uv_off + ((crv * r + cgv * g + cbv * b + rnd) >> sh));
        }
    }
}

#[inline]
fn diffuse(cur: &mut [i32], next: &mut [i32], x: usize, e: i32) {
    // Physical index is logical + 1; reads x - 1 and writes x + 1 stay in
    // bounds through the one-element pre-pad.
    cur[x + 2] += (e * 7) >> 4;
    next[x] += (e * 3) >> 4;
    next[x + 1] += (e * 5) >> 4;
    next[x + 2] += e >> 4;
}

/// Floyd-Steinberg style error diffusion on the quantisation residual. The
/// residual is taken before clipping so saturated pixels do not flood their
/// neighbourhood with error.
fn lrgb_to_yuv_fsb<T, const BIT_DEPTH: usize, const SS_W: usize, const SS_H: usize>(
    yuv: &mut [&mut [T]; 3],
    yuv_strides: [usize; 3],
    rgb: [&[i16]; 3],
    rgb_stride: usize,
    width: usize,
    height: usize,
    coeffs: &[[[i16; 8]; 3]; 3],
    yuv_offset: &[i16; 8],
    dither: &mut DitherScratch,
) where
    T: Copy + 'static,
    i32: AsPrimitive<T>,
{
    let cry = coeffs[0][0][0] as i32;
    let cgy = coeffs[0][1][0] as i32;
    let cby = coeffs[0][2][0] as i32;
    let cru = coeffs[1][0][0] as i32;
    let cgu = coeffs[1][1][0] as i32;
    let cbu = coeffs[1][2][0] as i32;
    let crv = coeffs[2][0][0] as i32;
    let cgv = coeffs[2][1][0] as i32;
    let cbv = coeffs[2][2][0] as i32;

    let sh = (29 - BIT_DEPTH) as i32;
    let y_off = yuv_offset[0] as i32;
    let uv_off = 128i32 << (BIT_DEPTH - 8);

    let [rgb0, rgb1, rgb2] = rgb;
    let [y_plane, u_plane, v_plane] = yuv;
    let [y_stride, u_stride, v_stride] = yuv_strides;

    for chroma_row in 0..(height >> SS_H) {
        for sub in 0..(1usize << SS_H) {
            let row = (chroma_row << SS_H) + sub;
            let r_row = &rgb0[row * rgb_stride..][..width];
            let g_row = &rgb1[row * rgb_stride..][..width];
            let b_row = &rgb2[row * rgb_stride..][..width];
            let y_row = &mut y_plane[row * y_stride..][..width];
            let (cur, next) = dither.component(0, row & 1);
            for (x, y) in y_row.iter_mut().enumerate() {
                let acc = cry * r_row[x] as i32
                    + cgy * g_row[x] as i32
                    + cby * b_row[x] as i32
                    + cur[x + 1];
                let q = acc >> sh;
                *y = clip_depth::<T, BIT_DEPTH>(y_off + q);
                diffuse(cur, next, x, acc - (q << sh));
            }
            cur.fill(0);
        }
        let top = chroma_row << SS_H;
        let r_row = &rgb0[top * rgb_stride..][..width];
        let g_row = &rgb1[top * rgb_stride..][..width];
        let b_row = &rgb2[top * rgb_stride..][..width];
        let u_row = &mut u_plane[chroma_row * u_stride..][..width >> SS_W];
        let v_row = &mut v_plane[chroma_row * v_stride..][..width >> SS_W];
        {
            let (cur, next) = dither.component(1, chroma_row & 1);
            for (x, u) in u_row.iter_mut().enumerate() {
                let r = r_row[x << SS_W] as i32;
                let g = g_row[x << SS_W] as i32;
                let b = b_row[x << SS_W] as i32;
                let acc = cru * r + cgu * g + cbu * b + cur[x + 1];
                let q = acc >> sh;
                *u = clip_depth::<T, BIT_DEPTH>(uv_off + q);
                diffuse(cur, next, x, acc - (q << sh));
            }
            cur.fill(0);
        }
        {
            let (cur, next) = dither.component(2, chroma_row & 1);
            for (x, v) in v_row.iter_mut().enumerate() {
                let r = r_row[x << SS_W] as i32;
                let g = g_row[x << SS_W] as i32;
                let b = b_row[x << SS_W] as i32;
                let acc = crv * r + cgv * g + cbv * b + cur[x + 1];
                let q = acc >> sh;
                *v = clip_depth::<T, BIT_DEPTH>(uv_off + q);
                diffuse(cur, next, x, acc - (q << sh));
            }
            cur.fill(0);
        }
    }
}

pub(crate) fn select_lrgb_to_yuv<T>(depth: u32, ss_index: usize) -> Rgb2YuvFn<T>
where
    T: Copy + 'static,
    i32: AsPrimitive<T>,
{
    match (depth, ss_index) {
        (8, 0) => lrgb_to_yuv::<T, 8, 0, 0>,
        (8, 1) => lrgb_to_yuv::<T, 8, 1, 0>,
        (8, _) => lrgb_to_yuv::<T, 8, 1, 1>,
        (10, 0) => lrgb_to_yuv::<T, 10, 0, 0>,
        (10, 1) => lrgb_to_yuv::<T, 10, 1, 0>,
        (10, _) => lrgb_to_yuv::<T, 10, 1, 1>,
        (_, 0) => lrgb_to_yuv::<T, 12, 0, 0>,
        (_, 1) => lrgb_to_yuv::<T, 12, 1, 0>,
        (_, _) => lrgb_to_yuv::<T, 12, 1, 1>,
    }
}

pub(crate) fn select_lrgb_to_yuv_fsb<T>(depth: u32, ss_index: usize) -> Rgb2YuvFsbFn<T>
where
    T: Copy + 'static,
    i32: AsPrimitive<T>,
{
    match (depth, ss_index) {
        (8, 0) => lrgb_to_yuv_fsb::<T, 8, 0, 0>,
        (8, 1) => lrgb_to_yuv_fsb::<T, 8, 1, 0>,
        (8, _) => lrgb_to_yuv_fsb::<T, 8, 1, 1>,
        (10, 0) => lrgb_to_yuv_fsb::<T, 10, 0, 0>,
        (10, 1) => lrgb_to_yuv_fsb::<T, 10, 1, 0>,
        (10, _) => lrgb_to_yuv_fsb::<T, 10, 1, 1>,
        (_, 0) => lrgb_to_yuv_fsb::<T, 12, 0, 0>,
        (_, 1) => lrgb_to_yuv_fsb::<T, 12, 1, 0>,
        (_, _) => lrgb_to_yuv_fsb::<T, 12, 1, 1>,
    }
}
