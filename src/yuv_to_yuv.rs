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
use num_traits::AsPrimitive;

/// Composed YUV to YUV kernel for one slice, used when the color volume is
/// untouched and only matrix, range or depth change.
pub(crate) type Yuv2YuvFn<Tin, Tout> = fn(
    dst: &mut [&mut [Tout]; 3],
    dst_strides: [usize; 3],
    src: [&[Tin]; 3],
    src_strides: [usize; 3],
    width: usize,
    height: usize,
    coeffs: &[[[i16; 8]; 3]; 3],
    yuv_offset: &[[i16; 8]; 2],
);

fn yuv_to_yuv<
    Tin,
    Tout,
    const IN_DEPTH: usize,
    const OUT_DEPTH: usize,
    const SS_W: usize,
    const SS_H: usize,
>(
    dst: &mut [&mut [Tout]; 3],
    dst_strides: [usize; 3],
    src: [&[Tin]; 3],
    src_strides: [usize; 3],
    width: usize,
    height: usize,
    coeffs: &[[[i16; 8]; 3]; 3],
    yuv_offset: &[[i16; 8]; 2],
) where
    Tin: Copy + AsPrimitive<i32>,
    Tout: Copy + 'static,
    i32: AsPrimitive<Tout>,
{
    let cyy = coeffs[0][0][0] as i32;
    let cyu = coeffs[0][1][0] as i32;
    let cyv = coeffs[0][2][0] as i32;
    let cuu = coeffs[1][1][0] as i32;
    let cuv = coeffs[1][2][0] as i32;
    let cvu = coeffs[2][1][0] as i32;
    let cvv = coeffs[2][2][0] as i32;
    // The composed matrix never mixes luma into chroma.
    debug_assert_eq!(coeffs[1][0][0], 0);
    debug_assert_eq!(coeffs[2][0][0], 0);

    let sh = (14 + IN_DEPTH - OUT_DEPTH) as i32;
    let rnd = 1i32 << (sh - 1);
    let max_value = (1i32 << OUT_DEPTH) - 1;
    let y_off_in = yuv_offset[0][0] as i32;
    let y_off_out = yuv_offset[1][0] as i32;
    let uv_off_in = 128i32 << (IN_DEPTH - 8);
    let uv_off_out = 128i32 << (OUT_DEPTH - 8);

    let [src_y, src_u, src_v] = src;
    let [dst_y, dst_u, dst_v] = dst;

    for chroma_row in 0..(height >> SS_H) {
        let su_row = &src_u[chroma_row * src_strides[1]..][..width >> SS_W];
        let sv_row = &src_v[chroma_row * src_strides[2]..][..width >> SS_W];
        for sub in 0..(1usize << SS_H) {
            let row = (chroma_row << SS_H) + sub;
            let sy_row = &src_y[row * src_strides[0]..][..width];
            let dy_row = &mut dst_y[row * dst_strides[0]..][..width];
            for (x, dy) in dy_row.iter_mut().enumerate() {
                let y = sy_row[x].as_() - y_off_in;
                let u = su_row[x >> SS_W].as_() - uv_off_in;
                let v = sv_row[x >> SS_W].as_() - uv_off_in;
                let value = y_off_out + ((cyy * y + cyu * u + cyv * v + rnd) >> sh);
                *dy = value.clamp(0, max_value).as_();
            }
        }
        let du_row = &mut dst_u[chroma_row * dst_strides[1]..][..width >> SS_W];
        let dv_row = &mut dst_v[chroma_row * dst_strides[2]..][..width >> SS_W];
        for (x, (du, dv)) in du_row.iter_mut().zip(dv_row.iter_mut()).enumerate() {
            let u = su_row[x].as_() - uv_off_in;
            let v = sv_row[x].as_() - uv_off_in;
            let u_value = uv_off_out + ((cuu * u + cuv * v + rnd) >> sh);
            let v_value = uv_off_out + ((cvu * u + cvv * v + rnd) >> sh);
            *du = u_value.clamp(0, max_value).as_();
            *dv = v_value.clamp(0, max_value).as_();
        }
    }
}

/// Tag-to-function map over (input depth, output depth, subsampling index).
/// The planner guarantees the sample types agree with the depths.
pub(crate) fn select_yuv_to_yuv<Tin, Tout>(
    in_depth: u32,
    out_depth: u32,
    ss_index: usize,
) -> Yuv2YuvFn<Tin, Tout>
where
    Tin: Copy + AsPrimitive<i32>,
    Tout: Copy + 'static,
    i32: AsPrimitive<Tout>,
{
    macro_rules! arm {
        ($in_depth:expr, $out_depth:expr) => {
            match ss_index {
                0 => yuv_to_yuv::<Tin, Tout, $in_depth, $out_depth, 0, 0>,
                1 => yuv_to_yuv::<Tin, Tout, $in_depth, $out_depth, 1, 0>,
                _ => yuv_to_yuv::<Tin, Tout, $in_depth, $out_depth, 1, 1>,
            }
        };
    }
    match (in_depth, out_depth) {
        (8, 8) => arm!(8, 8),
        (8, 10) => arm!(8, 10),
        (8, _) => arm!(8, 12),
        (10, 8) => arm!(10, 8),
        (10, 10) => arm!(10, 10),
        (10, _) => arm!(10, 12),
        (_, 8) => arm!(12, 8),
        (_, 10) => arm!(12, 10),
        (_, _) => arm!(12, 12),
    }
}
