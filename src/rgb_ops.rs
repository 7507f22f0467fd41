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
use crate::gamma_lut::LUT_BIAS;
use crate::transfer::{Delinearizer, TransferCharacteristics};
use half::f16;

/// 14 fractional bits for the primary-mapping matrix.
pub(crate) const MATRIX_PRECISION: i32 = 14;

/// Runs the int16 tone LUT over the three RGB planes in place. The index is
/// the biased sample clamped into [0, 32768), which keeps out-of-range
/// excursions saturating instead of wrapping.
pub(crate) fn apply_lut(rgb: &mut [&mut [i16]; 3], stride: usize, w: usize, h: usize, lut: &[i16]) {
    for plane in rgb.iter_mut() {
        for row in plane.chunks_mut(stride).take(h) {
            for data in row[..w].iter_mut() {
                let idx = (LUT_BIAS + *data as i32).clamp(0, 32767);
                *data = lut[idx as usize];
            }
        }
    }
}

/// In-place 3x3 primary mapping on int16 linear RGB, 14-bit fractional
/// coefficients with round-to-nearest.
pub(crate) fn multiply3x3(
    rgb: &mut [&mut [i16]; 3],
    stride: usize,
    w: usize,
    h: usize,
    m: &[[[i16; 8]; 3]; 3],
) {
    const RND: i32 = 1 << (MATRIX_PRECISION - 1);
    let m00 = m[0][0][0] as i32;
    let m01 = m[0][1][0] as i32;
    let m02 = m[0][2][0] as i32;
    let m10 = m[1][0][0] as i32;
    let m11 = m[1][1][0] as i32;
    let m12 = m[1][2][0] as i32;
    let m20 = m[2][0][0] as i32;
    let m21 = m[2][1][0] as i32;
    let m22 = m[2][2][0] as i32;
    let [rgb0, rgb1, rgb2] = rgb;
    for (row0, (row1, row2)) in rgb0
        .chunks_mut(stride)
        .zip(rgb1.chunks_mut(stride).zip(rgb2.chunks_mut(stride)))
        .take(h)
    {
        for ((r, g), b) in row0[..w]
            .iter_mut()
            .zip(row1[..w].iter_mut())
            .zip(row2[..w].iter_mut())
        {
            let v0 = *r as i32;
            let v1 = *g as i32;
            let v2 = *b as i32;
            *r = clip_int16((m00 * v0 + m01 * v1 + m02 * v2 + RND) >> MATRIX_PRECISION);
            *g = clip_int16((m10 * v0 + m11 * v1 + m12 * v2 + RND) >> MATRIX_PRECISION);
            *b = clip_int16((m20 * v0 + m21 * v1 + m22 * v2 + RND) >> MATRIX_PRECISION);
        }
    }
}

#[inline]
pub(crate) fn clip_int16(v: i32) -> i16 {
    v.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

/// Half-float tone LUT: every sample is an index into a 65536-entry table of
/// half bit patterns, so no conversion happens per pixel.
pub(crate) fn apply_lut_f16(
    dst: [&mut [u16]; 3],
    dst_strides: [usize; 3],
    src: [&[u16]; 3],
    src_strides: [usize; 3],
    w: usize,
    h: usize,
    lut: &[u16],
) {
    for ((dst_plane, dst_stride), (src_plane, src_stride)) in dst
        .into_iter()
        .zip(dst_strides)
        .zip(src.into_iter().zip(src_strides))
    {
        for (dst_row, src_row) in dst_plane
            .chunks_mut(dst_stride)
            .zip(src_plane.chunks(src_stride))
            .take(h)
        {
            for (dst, src) in dst_row[..w].iter_mut().zip(src_row[..w].iter()) {
                *dst = lut[*src as usize];
            }
        }
    }
}

/// In-place primary mapping on half-float planes; samples round-trip through
/// f32 per element.
pub(crate) fn multiply3x3_f16(
    rgb: &mut [&mut [u16]; 3],
    stride: usize,
    w: usize,
    h: usize,
    m: &[[[f32; 8]; 3]; 3],
) {
    let [rgb0, rgb1, rgb2] = rgb;
    for (row0, (row1, row2)) in rgb0
        .chunks_mut(stride)
        .zip(rgb1.chunks_mut(stride).zip(rgb2.chunks_mut(stride)))
        .take(h)
    {
        for ((r, g), b) in row0[..w]
            .iter_mut()
            .zip(row1[..w].iter_mut())
            .zip(row2[..w].iter_mut())
        {
            let v0 = f16::from_bits(*r).to_f32();
            let v1 = f16::from_bits(*g).to_f32();
            let v2 = f16::from_bits(*b).to_f32();
            *r = f16::from_f32(m[0][0][0] * v0 + m[0][1][0] * v1 + m[0][2][0] * v2).to_bits();
            *g = f16::from_f32(m[1][0][0] * v0 + m[1][1][0] * v1 + m[1][2][0] * v2).to_bits();
            *b = f16::from_f32(m[2][0][0] * v0 + m[2][1][0] * v1 + m[2][2][0] * v2).to_bits();
        }
    }
}

pub(crate) fn multiply3x3_f32(
    rgb: &mut [&mut [f32]; 3],
    stride: usize,
    w: usize,
    h: usize,
    m: &[[[f32; 8]; 3]; 3],
) {
    let [rgb0, rgb1, rgb2] = rgb;
    for (row0, (row1, row2)) in rgb0
        .chunks_mut(stride)
        .zip(rgb1.chunks_mut(stride).zip(rgb2.chunks_mut(stride)))
        .take(h)
    {
        for ((r, g), b) in row0[..w]
            .iter_mut()
            .zip(row1[..w].iter_mut())
            .zip(row2[..w].iter_mut())
        {
            let v0 = *r;
            let v1 = *g;
            let v2 = *b;
            *r = m[0][0][0] * v0 + m[0][1][0] * v1 + m[0][2][0] * v2;
            *g = m[1][0][0] * v0 + m[1][1][0] * v1 + m[1][2][0] * v2;
            *b = m[2][0][0] * v0 + m[2][1][0] * v1 + m[2][2][0] * v2;
        }
    }
}

/// Closed-form linearisation for the single-float pipeline; no LUT pays off
/// at 32-bit sample granularity.
pub(crate) fn apply_linearize_f32(
    dst: [&mut [f32]; 3],
    dst_strides: [usize; 3],
    src: [&[f32]; 3],
    src_strides: [usize; 3],
    w: usize,
    h: usize,
    txchr: &TransferCharacteristics,
) {
    let alpha = txchr.alpha as f32;
    let beta = txchr.beta as f32;
    let delta = txchr.delta as f32;
    let ialpha = (1.0 / txchr.alpha) as f32;
    let igamma = (1.0 / txchr.gamma) as f32;
    let idelta = (1.0 / txchr.delta) as f32;
    for ((dst_plane, dst_stride), (src_plane, src_stride)) in dst
        .into_iter()
        .zip(dst_strides)
        .zip(src.into_iter().zip(src_strides))
    {
        for (dst_row, src_row) in dst_plane
            .chunks_mut(dst_stride)
            .zip(src_plane.chunks(src_stride))
            .take(h)
        {
            for (dst, src) in dst_row[..w].iter_mut().zip(src_row[..w].iter()) {
                let v = *src;
                *dst = if v <= -beta * delta {
                    -((1.0 - alpha - v) * ialpha).powf(igamma)
                } else if v < beta * delta {
                    v * idelta
                } else {
                    ((v + alpha - 1.0) * ialpha).powf(igamma)
                };
            }
        }
    }
}

pub(crate) fn apply_delinearize_f32(
    dst: [&mut [f32]; 3],
    dst_strides: [usize; 3],
    src: [&[f32]; 3],
    src_strides: [usize; 3],
    w: usize,
    h: usize,
    delinearizer: Delinearizer,
) {
    for ((dst_plane, dst_stride), (src_plane, src_stride)) in dst
        .into_iter()
        .zip(dst_strides)
        .zip(src.into_iter().zip(src_strides))
    {
        for (dst_row, src_row) in dst_plane
            .chunks_mut(dst_stride)
            .zip(src_plane.chunks(src_stride))
            .take(h)
        {
            match delinearizer {
                Delinearizer::Analytic(txchr) => {
                    let alpha = txchr.alpha as f32;
                    let beta = txchr.beta as f32;
                    let gamma = txchr.gamma as f32;
                    let delta = txchr.delta as f32;
                    for (dst, src) in dst_row[..w].iter_mut().zip(src_row[..w].iter()) {
                        let v = *src;
                        *dst = if v <= -beta {
                            -alpha * (-v).powf(gamma) + (alpha - 1.0)
                        } else if v < beta {
                            delta * v
                        } else {
                            alpha * v.powf(gamma) - (alpha - 1.0)
                        };
                    }
                }
                Delinearizer::Function(f) => {
                    for (dst, src) in dst_row[..w].iter_mut().zip(src_row[..w].iter()) {
                        *dst = f(*src as f64) as f32;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gamma_lut::RGB_ONE;

    #[test]
    fn test_multiply3x3_identity() {
        let mut m = [[[0i16; 8]; 3]; 3];
        for (n, row) in m.iter_mut().enumerate() {
            row[n] = [(1i32 << MATRIX_PRECISION) as i16; 8];
        }
        let mut r = vec![100i16, -50, RGB_ONE as i16, 4];
        let mut g = vec![0i16, 1, 2, 3];
        let mut b = vec![9i16, 8, 7, 6];
        let snapshot = (r.clone(), g.clone(), b.clone());
        multiply3x3(&mut [&mut r, &mut g, &mut b], 4, 4, 1, &m);
        assert_eq!(r, snapshot.0);
        assert_eq!(g, snapshot.1);
        assert_eq!(b, snapshot.2);
    }

    #[test]
    fn test_apply_lut_saturating_index() {
        let mut lut = vec![0i16; 32768];
        lut[0] = -7;
        lut[32767] = 7;
        let mut r = vec![i16::MIN, i16::MAX];
        let mut g = vec![i16::MIN, i16::MAX];
        let mut b = vec![i16::MIN, i16::MAX];
        apply_lut(&mut [&mut r, &mut g, &mut b], 2, 2, 1, &lut);
        assert_eq!(r, vec![-7, 7]);
    }

    #[test]
    fn test_multiply3x3_f32_swaps_channels() {
        let mut m = [[[0f32; 8]; 3]; 3];
        m[0][2][0] = 1.0;
        m[1][1][0] = 1.0;
        m[2][0][0] = 1.0;
        let mut r = vec![1.0f32];
        let mut g = vec![2.0f32];
        let mut b = vec![3.0f32];
        multiply3x3_f32(&mut [&mut r, &mut g, &mut b], 1, 1, 1, &m);
        assert_eq!((r[0], g[0], b[0]), (3.0, 2.0, 1.0));
    }
}
