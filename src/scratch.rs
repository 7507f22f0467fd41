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
use crate::convert_error::ConvertError;

/// Error diffusion scratch for one slice: two alternating rows per
/// component. Rows are `width + 4` wide with the working range starting at
/// physical index 1, so the diffusion may read logical index -1 and write
/// logical index width + 1 without bounds juggling.
pub(crate) struct DitherScratch {
    rows: [[Vec<i32>; 2]; 3],
}

impl DitherScratch {
    fn alloc_row(len: usize) -> Result<Vec<i32>, ConvertError> {
        let mut row = Vec::new();
        row.try_reserve_exact(len + 4)
            .map_err(|_| ConvertError::OutOfMemory)?;
        row.resize(len + 4, 0);
        Ok(row)
    }

    pub(crate) fn alloc(luma_width: usize, chroma_width: usize) -> Result<DitherScratch, ConvertError> {
        Ok(DitherScratch {
            rows: [
                [Self::alloc_row(luma_width)?, Self::alloc_row(luma_width)?],
                [Self::alloc_row(chroma_width)?, Self::alloc_row(chroma_width)?],
                [Self::alloc_row(chroma_width)?, Self::alloc_row(chroma_width)?],
            ],
        })
    }

    /// Both rows of one component, current first. Logical index `i` lives at
    /// physical index `i + 1`.
    #[inline]
    pub(crate) fn component(&mut self, n: usize, parity: usize) -> (&mut [i32], &mut [i32]) {
        let [row0, row1] = &mut self.rows[n];
        if parity == 0 {
            (row0, row1)
        } else {
            (row1, row0)
        }
    }

    pub(crate) fn reset(&mut self) {
        for component in self.rows.iter_mut() {
            for row in component.iter_mut() {
                row.fill(0);
            }
        }
    }
}

fn alloc_plane<T: Copy + Default>(len: usize) -> Result<Vec<T>, ConvertError> {
    let mut plane = Vec::new();
    plane
        .try_reserve_exact(len)
        .map_err(|_| ConvertError::OutOfMemory)?;
    plane.resize(len, T::default());
    Ok(plane)
}

/// Owns the linear RGB intermediate planes. The stride is the frame width in
/// intermediate samples rounded up so a row occupies a multiple of 32 bytes;
/// buffers are rebuilt lazily whenever `stride * height` changes, separately
/// per sample width since a converter instance can alternate between the
/// integer and float pipelines.
#[derive(Default)]
pub(crate) struct ScratchManager {
    i16_sz: usize,
    rgb_i16: [Vec<i16>; 3],
    u16_sz: usize,
    rgb_u16: [Vec<u16>; 3],
    f32_sz: usize,
    rgb_f32: [Vec<f32>; 3],
}

#[inline]
fn aligned_stride(width: usize, pixel_bytes: usize) -> usize {
    let row_bytes = (width * pixel_bytes + 31) & !31;
    row_bytes / pixel_bytes
}

impl ScratchManager {
    pub(crate) fn new() -> ScratchManager {
        ScratchManager::default()
    }

    pub(crate) fn ensure_i16(
        &mut self,
        width: usize,
        height: usize,
    ) -> Result<(usize, [&mut [i16]; 3]), ConvertError> {
        let stride = aligned_stride(width, 2);
        let sz = stride * height;
        if sz != self.i16_sz {
            for plane in self.rgb_i16.iter_mut() {
                *plane = alloc_plane(sz)?;
            }
            self.i16_sz = sz;
        }
        let [r, g, b] = &mut self.rgb_i16;
        Ok((stride, [r.as_mut_slice(), g.as_mut_slice(), b.as_mut_slice()]))
    }

    pub(crate) fn ensure_u16(
        &mut self,
        width: usize,
        height: usize,
    ) -> Result<(usize, [&mut [u16]; 3]), ConvertError> {
        let stride = aligned_stride(width, 2);
        let sz = stride * height;
        if sz != self.u16_sz {
            for plane in self.rgb_u16.iter_mut() {
                *plane = alloc_plane(sz)?;
            }
            self.u16_sz = sz;
        }
        let [r, g, b] = &mut self.rgb_u16;
        Ok((stride, [r.as_mut_slice(), g.as_mut_slice(), b.as_mut_slice()]))
    }

    pub(crate) fn ensure_f32(
        &mut self,
        width: usize,
        height: usize,
    ) -> Result<(usize, [&mut [f32]; 3]), ConvertError> {
        let stride = aligned_stride(width, 4);
        let sz = stride * height;
        if sz != self.f32_sz {
            for plane in self.rgb_f32.iter_mut() {
                *plane = alloc_plane(sz)?;
            }
            self.f32_sz = sz;
        }
        let [r, g, b] = &mut self.rgb_f32;
        Ok((stride, [r.as_mut_slice(), g.as_mut_slice(), b.as_mut_slice()]))
    }
}
