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

/// Planar pixel format descriptor, as handed over by the host's format
/// registry. The named constants cover every format the converter accepts;
/// a descriptor outside that set is rejected during planning, not here.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PixelFormat {
    /// Bit depth per component, one of 8, 10, 12 (integer YUV) or 16, 32
    /// (float GBR).
    pub depth: u32,
    pub log2_chroma_w: u32,
    pub log2_chroma_h: u32,
    /// Planar G-B-R family rather than planar Y-U-V.
    pub rgb: bool,
    /// IEEE floating point samples (half for depth 16, single for depth 32).
    pub float: bool,
    pub alpha: bool,
}

/// Storage type of one sample of a format.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum SampleKind {
    U8,
    /// 10/12-bit integer code values, or raw half-float bit patterns.
    U16,
    F32,
}

const fn yuv(depth: u32, log2_chroma_w: u32, log2_chroma_h: u32) -> PixelFormat {
    PixelFormat {
        depth,
        log2_chroma_w,
        log2_chroma_h,
        rgb: false,
        float: false,
        alpha: false,
    }
}

const fn gbr_float(depth: u32, alpha: bool) -> PixelFormat {
    PixelFormat {
        depth,
        log2_chroma_w: 0,
        log2_chroma_h: 0,
        rgb: true,
        float: true,
        alpha,
    }
}

impl PixelFormat {
    pub const YUV420P8: PixelFormat = yuv(8, 1, 1);
    pub const YUV422P8: PixelFormat = yuv(8, 1, 0);
    pub const YUV444P8: PixelFormat = yuv(8, 0, 0);
    pub const YUV420P10: PixelFormat = yuv(10, 1, 1);
    pub const YUV422P10: PixelFormat = yuv(10, 1, 0);
    pub const YUV444P10: PixelFormat = yuv(10, 0, 0);
    pub const YUV420P12: PixelFormat = yuv(12, 1, 1);
    pub const YUV422P12: PixelFormat = yuv(12, 1, 0);
    pub const YUV444P12: PixelFormat = yuv(12, 0, 0);
    pub const GBRPF16: PixelFormat = gbr_float(16, false);
    pub const GBRAPF16: PixelFormat = gbr_float(16, true);
    pub const GBRPF32: PixelFormat = gbr_float(32, false);
    pub const GBRAPF32: PixelFormat = gbr_float(32, true);

    #[inline]
    pub const fn plane_count(&self) -> usize {
        if self.alpha {
            4
        } else {
            3
        }
    }

    #[inline]
    pub(crate) const fn sample_kind(&self) -> SampleKind {
        if self.float {
            if self.depth == 32 {
                SampleKind::F32
            } else {
                SampleKind::U16
            }
        } else if self.depth == 8 {
            SampleKind::U8
        } else {
            SampleKind::U16
        }
    }

    #[inline]
    pub(crate) fn chroma_width(&self, width: usize) -> usize {
        width >> self.log2_chroma_w
    }

    #[inline]
    pub(crate) fn chroma_height(&self, height: usize) -> usize {
        height >> self.log2_chroma_h
    }

    /// Index into the per-subsampling kernel dispatch tables; depth is the
    /// other dispatch axis and is matched on directly.
    #[inline]
    pub(crate) const fn subsampling_index(&self) -> usize {
        (self.log2_chroma_w + self.log2_chroma_h) as usize
    }

    pub(crate) fn check_supported(&self) -> Result<(), ConvertError> {
        if self.float {
            if !self.rgb || !matches!(self.depth, 16 | 32) {
                return Err(ConvertError::InvalidFormat);
            }
        } else {
            if self.rgb || self.alpha {
                return Err(ConvertError::InvalidFormat);
            }
            if !matches!(self.depth, 8 | 10 | 12) {
                return Err(ConvertError::InvalidDepth(self.depth));
            }
        }
        match (self.log2_chroma_w, self.log2_chroma_h) {
            (0, 0) | (1, 0) | (1, 1) => {}
            (cw, ch) => return Err(ConvertError::InvalidSubsampling(cw, ch)),
        }
        if self.float && (self.log2_chroma_w != 0 || self.log2_chroma_h != 0) {
            return Err(ConvertError::InvalidSubsampling(
                self.log2_chroma_w,
                self.log2_chroma_h,
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_set() {
        for format in [
            PixelFormat::YUV420P8,
            PixelFormat::YUV422P8,
            PixelFormat::YUV444P8,
            PixelFormat::YUV420P10,
            PixelFormat::YUV422P10,
            PixelFormat::YUV444P10,
            PixelFormat::YUV420P12,
            PixelFormat::YUV422P12,
            PixelFormat::YUV444P12,
            PixelFormat::GBRPF16,
            PixelFormat::GBRAPF16,
            PixelFormat::GBRPF32,
            PixelFormat::GBRAPF32,
        ] {
            assert!(format.check_supported().is_ok(), "{:?}", format);
        }
    }

    #[test]
    fn test_rejects_unknown_descriptors() {
        let mut fmt = PixelFormat::YUV444P8;
        fmt.depth = 9;
        assert_eq!(
            fmt.check_supported(),
            Err(ConvertError::InvalidDepth(9))
        );
        let mut fmt = PixelFormat::YUV420P8;
        fmt.log2_chroma_w = 0;
        assert_eq!(
            fmt.check_supported(),
            Err(ConvertError::InvalidSubsampling(0, 1))
        );
        let mut fmt = PixelFormat::GBRPF32;
        fmt.depth = 64;
        assert_eq!(fmt.check_supported(), Err(ConvertError::InvalidFormat));
    }

    #[test]
    fn test_dispatch_indices() {
        assert_eq!(PixelFormat::YUV444P8.subsampling_index(), 0);
        assert_eq!(PixelFormat::YUV422P8.subsampling_index(), 1);
        assert_eq!(PixelFormat::YUV420P8.subsampling_index(), 2);
    }
}
