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
use crate::colorimetry::ColorMetadata;
use crate::convert_error::{ConvertError, MismatchedSize};
use crate::pixel_format::{PixelFormat, SampleKind};

/// One plane of image data. A conversion may mix sample types between its
/// sides (8-bit input to 12-bit output), so planes are typed individually
/// rather than the whole frame being generic over one sample type.
///
/// Half-float planes are carried as raw `u16` bit patterns.
#[derive(Debug, Clone, Copy)]
pub enum PlaneRef<'a> {
    None,
    U8(&'a [u8]),
    U16(&'a [u16]),
    F32(&'a [f32]),
}

#[derive(Debug)]
pub enum PlaneRefMut<'a> {
    None,
    U8(&'a mut [u8]),
    U16(&'a mut [u16]),
    F32(&'a mut [f32]),
}

impl<'a> PlaneRef<'a> {
    #[inline]
    pub(crate) fn as_u8(&self) -> Result<&'a [u8], ConvertError> {
        match *self {
            PlaneRef::U8(data) => Ok(data),
            _ => Err(ConvertError::InvalidFormat),
        }
    }

    #[inline]
    pub(crate) fn as_u16(&self) -> Result<&'a [u16], ConvertError> {
        match *self {
            PlaneRef::U16(data) => Ok(data),
            _ => Err(ConvertError::InvalidFormat),
        }
    }

    #[inline]
    pub(crate) fn as_f32(&self) -> Result<&'a [f32], ConvertError> {
        match *self {
            PlaneRef::F32(data) => Ok(data),
            _ => Err(ConvertError::InvalidFormat),
        }
    }

    fn len(&self) -> usize {
        match self {
            PlaneRef::None => 0,
            PlaneRef::U8(data) => data.len(),
            PlaneRef::U16(data) => data.len(),
            PlaneRef::F32(data) => data.len(),
        }
    }

    fn kind(&self) -> Option<SampleKind> {
        match self {
            PlaneRef::None => None,
            PlaneRef::U8(_) => Some(SampleKind::U8),
            PlaneRef::U16(_) => Some(SampleKind::U16),
            PlaneRef::F32(_) => Some(SampleKind::F32),
        }
    }
}

impl<'a> PlaneRefMut<'a> {
    #[inline]
    pub(crate) fn as_u8_mut(&mut self) -> Result<&mut [u8], ConvertError> {
        match self {
            PlaneRefMut::U8(data) => Ok(data),
            _ => Err(ConvertError::InvalidFormat),
        }
    }

    #[inline]
    pub(crate) fn as_u16_mut(&mut self) -> Result<&mut [u16], ConvertError> {
        match self {
            PlaneRefMut::U16(data) => Ok(data),
            _ => Err(ConvertError::InvalidFormat),
        }
    }

    #[inline]
    pub(crate) fn as_f32_mut(&mut self) -> Result<&mut [f32], ConvertError> {
        match self {
            PlaneRefMut::F32(data) => Ok(data),
            _ => Err(ConvertError::InvalidFormat),
        }
    }

    fn len(&self) -> usize {
        match self {
            PlaneRefMut::None => 0,
            PlaneRefMut::U8(data) => data.len(),
            PlaneRefMut::U16(data) => data.len(),
            PlaneRefMut::F32(data) => data.len(),
        }
    }

    fn kind(&self) -> Option<SampleKind> {
        match self {
            PlaneRefMut::None => None,
            PlaneRefMut::U8(_) => Some(SampleKind::U8),
            PlaneRefMut::U16(_) => Some(SampleKind::U16),
            PlaneRefMut::F32(_) => Some(SampleKind::F32),
        }
    }
}

/// Sample types the integer YUV pipeline is generic over; resolves the
/// typed slice behind a [`PlaneRef`].
pub(crate) trait YuvSample:
    Copy + Send + Sync + 'static + num_traits::AsPrimitive<i32>
{
    fn plane<'a>(plane: &PlaneRef<'a>) -> Result<&'a [Self], ConvertError>;
    fn plane_mut<'a>(plane: &'a mut PlaneRefMut<'_>) -> Result<&'a mut [Self], ConvertError>;
}

impl YuvSample for u8 {
    #[inline]
    fn plane<'a>(plane: &PlaneRef<'a>) -> Result<&'a [u8], ConvertError> {
        plane.as_u8()
    }

    #[inline]
    fn plane_mut<'a>(plane: &'a mut PlaneRefMut<'_>) -> Result<&'a mut [u8], ConvertError> {
        plane.as_u8_mut()
    }
}

impl YuvSample for u16 {
    #[inline]
    fn plane<'a>(plane: &PlaneRef<'a>) -> Result<&'a [u16], ConvertError> {
        plane.as_u16()
    }

    #[inline]
    fn plane_mut<'a>(plane: &'a mut PlaneRefMut<'_>) -> Result<&'a mut [u16], ConvertError> {
        plane.as_u16_mut()
    }
}

/// Non-mutable planar video frame. Planes are Y, U, V (+ optional alpha)
/// for the YUV family and G, B, R (+ optional alpha) for the float RGB
/// family. Stride here always means elements per row.
#[derive(Debug)]
pub struct VideoFrame<'a> {
    pub format: PixelFormat,
    pub planes: [PlaneRef<'a>; 4],
    pub strides: [usize; 4],
    pub width: u32,
    pub height: u32,
    pub color: ColorMetadata,
}

/// Mutable planar video frame. The converter writes the resolved output
/// colorimetry back into `color`.
#[derive(Debug)]
pub struct VideoFrameMut<'a> {
    pub format: PixelFormat,
    pub planes: [PlaneRefMut<'a>; 4],
    pub strides: [usize; 4],
    pub width: u32,
    pub height: u32,
    pub color: ColorMetadata,
}

fn plane_rows(format: &PixelFormat, plane: usize, height: usize) -> usize {
    if !format.rgb && (plane == 1 || plane == 2) {
        format.chroma_height(height)
    } else {
        height
    }
}

fn plane_width(format: &PixelFormat, plane: usize, width: usize) -> usize {
    if !format.rgb && (plane == 1 || plane == 2) {
        format.chroma_width(width)
    } else {
        width
    }
}

fn check_frame_planes(
    format: &PixelFormat,
    kinds: [Option<SampleKind>; 4],
    lens: [usize; 4],
    strides: &[usize; 4],
    width: u32,
    height: u32,
) -> Result<(), ConvertError> {
    if width == 0 || height == 0 {
        return Err(ConvertError::ZeroBaseSize);
    }
    let expected = format.sample_kind();
    for plane in 0..format.plane_count() {
        match kinds[plane] {
            Some(kind) if kind == expected => {}
            _ => return Err(ConvertError::InvalidFormat),
        }
        let rows = plane_rows(format, plane, height as usize);
        let row_width = plane_width(format, plane, width as usize);
        let stride = strides[plane];
        if stride < row_width {
            return Err(ConvertError::PlaneSizeMismatch(MismatchedSize {
                expected: row_width,
                received: stride,
            }));
        }
        let required = stride * (rows - 1) + row_width;
        if lens[plane] < required {
            return Err(ConvertError::PlaneSizeMismatch(MismatchedSize {
                expected: required,
                received: lens[plane],
            }));
        }
    }
    Ok(())
}

impl VideoFrame<'_> {
    pub fn check_constraints(&self) -> Result<(), ConvertError> {
        let kinds = [
            self.planes[0].kind(),
            self.planes[1].kind(),
            self.planes[2].kind(),
            self.planes[3].kind(),
        ];
        let lens = [
            self.planes[0].len(),
            self.planes[1].len(),
            self.planes[2].len(),
            self.planes[3].len(),
        ];
        check_frame_planes(
            &self.format,
            kinds,
            lens,
            &self.strides,
            self.width,
            self.height,
        )
    }
}

impl VideoFrameMut<'_> {
    pub fn check_constraints(&self) -> Result<(), ConvertError> {
        let kinds = [
            self.planes[0].kind(),
            self.planes[1].kind(),
            self.planes[2].kind(),
            self.planes[3].kind(),
        ];
        let lens = [
            self.planes[0].len(),
            self.planes[1].len(),
            self.planes[2].len(),
            self.planes[3].len(),
        ];
        check_frame_planes(
            &self.format,
            kinds,
            lens,
            &self.strides,
            self.width,
            self.height,
        )
    }
}
