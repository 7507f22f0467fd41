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
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq)]
pub struct MismatchedSize {
    pub expected: usize,
    pub received: usize,
}

/// Errors surfaced by frame planning. Kernels never fail; everything here is
/// reported before any slice work is dispatched.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConvertError {
    InvalidFormat,
    InvalidDepth(u32),
    InvalidSubsampling(u32, u32),
    FamilyMismatch,
    UnknownPrimaries,
    UnknownTransfer,
    UnknownMatrix,
    InvalidRange,
    OddDimensions(u32, u32),
    OutOfMemory,
    ZeroBaseSize,
    PlaneSizeMismatch(MismatchedSize),
    ImageDimensionsNotMatch,
}

impl Display for ConvertError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConvertError::InvalidFormat => f.write_str("Unsupported pixel format"),
            ConvertError::InvalidDepth(depth) => {
                f.write_fmt(format_args!("Unsupported bit depth {}", depth))
            }
            ConvertError::InvalidSubsampling(cw, ch) => f.write_fmt(format_args!(
                "Unsupported chroma subsampling (log2 {}x{})",
                cw, ch
            )),
            ConvertError::FamilyMismatch => {
                f.write_str("Conversion between YUV and RGB pixel families is not supported")
            }
            ConvertError::UnknownPrimaries => f.write_str("Color primaries not set or unsupported"),
            ConvertError::UnknownTransfer => {
                f.write_str("Transfer characteristics not set or unsupported")
            }
            ConvertError::UnknownMatrix => {
                f.write_str("Matrix coefficients not set or unsupported")
            }
            ConvertError::InvalidRange => f.write_str("Unsupported color range"),
            ConvertError::OddDimensions(w, h) => {
                f.write_fmt(format_args!("Invalid odd size ({}x{})", w, h))
            }
            ConvertError::OutOfMemory => f.write_str("Scratch buffer allocation failed"),
            ConvertError::ZeroBaseSize => f.write_str("Zero sized images is not supported"),
            ConvertError::PlaneSizeMismatch(size) => f.write_fmt(format_args!(
                "Plane has invalid size, it must be at least {}, but it was {}",
                size.expected, size.received
            )),
            ConvertError::ImageDimensionsNotMatch => {
                f.write_str("Input and output images must match in dimensions")
            }
        }
    }
}

impl Error for ConvertError {}
