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
use crate::transfer::{Delinearizer, TransferCharacteristics};
use half::f16;

/// Entries per direction of the integer LUT pair.
pub(crate) const LUT_SIZE: usize = 32768;
/// Index bias: entry `n` represents the value `(n - LUT_BIAS) / RGB_ONE`.
pub(crate) const LUT_BIAS: i32 = 2048;
/// Fixed-point value of 1.0 in the int16 linear RGB intermediate.
pub(crate) const RGB_ONE: i32 = 28672;

#[inline]
fn clip_int16(v: i64) -> i16 {
    v.clamp(i16::MIN as i64, i16::MAX as i64) as i16
}

/// Linearisation/delinearisation LUT pair for the fixed-point pipeline,
/// indexed by biased int16 RGB values. Both directions live in one
/// allocation, linearise first.
///
/// Stored entries are clipped into int16, so extreme wide-gamut excursions
/// saturate rather than wrap; whether any analytic transfer actually reaches
/// the clip inside the representable index range is untested upstream.
pub(crate) struct GammaLut {
    data: Vec<i16>,
}

impl GammaLut {
    pub(crate) fn build(
        in_txchr: &TransferCharacteristics,
        delinearizer: Delinearizer,
    ) -> Result<GammaLut, ConvertError> {
        let mut data = Vec::new();
        data.try_reserve_exact(LUT_SIZE * 2)
            .map_err(|_| ConvertError::OutOfMemory)?;
        for n in 0..LUT_SIZE {
            let v = (n as f64 - LUT_BIAS as f64) / RGB_ONE as f64;
            let l = in_txchr.linearize(v);
            data.push(clip_int16((l * RGB_ONE as f64).round() as i64));
        }
        for n in 0..LUT_SIZE {
            let v = (n as f64 - LUT_BIAS as f64) / RGB_ONE as f64;
            let d = delinearizer.apply(v);
            data.push(clip_int16((d * RGB_ONE as f64).round() as i64));
        }
        Ok(GammaLut { data })
    }

    #[inline]
    pub(crate) fn lin(&self) -> &[i16] {
        &self.data[..LUT_SIZE]
    }

    #[inline]
    pub(crate) fn delin(&self) -> &[i16] {
        &self.data[LUT_SIZE..]
    }
}

/// LUT pair for the half-float pipeline, indexed by the raw half-float bit
/// pattern of the sample; entries are half-float bit patterns as well.
pub(crate) struct GammaLutF16 {
    data: Vec<u16>,
}

pub(crate) const LUT_F16_SIZE: usize = 65536;

impl GammaLutF16 {
    pub(crate) fn build(
        in_txchr: &TransferCharacteristics,
        delinearizer: Delinearizer,
    ) -> Result<GammaLutF16, ConvertError> {
        let mut data = Vec::new();
        data.try_reserve_exact(LUT_F16_SIZE * 2)
            .map_err(|_| ConvertError::OutOfMemory)?;
        for n in 0..LUT_F16_SIZE {
            let v = f16::from_bits(n as u16).to_f64();
            let l = in_txchr.linearize(v);
            data.push(f16::from_f32(l as f32).to_bits());
        }
        for n in 0..LUT_F16_SIZE {
            let v = f16::from_bits(n as u16).to_f64();
            let d = delinearizer.apply(v);
            data.push(f16::from_f32(d as f32).to_bits());
        }
        Ok(GammaLutF16 { data })
    }

    #[inline]
    pub(crate) fn lin(&self) -> &[u16] {
        &self.data[..LUT_F16_SIZE]
    }

    #[inline]
    pub(crate) fn delin(&self) -> &[u16] {
        &self.data[LUT_F16_SIZE..]
    }
}
