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
use crate::TransferCharacteristic;

/// Caller supplied delinearisation for transfers without an analytic
/// alpha/beta/gamma/delta form (PQ, HLG, the log families).
pub type TrcFunction = fn(f64) -> f64;

/// Piecewise "toe plus power" opto-electronic transfer, parameterised by
/// four constants. Both directions are symmetric around zero so xvYCC-style
/// signed excursions survive the trip.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TransferCharacteristics {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
    pub delta: f64,
}

// Gamma 2.2/2.8 likely have a linear toe slope in the physical standard;
// no authoritative table documents its constants, so they stay pure power
// laws here, matching what everyone else ships.
pub(crate) fn transfer_characteristics(
    trc: TransferCharacteristic,
) -> Option<TransferCharacteristics> {
    match trc {
        TransferCharacteristic::Bt709
        | TransferCharacteristic::Smpte170M
        | TransferCharacteristic::Xvycc
        | TransferCharacteristic::Bt2020_10 => Some(TransferCharacteristics {
            alpha: 1.099,
            beta: 0.018,
            gamma: 0.45,
            delta: 4.5,
        }),
        TransferCharacteristic::Gamma22 => Some(TransferCharacteristics {
            alpha: 1.0,
            beta: 0.0,
            gamma: 1.0 / 2.2,
            delta: 0.0,
        }),
        TransferCharacteristic::Gamma28 => Some(TransferCharacteristics {
            alpha: 1.0,
            beta: 0.0,
            gamma: 1.0 / 2.8,
            delta: 0.0,
        }),
        TransferCharacteristic::Smpte240M => Some(TransferCharacteristics {
            alpha: 1.1115,
            beta: 0.0228,
            gamma: 0.45,
            delta: 4.0,
        }),
        TransferCharacteristic::Linear => Some(TransferCharacteristics {
            alpha: 1.0,
            beta: 0.0,
            gamma: 1.0,
            delta: 0.0,
        }),
        TransferCharacteristic::Srgb => Some(TransferCharacteristics {
            alpha: 1.055,
            beta: 0.0031308,
            gamma: 1.0 / 2.4,
            delta: 12.92,
        }),
        TransferCharacteristic::Bt2020_12 => Some(TransferCharacteristics {
            alpha: 1.0993,
            beta: 0.0181,
            gamma: 0.45,
            delta: 4.5,
        }),
        TransferCharacteristic::Unspecified
        | TransferCharacteristic::Smpte2084
        | TransferCharacteristic::Smpte428
        | TransferCharacteristic::Log
        | TransferCharacteristic::LogSqrt
        | TransferCharacteristic::Bt1361 => None,
    }
}

impl TransferCharacteristics {
    /// Linear light to non-linear signal.
    #[inline]
    pub fn delinearize(&self, v: f64) -> f64 {
        if v <= -self.beta {
            -self.alpha * (-v).powf(self.gamma) + (self.alpha - 1.0)
        } else if v < self.beta {
            self.delta * v
        } else {
            self.alpha * v.powf(self.gamma) - (self.alpha - 1.0)
        }
    }

    /// Non-linear signal to linear light, the algebraic inverse of
    /// [`delinearize`](Self::delinearize).
    #[inline]
    pub fn linearize(&self, v: f64) -> f64 {
        let ialpha = 1.0 / self.alpha;
        let igamma = 1.0 / self.gamma;
        if v <= -self.beta * self.delta {
            -((1.0 - self.alpha - v) * ialpha).powf(igamma)
        } else if v < self.beta * self.delta {
            v / self.delta
        } else {
            ((v + self.alpha - 1.0) * ialpha).powf(igamma)
        }
    }
}

/// Output side delinearisation: either the analytic form or a caller
/// supplied curve.
#[derive(Copy, Clone)]
pub(crate) enum Delinearizer {
    Analytic(TransferCharacteristics),
    Function(TrcFunction),
}

impl Delinearizer {
    #[inline]
    pub(crate) fn apply(&self, v: f64) -> f64 {
        match self {
            Delinearizer::Analytic(coeffs) => coeffs.delinearize(v),
            Delinearizer::Function(f) => f(v),
        }
    }
}
