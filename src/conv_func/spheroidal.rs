// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use marlu::c64;
use ndarray::prelude::*;

use super::{ConvFuncError, ConvFuncKind, ConvFuncTable, ConvolutionFunction};
use crate::math::spheroidal;

/// Gridding with the prolate spheroidal wave function, which best
/// concentrates the kernel's image-domain response within the image (and so
/// suppresses aliasing).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpheroidalFunction {
    support: usize,
    oversample: usize,
}

impl SpheroidalFunction {
    pub fn new(support: usize, oversample: usize) -> Result<SpheroidalFunction, ConvFuncError> {
        if support == 0 {
            return Err(ConvFuncError::ZeroSupport {
                kind: ConvFuncKind::Spheroidal,
            });
        }
        if oversample == 0 {
            return Err(ConvFuncError::ZeroOversample);
        }
        Ok(SpheroidalFunction {
            support,
            oversample,
        })
    }

    /// The 1D kernel value at `offset` pixels from the kernel centre.
    fn kernel_1d(&self, offset: f64) -> f64 {
        let nu = offset.abs() / self.support as f64;
        if nu > 1.0 {
            0.0
        } else {
            (1.0 - nu * nu) * spheroidal(nu)
        }
    }
}

/// The correction for one image axis with `n` pixels; pixel `n / 2` is the
/// centre.
fn correction_1d(n: usize) -> Vec<f64> {
    let half = (n / 2) as f64;
    (0..n)
        .map(|i| {
            if half == 0.0 {
                spheroidal(0.0)
            } else {
                spheroidal((i as f64 - half).abs() / half)
            }
        })
        .collect()
}

impl ConvolutionFunction for SpheroidalFunction {
    fn kind(&self) -> ConvFuncKind {
        ConvFuncKind::Spheroidal
    }

    fn support(&self) -> usize {
        self.support
    }

    fn oversample(&self) -> usize {
        self.oversample
    }

    fn build_table(&self) -> ConvFuncTable {
        let mut table = ConvFuncTable::zeros(self.support, self.oversample, 1);
        let support = self.support as f64;
        let oversample = self.oversample as f64;

        for frac_v in 0..self.oversample {
            let kernel_v: Vec<f64> = (0..table.width())
                .map(|i| self.kernel_1d(i as f64 - support + frac_v as f64 / oversample))
                .collect();
            for frac_u in 0..self.oversample {
                let kernel_u: Vec<f64> = (0..table.width())
                    .map(|i| self.kernel_1d(i as f64 - support + frac_u as f64 / oversample))
                    .collect();
                let index = table.index(frac_u, frac_v, 0);
                let mut kernel = table.kernel_mut(index);
                for (mut kernel_row, kv) in kernel.outer_iter_mut().zip(&kernel_v) {
                    for (k, ku) in kernel_row.iter_mut().zip(&kernel_u) {
                        *k = c64::new(kv * ku, 0.0);
                    }
                }
            }
        }

        table.normalise();
        table
    }

    fn correct_image(&self, mut image: ArrayViewMut2<f64>) {
        let (ny, nx) = image.dim();
        let cx = correction_1d(nx);
        let cy = correction_1d(ny);
        for (mut row, y) in image.outer_iter_mut().zip(cy) {
            for (pixel, x) in row.iter_mut().zip(&cx) {
                let c = x * y;
                *pixel = if c == 0.0 { 0.0 } else { *pixel / c };
            }
        }
    }
}
