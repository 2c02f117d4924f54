// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use marlu::c64;
use ndarray::prelude::*;

use super::{ConvFuncKind, ConvFuncTable, ConvolutionFunction};

/// Nearest-neighbour gridding. Each visibility lands entirely in a single
/// pixel, so no image-domain correction is needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoxFunction;

impl ConvolutionFunction for BoxFunction {
    fn kind(&self) -> ConvFuncKind {
        ConvFuncKind::Box
    }

    fn support(&self) -> usize {
        0
    }

    fn oversample(&self) -> usize {
        1
    }

    fn build_table(&self) -> ConvFuncTable {
        let mut table = ConvFuncTable::zeros(0, 1, 1);
        table.kernel_mut(0)[(0, 0)] = c64::new(1.0, 0.0);
        table
    }

    fn correct_image(&self, _image: ArrayViewMut2<f64>) {}
}
