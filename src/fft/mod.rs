// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Two-dimensional complex FFTs on centred arrays.
//!
//! The origin of both the image and the grid is at pixel `n / 2` on each axis,
//! so the data are shifted before and after each 1D transform. The forward
//! transform is unnormalised; the inverse transform is scaled by `1 / (nx *
//! ny)`. Plans are cached by the [`FftPlanner`] passed in, so callers
//! transforming many planes should share one planner.

#[cfg(test)]
mod tests;

use marlu::c64;
use ndarray::prelude::*;
use rustfft::{FftDirection, FftPlanner};

/// Transform `data` in place. The forward transform uses a negative exponent.
pub(crate) fn fft2d(
    planner: &mut FftPlanner<f64>,
    mut data: ArrayViewMut2<c64>,
    forward: bool,
) {
    let direction = if forward {
        FftDirection::Forward
    } else {
        FftDirection::Inverse
    };

    for axis in [Axis(1), Axis(0)] {
        let n = data.len_of(axis);
        if n < 2 {
            continue;
        }
        let fft = planner.plan_fft(n, direction);
        let mut buffer = vec![c64::default(); n];
        let mut scratch = vec![c64::default(); fft.get_inplace_scratch_len()];
        for mut lane in data.lanes_mut(axis) {
            buffer.iter_mut().zip(lane.iter()).for_each(|(b, l)| *b = *l);
            buffer.rotate_left(n / 2);
            fft.process_with_scratch(&mut buffer, &mut scratch);
            buffer.rotate_right(n / 2);
            lane.iter_mut().zip(buffer.iter()).for_each(|(l, b)| *l = *b);
        }
    }

    if !forward {
        let norm = data.len() as f64;
        data.mapv_inplace(|d| d / norm);
    }
}
