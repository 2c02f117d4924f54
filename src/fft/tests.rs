// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;

use super::*;

#[test]
fn test_centre_delta_transforms_to_constant() {
    let mut planner = FftPlanner::new();
    let mut data = Array2::<c64>::zeros((8, 6));
    data[(4, 3)] = c64::new(1.0, 0.0);
    fft2d(&mut planner, data.view_mut(), true);
    for d in data.iter() {
        assert_abs_diff_eq!(d.re, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(d.im, 0.0, epsilon = 1e-12);
    }

    // The inverse transform is normalised.
    fft2d(&mut planner, data.view_mut(), false);
    for ((y, x), d) in data.indexed_iter() {
        let expected = if (y, x) == (4, 3) { 1.0 } else { 0.0 };
        assert_abs_diff_eq!(d.re, expected, epsilon = 1e-12);
        assert_abs_diff_eq!(d.im, 0.0, epsilon = 1e-12);
    }
}

#[test]
fn test_constant_transforms_to_centre_delta() {
    let mut planner = FftPlanner::new();
    let mut data = Array2::from_elem((4, 4), c64::new(1.0, 0.0));
    fft2d(&mut planner, data.view_mut(), false);
    for ((y, x), d) in data.indexed_iter() {
        let expected = if (y, x) == (2, 2) { 1.0 } else { 0.0 };
        assert_abs_diff_eq!(d.re, expected, epsilon = 1e-12);
        assert_abs_diff_eq!(d.im, 0.0, epsilon = 1e-12);
    }
}

#[test]
fn test_offset_delta_gives_phase_gradient() {
    let mut planner = FftPlanner::new();
    // A delta one pixel right of centre gives exp(-2 pi i k / n) along x.
    let n = 8;
    let mut data = Array2::<c64>::zeros((n, n));
    data[(n / 2, n / 2 + 1)] = c64::new(1.0, 0.0);
    fft2d(&mut planner, data.view_mut(), true);
    for ((_, x), d) in data.indexed_iter() {
        let k = x as f64 - (n / 2) as f64;
        let phase = -std::f64::consts::TAU * k / n as f64;
        assert_abs_diff_eq!(d.re, phase.cos(), epsilon = 1e-12);
        assert_abs_diff_eq!(d.im, phase.sin(), epsilon = 1e-12);
    }
}

#[test]
fn test_round_trip() {
    let mut planner = FftPlanner::new();
    let mut data = Array2::from_shape_fn((6, 10), |(y, x)| {
        c64::new((y * 10 + x) as f64, (x as f64 - y as f64) * 0.5)
    });
    let original = data.clone();
    fft2d(&mut planner, data.view_mut(), true);
    fft2d(&mut planner, data.view_mut(), false);
    for (d, o) in data.iter().zip(original.iter()) {
        assert_abs_diff_eq!(d.re, o.re, epsilon = 1e-10);
        assert_abs_diff_eq!(d.im, o.im, epsilon = 1e-10);
    }
}

#[test]
fn test_shared_planner_matches_fresh_planners() {
    let mut shared = FftPlanner::new();
    for (ny, nx) in [(8, 6), (5, 5), (8, 6), (1, 4)] {
        let data = Array2::from_shape_fn((ny, nx), |(y, x)| {
            c64::new((y * nx + x) as f64, 0.5 * y as f64 - x as f64)
        });
        for forward in [true, false] {
            let mut a = data.clone();
            fft2d(&mut shared, a.view_mut(), forward);
            let mut b = data.clone();
            fft2d(&mut FftPlanner::new(), b.view_mut(), forward);
            assert_abs_diff_eq!(a, b, epsilon = 1e-12);
        }
    }
}
