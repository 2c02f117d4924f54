// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The per-visibility parts of gridding and degridding: working out where
//! each visibility lands on the grid, and convolving it onto (or sampling it
//! from) the grid.

use std::ops::RangeInclusive;

use marlu::{c64, UVW};
use ndarray::prelude::*;

use super::{GridLayout, GridderError, GridderStats};
use crate::{
    chunk::VisChunk,
    constants::{TAU, VEL_C},
    math::{cexp, nint},
    uvw::RotatedUvws,
};

/// The grid pixel closest to a visibility, and the visibility's sub-pixel
/// offset from it in units of 1 / oversample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct GridPoint {
    pub(crate) iu: usize,
    pub(crate) iv: usize,
    pub(crate) frac_u: usize,
    pub(crate) frac_v: usize,
}

/// A (row, channel) pair that passed the bounds and flag checks.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Placement {
    pub(crate) row: usize,
    pub(crate) chan: usize,
    pub(crate) freq: f64,
    pub(crate) point: GridPoint,
    pub(crate) phasor: c64,
}

/// Split a coordinate in pixel units into an integer pixel and a fractional
/// offset in [0, oversample).
///
/// Rounding is done with [`nint`], and the pixel is nudged by one if the
/// fraction lands outside its range. This has to agree exactly with other
/// imagers, so don't "simplify" it.
pub(crate) fn grid_offset(
    scaled: f64,
    oversample: usize,
    axis: char,
) -> Result<(i64, usize), GridderError> {
    let os = oversample as f64;
    let mut i = nint(scaled);
    let mut frac = nint(os * (i as f64 - scaled));
    if frac < 0 {
        i += 1;
    }
    if frac >= oversample as i64 {
        i -= 1;
    }
    frac = nint(os * (i as f64 - scaled));
    if frac < 0 || frac >= oversample as i64 {
        return Err(GridderError::FractionalOffset {
            axis,
            frac,
            oversample,
            scaled,
        });
    }
    Ok((i, frac as usize))
}

/// Find where a visibility with baseline `uvw` \[metres\] at `freq` \[Hz\]
/// lands on the grid. `None` is returned if the kernel footprint wouldn't
/// fit, or if the coordinates aren't finite.
pub(crate) fn locate(
    uvw: &UVW,
    freq: f64,
    layout: &GridLayout,
    support: usize,
    oversample: usize,
) -> Result<Option<GridPoint>, GridderError> {
    let [cell_u, cell_v] = layout.uv_cell_sizes;
    let scaled_u = freq * uvw.u / (VEL_C * cell_u);
    let scaled_v = freq * uvw.v / (VEL_C * cell_v);
    // Also catches NaNs, and keeps the rounding below clear of i64 overflow.
    let in_range =
        scaled_u.abs() < layout.padded_nx as f64 && scaled_v.abs() < layout.padded_ny as f64;
    if !in_range {
        return Ok(None);
    }
    let (iu, frac_u) = grid_offset(scaled_u, oversample, 'u')?;
    let (iv, frac_v) = grid_offset(scaled_v, oversample, 'v')?;
    let iu = iu + (layout.padded_nx / 2) as i64;
    let iv = iv + (layout.padded_ny / 2) as i64;

    let s = support as i64;
    let fits = |i: i64, n: usize| i >= s && i < n as i64 - s;
    if !(fits(iu, layout.padded_nx) && fits(iv, layout.padded_ny)) {
        return Ok(None);
    }

    Ok(Some(GridPoint {
        iu: iu as usize,
        iv: iv as usize,
        frac_u,
        frac_v,
    }))
}

/// Work out which (row, channel) pairs of a chunk will be gridded or
/// degridded, and where. Pairs with a kernel footprint off the grid or with
/// any flagged polarisation are counted and dropped. If `rows` is given,
/// only rows marked `true` are considered.
#[allow(clippy::too_many_arguments)]
pub(crate) fn place_chunk(
    chunk: &dyn VisChunk,
    rotated: &RotatedUvws,
    rows: Option<&[bool]>,
    layout: &GridLayout,
    support: usize,
    oversample: usize,
    degridding: bool,
    stats: &mut GridderStats,
) -> Result<Vec<Placement>, GridderError> {
    let flags = chunk.flags();
    let freqs = chunk.frequencies();
    let mut placements = Vec::with_capacity(rotated.uvws.len() * freqs.len());

    for (row, ((uvw, &delay), flags)) in rotated
        .uvws
        .iter()
        .zip(rotated.delays.iter())
        .zip(flags.outer_iter())
        .enumerate()
    {
        if let Some(rows) = rows {
            if !rows[row] {
                continue;
            }
        }

        for (chan, (&freq, flags)) in freqs.iter().zip(flags.outer_iter()).enumerate() {
            let point = match locate(uvw, freq, layout, support, oversample)? {
                Some(p) => p,
                None => {
                    if degridding {
                        stats.num_degrid_flagged += 1;
                    } else {
                        stats.num_out_of_bounds += 1;
                    }
                    continue;
                }
            };

            if flags.iter().any(|&f| f) {
                stats.num_partially_flagged += 1;
                continue;
            }

            placements.push(Placement {
                row,
                chan,
                freq,
                point,
                phasor: cexp(TAU * freq * delay / VEL_C),
            });
        }
    }

    Ok(placements)
}

/// The part of a grid plane under a kernel centred on `point`.
fn footprint(point: &GridPoint, support: usize) -> (RangeInclusive<usize>, RangeInclusive<usize>) {
    (
        point.iv - support..=point.iv + support,
        point.iu - support..=point.iu + support,
    )
}

/// Convolve `value` onto `grid` with `kernel`.
#[inline]
pub(crate) fn grid_kernel(
    mut grid: ArrayViewMut2<c64>,
    kernel: ArrayView2<c64>,
    point: &GridPoint,
    support: usize,
    value: c64,
) {
    let (v_range, u_range) = footprint(point, support);
    grid.slice_mut(s![v_range, u_range])
        .zip_mut_with(&kernel, |g, &k| *g += k * value);
}

/// Sample `grid` with `kernel`. This is the adjoint of [`grid_kernel`].
#[inline]
pub(crate) fn degrid_kernel(
    grid: ArrayView2<c64>,
    kernel: ArrayView2<c64>,
    point: &GridPoint,
    support: usize,
) -> c64 {
    let (v_range, u_range) = footprint(point, support);
    grid.slice(s![v_range, u_range])
        .iter()
        .zip(kernel.iter())
        .map(|(g, k)| k.conj() * g)
        .sum()
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::gridder::ImageShape;

    fn layout(n: usize) -> GridLayout {
        GridLayout {
            shape: ImageShape {
                nx: n,
                ny: n,
                num_pols: 1,
                num_chans: 1,
            },
            padded_nx: n,
            padded_ny: n,
            uv_cell_sizes: [1.0, 1.0],
        }
    }

    #[test]
    fn test_grid_offset() {
        assert_eq!(grid_offset(0.0, 8, 'u').unwrap(), (0, 0));
        assert_eq!(grid_offset(3.0, 1, 'u').unwrap(), (3, 0));
        // 0.3 pixels: the pixel above, 0.7 pixels away.
        assert_eq!(grid_offset(0.3, 10, 'u').unwrap(), (1, 7));
        assert_eq!(grid_offset(-0.3, 10, 'u').unwrap(), (0, 3));
        assert_eq!(grid_offset(-2.25, 4, 'v').unwrap(), (-2, 1));
        assert_eq!(grid_offset(0.3, 1, 'u').unwrap(), (0, 0));
        assert_eq!(grid_offset(0.7, 1, 'u').unwrap(), (1, 0));

        for os in [1, 4, 128] {
            for x in [-7.49, -3.2, -0.01, 0.01, 0.26, 5.74, 100.4] {
                let (i, frac) = grid_offset(x, os, 'u').unwrap();
                assert!(frac < os);
                assert!((i as f64 - x) >= -0.5 / os as f64 - 1e-12);
                assert!((i as f64 - x) < 1.0);
            }
        }
    }

    #[test]
    fn test_grid_offset_half_pixel_is_fatal() {
        let result = grid_offset(0.5, 1, 'u');
        assert!(matches!(
            result,
            Err(GridderError::FractionalOffset {
                axis: 'u',
                oversample: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_locate_bounds() {
        let layout = layout(8);
        // With a cell size of 1 wavelength, u = c / f metres is one pixel.
        let freq = VEL_C;
        let uvw = |u, v| UVW { u, v, w: 0.0 };

        let p = locate(&uvw(0.0, 0.0), freq, &layout, 1, 4).unwrap().unwrap();
        assert_eq!((p.iu, p.iv, p.frac_u, p.frac_v), (4, 4, 0, 0));
        let p = locate(&uvw(2.0, -3.0), freq, &layout, 1, 4).unwrap().unwrap();
        assert_eq!((p.iu, p.iv), (6, 1));

        // Too close to the edges.
        assert!(locate(&uvw(3.0, 0.0), freq, &layout, 1, 4).unwrap().is_none());
        assert!(locate(&uvw(0.0, -4.0), freq, &layout, 1, 4).unwrap().is_none());
        assert!(locate(&uvw(0.0, -4.0), freq, &layout, 0, 1).unwrap().is_some());
        assert!(locate(&uvw(1e6, 0.0), freq, &layout, 0, 1).unwrap().is_none());
    }

    #[test]
    fn test_locate_rejects_unusable_coordinates() {
        let layout = layout(8);
        let freq = VEL_C;
        for (u, v) in [
            (f64::NAN, 0.0),
            (0.0, f64::NAN),
            (f64::INFINITY, 0.0),
            (0.0, f64::NEG_INFINITY),
            (1e19, 0.0),
            (0.0, -1e300),
        ] {
            let uvw = UVW { u, v, w: 0.0 };
            for (support, oversample) in [(0, 1), (1, 4)] {
                assert!(locate(&uvw, freq, &layout, support, oversample)
                    .unwrap()
                    .is_none());
            }
        }
    }

    #[test]
    fn test_grid_degrid_adjoint() {
        let mut kernel = Array2::zeros((3, 3));
        kernel[(0, 1)] = c64::new(0.25, 0.0);
        kernel[(1, 1)] = c64::new(1.0, 0.0);
        kernel[(2, 2)] = c64::new(0.1, -0.2);
        let norm_sq: f64 = kernel.iter().map(|k: &c64| k.norm_sqr()).sum();

        let point = GridPoint {
            iu: 3,
            iv: 2,
            frac_u: 0,
            frac_v: 0,
        };
        let value = c64::new(1.5, -0.5);
        let mut grid = Array2::zeros((6, 6));
        grid_kernel(grid.view_mut(), kernel.view(), &point, 1, value);
        assert_abs_diff_eq!(grid[(2, 3)], value);
        assert_abs_diff_eq!(grid[(1, 3)], value * 0.25);
        assert_abs_diff_eq!(grid[(3, 4)], value * c64::new(0.1, -0.2));
        assert_eq!(grid.iter().filter(|g| g.norm() > 0.0).count(), 3);

        let sample = degrid_kernel(grid.view(), kernel.view(), &point, 1);
        assert_abs_diff_eq!(sample, value * norm_sq, epsilon = 1e-12);
    }
}
