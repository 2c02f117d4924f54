// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::time::Duration;

use log::{info, warn};

use crate::constants::FLOPS_PER_POINT;

/// Running totals kept by a gridder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridderStats {
    /// The number of (visibility, polarisation) samples gridded.
    pub samples_gridded: u64,
    /// The number of (visibility, polarisation) samples degridded.
    pub samples_degridded: u64,
    /// The number of grid pixels touched while gridding.
    pub points_gridded: u64,
    /// The number of grid pixels read while degridding.
    pub points_degridded: u64,

    pub time_gridding: Duration,
    pub time_degridding: Duration,
    pub time_coordinates: Duration,
    pub time_conv_func: Duration,
    /// How many times the convolution kernels have been (re)built.
    pub num_conv_func_builds: u64,

    /// (row, channel) pairs not gridded because their kernels would fall off
    /// the grid.
    pub num_out_of_bounds: u64,
    /// (row, channel) pairs not degridded because their kernels would fall
    /// off the grid.
    pub num_degrid_flagged: u64,
    /// (row, channel) pairs skipped because at least one polarisation was
    /// flagged.
    pub num_partially_flagged: u64,
    /// (row, channel) pairs skipped because their polarisations can't be
    /// mapped to the image's.
    pub num_unsupported_pols: u64,
    /// Rows skipped by a PSF gridder because they don't belong to its
    /// representative feed and pointing.
    pub num_psf_rows_rejected: u64,
}

impl GridderStats {
    /// Has nothing been gridded or degridded?
    pub fn is_unused(&self) -> bool {
        self.samples_gridded == 0 && self.samples_degridded == 0
    }

    /// Log these statistics. A gridder that did nothing is reported as a
    /// warning.
    pub fn report(&self, name: &str) {
        if self.is_unused() {
            warn!("{name}: unused gridder");
            return;
        }

        info!(
            "{name}: {:.3}s spent rotating coordinates, {:.3}s making convolution functions ({} builds)",
            self.time_coordinates.as_secs_f64(),
            self.time_conv_func.as_secs_f64(),
            self.num_conv_func_builds
        );
        for (what, samples, points, time) in [
            (
                "Gridding",
                self.samples_gridded,
                self.points_gridded,
                self.time_gridding,
            ),
            (
                "Degridding",
                self.samples_degridded,
                self.points_degridded,
                self.time_degridding,
            ),
        ] {
            if samples == 0 {
                continue;
            }
            info!("{name}: {what}: {samples} samples, {points} points, {:.3}s", time.as_secs_f64());
            let secs = time.as_secs_f64();
            if secs > 0.0 {
                info!(
                    "{name}: {what}: {:.1} ns per point, ~{:.1} Mflops",
                    1e9 * secs / points as f64,
                    FLOPS_PER_POINT * points as f64 / secs / 1e6
                );
            }
        }

        let skipped = [
            (self.num_out_of_bounds, "off the grid while gridding"),
            (self.num_degrid_flagged, "off the grid while degridding"),
            (self.num_partially_flagged, "partially flagged"),
            (self.num_unsupported_pols, "with unsupported polarisations"),
        ];
        for (count, why) in skipped {
            if count > 0 {
                info!("{name}: {count} (row, channel) pairs skipped {why}");
            }
        }
        if self.num_psf_rows_rejected > 0 {
            info!(
                "{name}: {} rows not from the representative feed/pointing excluded from the PSF",
                self.num_psf_rows_rejected
            );
        }
    }
}
