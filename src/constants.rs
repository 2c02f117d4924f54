// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

All constants *must* be double precision. Gridding coordinates and phases are
always calculated in double precision; only visibilities are stored in single
precision.
 */

pub use marlu::constants::VEL_C;
pub use std::f64::consts::{PI, TAU};

/// The default half-width of a convolution kernel \[pixels\].
pub const DEFAULT_SUPPORT: usize = 3;

/// The default number of sub-pixel kernel phases per grid pixel.
pub const DEFAULT_OVERSAMPLE: usize = 128;

/// The default ratio of the grid size to the requested image size.
pub const DEFAULT_PADDING: f64 = 1.0;

/// Pointing directions closer than this are considered identical when
/// caching UVW rotations or picking a representative pointing for the PSF
/// \[radians\].
pub const POINTING_TOLERANCE: f64 = 1e-9;

/// The number of floating-point operations used to estimate throughput per
/// gridded or degridded point (one complex multiply-add).
pub const FLOPS_PER_POINT: f64 = 8.0;

/// The name of the right ascension axis in an [`crate::Axes`].
pub const AXIS_RA: &str = "RA";
/// The name of the declination axis in an [`crate::Axes`].
pub const AXIS_DEC: &str = "DEC";
/// The name of the tangent-point right ascension axis in an [`crate::Axes`].
pub const AXIS_RA_TANGENT: &str = "RA-TANGENT";
/// The name of the tangent-point declination axis in an [`crate::Axes`].
pub const AXIS_DEC_TANGENT: &str = "DEC-TANGENT";
