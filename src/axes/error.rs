// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AxesError {
    #[error("The axes descriptor has no '{0}' axis")]
    MissingAxis(String),

    #[error("The '{0}' axis has zero extent; a UV cell size can't be derived")]
    ZeroSpan(String),

    #[error("Can't derive a pixel size for the '{name}' axis with {num_pixels} pixels")]
    NoPixels { name: String, num_pixels: usize },

    #[error("Pixel sizes differ between axes: {ra} vs {dec} radians")]
    UnequalPixelSizes { ra: f64, dec: f64 },
}
