// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Named world-coordinate ranges describing an image.
//!
//! An image handed to a gridder is described by (at least) its "RA" and "DEC"
//! axes; the start and end of each are in radians. Faceted imaging may
//! additionally supply "RA-TANGENT" and "DEC-TANGENT" axes, in which case the
//! tangent point of the projection is distinct from the image centre.

mod error;

pub use error::AxesError;

use indexmap::IndexMap;
use marlu::RADec;

use crate::constants::{AXIS_DEC, AXIS_DEC_TANGENT, AXIS_RA, AXIS_RA_TANGENT};

/// The start and end of a single world-coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRange {
    pub start: f64,
    pub end: f64,
}

impl AxisRange {
    /// The extent of this axis (end - start). This may be negative, e.g. for
    /// right ascension increasing to the left.
    pub fn span(&self) -> f64 {
        self.end - self.start
    }

    /// The centre of this axis.
    pub fn centre(&self) -> f64 {
        0.5 * (self.start + self.end)
    }
}

/// An ordered collection of named [`AxisRange`]s.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Axes {
    axes: IndexMap<String, AxisRange>,
}

impl Axes {
    pub fn new() -> Axes {
        Axes::default()
    }

    /// Make "RA" and "DEC" axes for an image of `num_pixels` square pixels of
    /// `cell_size` radians, centred on `centre`.
    pub fn from_image_centre(centre: RADec, cell_size: f64, num_pixels: [usize; 2]) -> Axes {
        let mut axes = Axes::new();
        let half_ra = 0.5 * num_pixels[0] as f64 * cell_size;
        let half_dec = 0.5 * num_pixels[1] as f64 * cell_size;
        axes.add(AXIS_RA, centre.ra - half_ra, centre.ra + half_ra);
        axes.add(AXIS_DEC, centre.dec - half_dec, centre.dec + half_dec);
        axes
    }

    /// Set the tangent point of the projection, making it distinct from the
    /// image centre.
    pub fn set_tangent_point(&mut self, tangent: RADec) {
        self.add(AXIS_RA_TANGENT, tangent.ra, tangent.ra);
        self.add(AXIS_DEC_TANGENT, tangent.dec, tangent.dec);
    }

    /// Add an axis. An axis with the same name is replaced, but keeps its
    /// position.
    pub fn add(&mut self, name: &str, start: f64, end: f64) {
        self.axes.insert(name.to_string(), AxisRange { start, end });
    }

    pub fn has(&self, name: &str) -> bool {
        self.axes.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Result<AxisRange, AxesError> {
        self.axes
            .get(name)
            .copied()
            .ok_or_else(|| AxesError::MissingAxis(name.to_string()))
    }

    pub fn start(&self, name: &str) -> Result<f64, AxesError> {
        self.get(name).map(|a| a.start)
    }

    pub fn end(&self, name: &str) -> Result<f64, AxesError> {
        self.get(name).map(|a| a.end)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.axes.keys().map(|s| s.as_str())
    }

    /// Check that the mandatory "RA" and "DEC" axes are present.
    pub fn check_direction_axes(&self) -> Result<(), AxesError> {
        self.get(AXIS_RA)?;
        self.get(AXIS_DEC)?;
        Ok(())
    }

    /// The direction of the image centre, i.e. the mid-points of the "RA" and
    /// "DEC" axes.
    pub fn image_centre(&self) -> Result<RADec, AxesError> {
        let ra = self.get(AXIS_RA)?;
        let dec = self.get(AXIS_DEC)?;
        Ok(RADec {
            ra: ra.centre(),
            dec: dec.centre(),
        })
    }

    /// The tangent point of the image projection. If no tangent axes were
    /// defined, this is the image centre.
    pub fn tangent_point(&self) -> Result<RADec, AxesError> {
        match (
            self.axes.get(AXIS_RA_TANGENT),
            self.axes.get(AXIS_DEC_TANGENT),
        ) {
            (Some(ra), Some(dec)) => Ok(RADec {
                ra: ra.start,
                dec: dec.start,
            }),
            (Some(_), None) => Err(AxesError::MissingAxis(AXIS_DEC_TANGENT.to_string())),
            (None, Some(_)) => Err(AxesError::MissingAxis(AXIS_RA_TANGENT.to_string())),
            (None, None) => self.image_centre(),
        }
    }

    /// The UV cell sizes for the (u, v) axes of a grid padded by `padding`
    /// \[wavelengths\].
    pub fn uv_cell_sizes(&self, padding: f64) -> Result<[f64; 2], AxesError> {
        let mut cell_sizes = [0.0; 2];
        for (cell_size, name) in cell_sizes.iter_mut().zip([AXIS_RA, AXIS_DEC]) {
            let span = self.get(name)?.span();
            if span == 0.0 {
                return Err(AxesError::ZeroSpan(name.to_string()));
            }
            *cell_size = 1.0 / span / padding;
        }
        Ok(cell_sizes)
    }

    /// The angular size of a pixel along the "RA" and "DEC" axes, given the
    /// number of pixels along each \[radians\].
    pub fn pixel_sizes(&self, num_pixels: [usize; 2]) -> Result<[f64; 2], AxesError> {
        let mut sizes = [0.0; 2];
        for ((size, name), n) in sizes.iter_mut().zip([AXIS_RA, AXIS_DEC]).zip(num_pixels) {
            if n == 0 {
                return Err(AxesError::NoPixels {
                    name: name.to_string(),
                    num_pixels: n,
                });
            }
            *size = self.get(name)?.span().abs() / n as f64;
        }
        Ok(sizes)
    }

    /// Ensure that the pixels described by these axes are square, to within a
    /// relative tolerance of 1e-6.
    pub fn check_square_pixels(&self, num_pixels: [usize; 2]) -> Result<(), AxesError> {
        let [ra, dec] = self.pixel_sizes(num_pixels)?;
        if (ra - dec).abs() > 1e-6 * ra.abs().max(dec.abs()) {
            return Err(AxesError::UnequalPixelSizes { ra, dec });
        }
        Ok(())
    }
}
