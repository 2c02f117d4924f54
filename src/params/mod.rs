// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Gridder parameters.
//!
//! Parameters may be written in a toml file, e.g.
//!
//! ```toml
//! kernel = "spheroidal"
//! support = 3
//! oversample = 128
//! padding = 1.2
//! all_data_psf = false
//! ```
//!
//! Anything not specified takes its default value.

mod error;
#[cfg(test)]
mod tests;

pub use error::ParamsError;

use std::{path::Path, str::FromStr};

use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::{
    constants::{DEFAULT_OVERSAMPLE, DEFAULT_PADDING, DEFAULT_SUPPORT},
    conv_func::ConvFuncKind,
    gridder::VisGridder,
};

#[derive(Debug, Display, EnumIter, EnumString)]
enum ParamFileType {
    #[strum(serialize = "toml")]
    Toml,
}

/// Everything needed to make a [`VisGridder`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridderParams {
    /// The convolution function.
    pub kernel: ConvFuncKind,

    /// The half-width of the convolution kernels \[pixels\]. Ignored by the
    /// box kernel.
    pub support: usize,

    /// The number of sub-pixel kernel phases per pixel. Ignored by the box
    /// kernel.
    pub oversample: usize,

    /// The ratio of the grid size to the image size.
    pub padding: f64,

    /// Make the PSF with all data, rather than the data of a single feed and
    /// pointing.
    pub all_data_psf: bool,

    /// Only accept image axes with square pixels.
    pub square_pixels: bool,
}

impl Default for GridderParams {
    fn default() -> Self {
        GridderParams {
            kernel: ConvFuncKind::default(),
            support: DEFAULT_SUPPORT,
            oversample: DEFAULT_OVERSAMPLE,
            padding: DEFAULT_PADDING,
            all_data_psf: false,
            square_pixels: false,
        }
    }
}

impl GridderParams {
    pub fn from_toml_str(s: &str) -> Result<GridderParams, ParamsError> {
        let params = toml::from_str(s)?;
        Ok(params)
    }

    /// Read parameters from a file. The file type is determined by its
    /// extension.
    pub fn read_file<P: AsRef<Path>>(file: P) -> Result<GridderParams, ParamsError> {
        let file = file.as_ref();
        debug!("Attempting to parse parameter file {}", file.display());

        let file_type = file
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .and_then(|e| ParamFileType::from_str(&e).ok());
        match file_type {
            Some(ParamFileType::Toml) => {
                let contents = std::fs::read_to_string(file)?;
                toml::from_str(&contents).map_err(|err| ParamsError::BadFile {
                    file: file.to_path_buf(),
                    err,
                })
            }

            None => Err(ParamsError::UnknownFileType {
                file: file.to_path_buf(),
                valid: ParamFileType::iter().join(", "),
            }),
        }
    }

    /// Check that these parameters describe a usable gridder.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.oversample == 0 {
            return Err(ParamsError::Invalid {
                param: "oversample",
                reason: "must be positive".to_string(),
            });
        }
        if self.padding.is_nan() || self.padding < 1.0 {
            return Err(ParamsError::Invalid {
                param: "padding",
                reason: format!("must be at least 1, but got {}", self.padding),
            });
        }
        if self.kernel == ConvFuncKind::Spheroidal && self.support == 0 {
            return Err(ParamsError::Invalid {
                param: "support",
                reason: format!("must be positive for the {} kernel", self.kernel),
            });
        }
        Ok(())
    }

    /// Make a [`VisGridder`] from these parameters.
    pub fn build(&self) -> Result<VisGridder, ParamsError> {
        self.validate()?;
        debug!("Making a gridder with {self:?}");
        let func = self.kernel.create(self.support, self.oversample)?;
        let gridder = VisGridder::new(func, self.padding)?
            .with_all_data_psf(self.all_data_psf)
            .with_square_pixels(self.square_pixels);
        Ok(gridder)
    }
}
