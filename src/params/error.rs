// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors from reading and validating gridder parameters.

use std::path::PathBuf;

use thiserror::Error;

use crate::{conv_func::ConvFuncError, gridder::GridderError};

#[derive(Error, Debug)]
pub enum ParamsError {
    #[error("Parameter file '{}' doesn't have a recognised file extension! Valid extensions are: {valid}", file.display())]
    UnknownFileType { file: PathBuf, valid: String },

    #[error("Couldn't decode toml structure from {file:?}:\n{err}")]
    BadFile { file: PathBuf, err: toml::de::Error },

    #[error("Invalid value for '{param}': {reason}")]
    Invalid {
        param: &'static str,
        reason: String,
    },

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    ConvFunc(#[from] ConvFuncError),

    #[error(transparent)]
    Gridder(#[from] GridderError),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
