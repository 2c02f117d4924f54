// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all gridding-related errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GridderError {
    #[error("The padding factor must be at least 1, but got {0}")]
    InvalidPadding(f64),

    #[error("Image shape {0:?} has an empty axis")]
    EmptyShape([usize; 4]),

    #[error("Tried to {operation} before the gridder was initialised")]
    NotInitialised { operation: &'static str },

    #[error("Tried to {operation}, but the gridder was initialised for {initialised_for}")]
    WrongDirection {
        operation: &'static str,
        initialised_for: &'static str,
    },

    #[error("A PSF gridder can't be used for degridding")]
    PsfDegrid,

    #[error("Sum-of-weights array has shape {got:?}, but {expected:?} was expected")]
    SumWeightsShape {
        expected: [usize; 3],
        got: [usize; 3],
    },

    #[error("Fractional {axis} offset {frac} is outside [0, {oversample}) for scaled coordinate {scaled}")]
    FractionalOffset {
        axis: char,
        frac: i64,
        oversample: usize,
        scaled: f64,
    },

    #[error(transparent)]
    Axes(#[from] crate::axes::AxesError),

    #[error(transparent)]
    Chunk(#[from] crate::chunk::ChunkError),

    #[error(transparent)]
    ConvFunc(#[from] crate::conv_func::ConvFuncError),

    #[error(transparent)]
    ImageIo(#[from] crate::image::ImageIoError),
}
