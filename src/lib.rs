// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Visibility gridding and degridding for radio-interferometric imaging.

Irregularly-sampled visibilities are convolved onto a regular, padded
Fourier-domain grid ([`VisGridder::grid`]) and turned into an image
([`VisGridder::finalise_grid`]), or an image is turned into a grid
([`VisGridder::initialise_degrid`]) and sampled at visibility locations
([`VisGridder::degrid`]).
 */

pub mod axes;
pub mod chunk;
pub mod constants;
pub mod conv_func;
pub(crate) mod fft;
pub mod gridder;
pub mod image;
pub(crate) mod math;
pub mod params;
pub mod uvw;

// Re-exports.
pub use axes::{Axes, AxesError};
pub use chunk::{ChunkError, VisBuffer, VisChunk, VisWeighting};
pub use conv_func::{
    BoxFunction, ConvFuncError, ConvFuncKind, ConvFuncTable, ConvolutionFunction,
    SpheroidalFunction,
};
pub use gridder::{GridderError, GridderStats, ImageShape, VisGridder};
pub use image::{ImageIoError, ImageSink, MemoryImageSink};
pub use params::{GridderParams, ParamsError};
pub use uvw::{rotate_uvws, RotatedUvws, UvwMachine, UvwMachineCache};

// External re-exports.
pub use marlu::{c32, c64, RADec, UVW};
