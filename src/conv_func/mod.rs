// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Convolution functions (kernels) used for gridding and degridding.
//!
//! [`ConvolutionFunction`] is a trait detailing how a family of kernels is
//! made, how visibilities are classified into kernel classes and grids, and
//! how the image-domain footprint of the kernels is corrected. Kernels for
//! every sub-pixel phase are precomputed into a [`ConvFuncTable`].

mod box_func;
mod error;
mod spheroidal;

pub use box_func::BoxFunction;
pub use error::ConvFuncError;
pub use spheroidal::SpheroidalFunction;

use log::debug;
use marlu::c64;
use ndarray::prelude::*;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::chunk::VisChunk;

/// Supported convolution functions.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ConvFuncKind {
    /// Nearest-neighbour gridding; a single pixel of amplitude 1.
    Box,

    /// The prolate spheroidal wave function.
    #[default]
    Spheroidal,
}

impl ConvFuncKind {
    /// Create a [`ConvolutionFunction`] of this kind. `support` and
    /// `oversample` are ignored for [`ConvFuncKind::Box`].
    pub fn create(
        self,
        support: usize,
        oversample: usize,
    ) -> Result<Box<dyn ConvolutionFunction>, ConvFuncError> {
        match self {
            ConvFuncKind::Box => Ok(Box::new(BoxFunction)),
            ConvFuncKind::Spheroidal => {
                Ok(Box::new(SpheroidalFunction::new(support, oversample)?))
            }
        }
    }
}

/// A trait abstracting the convolution function used by a gridder.
///
/// The classification methods let a function use different kernels (e.g. per
/// w-plane) or different grids (e.g. per feed) for different visibilities.
/// The default implementations treat every visibility identically.
pub trait ConvolutionFunction {
    fn kind(&self) -> ConvFuncKind;

    /// The half-width of each kernel \[pixels\].
    fn support(&self) -> usize;

    /// The number of sub-pixel phases in each direction.
    fn oversample(&self) -> usize;

    /// The number of distinct kernel classes.
    fn num_classes(&self) -> usize {
        1
    }

    /// Which kernel class should be used for a visibility.
    fn classify(&self, _row: usize, _pol: usize, _chan: usize) -> usize {
        0
    }

    /// The number of grids.
    fn num_grids(&self) -> usize {
        1
    }

    /// Which grid a visibility belongs to.
    fn grid_index(&self, _row: usize, _pol: usize, _chan: usize) -> usize {
        0
    }

    /// Should the kernel table be rebuilt before processing `chunk`? This is
    /// asked for every chunk, including the first. The default never
    /// rebuilds once built.
    fn is_stale(&self, _chunk: &dyn VisChunk) -> bool {
        false
    }

    /// Compute the kernels for every class and sub-pixel phase.
    fn build_table(&self) -> ConvFuncTable;

    /// Correct a (padded) image plane for the image-domain footprint of the
    /// kernels.
    fn correct_image(&self, image: ArrayViewMut2<f64>);
}

/// Kernels for every (class, v phase, u phase), stored contiguously. Each
/// kernel is `2 * support + 1` pixels square.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvFuncTable {
    support: usize,
    oversample: usize,
    num_classes: usize,
    kernels: Array3<c64>,
}

impl ConvFuncTable {
    /// A table of zero-valued kernels.
    pub fn zeros(support: usize, oversample: usize, num_classes: usize) -> ConvFuncTable {
        let width = 2 * support + 1;
        ConvFuncTable {
            support,
            oversample,
            num_classes,
            kernels: Array3::zeros((oversample * oversample * num_classes, width, width)),
        }
    }

    pub fn support(&self) -> usize {
        self.support
    }

    pub fn oversample(&self) -> usize {
        self.oversample
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    pub fn num_kernels(&self) -> usize {
        self.kernels.len_of(Axis(0))
    }

    /// The width of each kernel \[pixels\].
    pub fn width(&self) -> usize {
        2 * self.support + 1
    }

    /// Get the index of the kernel for the sub-pixel phases `frac_u` and
    /// `frac_v` and kernel class `class`.
    #[inline]
    pub fn index(&self, frac_u: usize, frac_v: usize, class: usize) -> usize {
        frac_u + self.oversample * (frac_v + self.oversample * class)
    }

    /// Get a kernel by its index. The index must be in range.
    #[inline]
    pub fn kernel(&self, index: usize) -> ArrayView2<c64> {
        assert!(
            index < self.num_kernels(),
            "Convolution function index {index} is out of range (only {} kernels)",
            self.num_kernels()
        );
        self.kernels.index_axis(Axis(0), index)
    }

    pub fn kernel_mut(&mut self, index: usize) -> ArrayViewMut2<c64> {
        self.kernels.index_axis_mut(Axis(0), index)
    }

    pub fn kernels(&self) -> ArrayView3<c64> {
        self.kernels.view()
    }

    /// Scale all kernels so that the mean kernel sum (over all phases of a
    /// class) is 1.
    pub fn normalise(&mut self) {
        let num_phases = (self.oversample * self.oversample) as f64;
        let total: f64 = self.kernels.iter().map(|k| k.re).sum();
        let mean = total / (num_phases * self.num_classes as f64);
        if mean != 0.0 {
            self.kernels.mapv_inplace(|k| k / mean);
        }
    }
}

/// Holds a [`ConvolutionFunction`] and its lazily-built [`ConvFuncTable`].
pub(crate) struct ConvFuncCache {
    func: Box<dyn ConvolutionFunction>,
    table: Option<ConvFuncTable>,
    num_builds: usize,
}

impl ConvFuncCache {
    pub(crate) fn new(func: Box<dyn ConvolutionFunction>) -> ConvFuncCache {
        ConvFuncCache {
            func,
            table: None,
            num_builds: 0,
        }
    }

    pub(crate) fn func(&self) -> &dyn ConvolutionFunction {
        self.func.as_ref()
    }

    pub(crate) fn table(&self) -> Option<&ConvFuncTable> {
        self.table.as_ref()
    }

    /// How many times has the table been built?
    pub(crate) fn num_builds(&self) -> usize {
        self.num_builds
    }

    /// Make sure the table is ready for `chunk`, (re)building it if
    /// necessary.
    pub(crate) fn prepare(
        &mut self,
        chunk: &dyn VisChunk,
    ) -> (&dyn ConvolutionFunction, &ConvFuncTable) {
        if self.func.is_stale(chunk) && self.table.take().is_some() {
            debug!("The {} convolution function is stale", self.func.kind());
        }

        let func = self.func.as_ref();
        let num_builds = &mut self.num_builds;
        let table = self.table.get_or_insert_with(|| {
            let table = func.build_table();
            debug!(
                "Built {} {} convolution kernels (support {}, oversample {})",
                table.num_kernels(),
                func.kind(),
                table.support(),
                table.oversample()
            );
            *num_builds += 1;
            table
        });
        (func, table)
    }
}
