// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Chunks of visibilities handed to a gridder.
//!
//! Reading visibilities from disk is not the business of this crate; whatever
//! does that only needs to present its data through [`VisChunk`]. A simple
//! in-memory implementation ([`VisBuffer`]) is provided.

mod error;

pub use error::ChunkError;

use marlu::{c32, RADec, UVW};
use ndarray::prelude::*;
use vec1::Vec1;

/// A chunk of visibility rows. Visibility and flag cubes are ordered
/// `[row][channel][polarisation]`.
pub trait VisChunk {
    /// The [`UVW`] coordinates of each row \[metres\].
    fn uvws(&self) -> &[UVW];

    /// The feed (beam) index of the first antenna of each row.
    fn feeds(&self) -> &[usize];

    /// The pointing direction of the first antenna of each row.
    fn pointing_dirs(&self) -> &[RADec];

    /// The frequency of each channel \[Hz\].
    fn frequencies(&self) -> &[f64];

    fn vis(&self) -> ArrayView3<c32>;

    fn vis_mut(&mut self) -> ArrayViewMut3<c32>;

    /// `true` where a visibility is flagged.
    fn flags(&self) -> ArrayView3<bool>;

    fn num_rows(&self) -> usize {
        self.uvws().len()
    }

    fn num_chans(&self) -> usize {
        self.frequencies().len()
    }

    fn num_pols(&self) -> usize {
        self.vis().len_of(Axis(2))
    }
}

/// Check that everything in `chunk` agrees on the number of rows, channels
/// and polarisations. Implementations of [`VisChunk`] other than [`VisBuffer`]
/// aren't guaranteed to be consistent.
pub(crate) fn check_chunk(chunk: &dyn VisChunk) -> Result<(), ChunkError> {
    let num_rows = chunk.num_rows();
    for (what, got) in [
        ("feeds", chunk.feeds().len()),
        ("pointing directions", chunk.pointing_dirs().len()),
        ("visibility rows", chunk.vis().len_of(Axis(0))),
    ] {
        if got != num_rows {
            return Err(ChunkError::RowMismatch {
                what,
                got,
                expected: num_rows,
            });
        }
    }
    let vis_dim = chunk.vis().dim();
    let flags_dim = chunk.flags().dim();
    if flags_dim != vis_dim {
        return Err(ChunkError::FlagShape {
            flags: [flags_dim.0, flags_dim.1, flags_dim.2],
            vis: [vis_dim.0, vis_dim.1, vis_dim.2],
        });
    }
    if vis_dim.1 != chunk.num_chans() {
        return Err(ChunkError::ChannelMismatch {
            vis: vis_dim.1,
            freqs: chunk.num_chans(),
        });
    }
    Ok(())
}

/// A per-visibility weighting functor. Any `Fn(usize, f64, usize) -> f64`
/// closure taking (row, frequency \[Hz\], polarisation) is one.
pub trait VisWeighting {
    fn weight(&self, row: usize, freq_hz: f64, pol: usize) -> f64;
}

impl<F> VisWeighting for F
where
    F: Fn(usize, f64, usize) -> f64,
{
    fn weight(&self, row: usize, freq_hz: f64, pol: usize) -> f64 {
        self(row, freq_hz, pol)
    }
}

/// Visibilities and their metadata held in memory.
#[derive(Debug, Clone)]
pub struct VisBuffer {
    uvws: Vec<UVW>,
    feeds: Vec<usize>,
    pointing_dirs: Vec<RADec>,
    freqs: Vec1<f64>,
    vis: Array3<c32>,
    flags: Array3<bool>,
}

impl VisBuffer {
    /// Create a new [`VisBuffer`], checking that all the supplied pieces agree
    /// on the number of rows, channels and polarisations.
    pub fn new(
        uvws: Vec<UVW>,
        feeds: Vec<usize>,
        pointing_dirs: Vec<RADec>,
        freqs: Vec1<f64>,
        vis: Array3<c32>,
        flags: Array3<bool>,
    ) -> Result<VisBuffer, ChunkError> {
        let num_rows = uvws.len();
        for (what, got) in [
            ("feeds", feeds.len()),
            ("pointing directions", pointing_dirs.len()),
            ("visibility rows", vis.len_of(Axis(0))),
        ] {
            if got != num_rows {
                return Err(ChunkError::RowMismatch {
                    what,
                    got,
                    expected: num_rows,
                });
            }
        }
        if flags.dim() != vis.dim() {
            let (f0, f1, f2) = flags.dim();
            let (v0, v1, v2) = vis.dim();
            return Err(ChunkError::FlagShape {
                flags: [f0, f1, f2],
                vis: [v0, v1, v2],
            });
        }
        if vis.len_of(Axis(1)) != freqs.len() {
            return Err(ChunkError::ChannelMismatch {
                vis: vis.len_of(Axis(1)),
                freqs: freqs.len(),
            });
        }

        Ok(VisBuffer {
            uvws,
            feeds,
            pointing_dirs,
            freqs,
            vis,
            flags,
        })
    }

    /// Create a new [`VisBuffer`] with zero-valued, unflagged visibilities,
    /// all on feed 0 with the same pointing direction. This is useful as a
    /// target for degridding.
    pub fn zeros(
        uvws: Vec<UVW>,
        pointing: RADec,
        freqs: &[f64],
        num_pols: usize,
    ) -> Result<VisBuffer, ChunkError> {
        let freqs = Vec1::try_from_vec(freqs.to_vec()).map_err(|_| ChunkError::NoFrequencies)?;
        let num_rows = uvws.len();
        let shape = (num_rows, freqs.len(), num_pols);
        VisBuffer::new(
            uvws,
            vec![0; num_rows],
            vec![pointing; num_rows],
            freqs,
            Array3::zeros(shape),
            Array3::from_elem(shape, false),
        )
    }

    /// Flag a single visibility.
    pub fn flag(&mut self, row: usize, chan: usize, pol: usize) {
        self.flags[(row, chan, pol)] = true;
    }

    /// Set the feed of a row.
    pub fn set_feed(&mut self, row: usize, feed: usize) {
        self.feeds[row] = feed;
    }

    pub fn into_vis(self) -> Array3<c32> {
        self.vis
    }
}

impl VisChunk for VisBuffer {
    fn uvws(&self) -> &[UVW] {
        &self.uvws
    }

    fn feeds(&self) -> &[usize] {
        &self.feeds
    }

    fn pointing_dirs(&self) -> &[RADec] {
        &self.pointing_dirs
    }

    fn frequencies(&self) -> &[f64] {
        &self.freqs
    }

    fn vis(&self) -> ArrayView3<c32> {
        self.vis.view()
    }

    fn vis_mut(&mut self) -> ArrayViewMut3<c32> {
        self.vis.view_mut()
    }

    fn flags(&self) -> ArrayView3<bool> {
        self.flags.view()
    }
}
