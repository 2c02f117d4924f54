// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChunkError {
    #[error("Visibility chunk has {got} {what}, but {expected} rows were expected")]
    RowMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },

    #[error("Flags have shape {flags:?}, but visibilities have shape {vis:?}")]
    FlagShape { flags: [usize; 3], vis: [usize; 3] },

    #[error("Visibilities have {vis} channels, but {freqs} frequencies were supplied")]
    ChannelMismatch { vis: usize, freqs: usize },

    #[error("Visibility chunks need at least one frequency")]
    NoFrequencies,
}
