// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConvFuncError {
    #[error("The oversampling factor must be positive")]
    ZeroOversample,

    #[error("The {kind} convolution function needs a positive support")]
    ZeroSupport { kind: super::ConvFuncKind },
}
