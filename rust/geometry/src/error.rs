// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or inverting frames
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Placement directions are zero-length or parallel, so no orthonormal
    /// basis can be built from them, or the origin is not finite.
    #[error("Degenerate frame: {0}")]
    DegenerateFrame(String),

    /// A matrix expected to be a rigid transform could not be inverted.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

impl Error {
    pub fn degenerate(msg: impl Into<String>) -> Self {
        Error::DegenerateFrame(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Error::InvariantViolation(msg.into())
    }
}
