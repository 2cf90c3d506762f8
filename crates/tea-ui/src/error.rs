// SPDX-License-Identifier: MIT
//
// Errors from tree edits and the driver.
//
// Rendering itself never fails: writes clip, layout saturates. What can go
// wrong is addressing a view that isn't in the tree, building a cycle, or
// the driver refusing bytes.

use std::io;

use thiserror::Error;

use crate::tree::ViewId;

#[derive(Error, Debug)]
pub enum Error {
    /// The driver failed to accept output.
    #[error("driver I/O error: {0}")]
    Io(#[from] io::Error),

    /// A `ViewId` that is not (or no longer) in the tree.
    #[error("unknown view {0:?}")]
    UnknownView(ViewId),

    /// Attaching `child` under `parent` would make `child` its own ancestor.
    #[error("cannot attach {child:?} under its own descendant {parent:?}")]
    Cycle { parent: ViewId, child: ViewId },

    /// A key description like `C-x` that doesn't name a key.
    #[error("invalid key description: {0:?}")]
    InvalidKey(String),
}

pub type Result<T> = std::result::Result<T, Error>;
