// SPDX-FileCopyrightText: © 2025 Phala Network <dstack@phala.network>
//
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

/// Behaviour switches for [`ToolsLike`](crate::ToolsLike)
///
/// Missing keys in a serialized config take their default value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Encode attribute bitmasks as a list of names instead of one string
    pub use_lists: bool,
    /// Fail on unknown fields when decoding structures
    pub strict: bool,
    /// Match constant, flag and field names regardless of case
    pub case_insensitive: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            use_lists: false,
            strict: false,
            case_insensitive: true,
        }
    }
}
