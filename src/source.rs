// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::Rc;

use core::fmt;

use serde::{Deserialize, Serialize};

/// A position within a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourcePos {
    /// Line number. Starts at 1.
    pub line: u32,
    /// Column number. Starts at 1.
    pub col: u32,
    /// Byte offset into the file. Starts at 0.
    pub byte: u32,
}

impl SourcePos {
    pub const fn new(line: u32, col: u32, byte: u32) -> Self {
        Self { line, col, byte }
    }
}

/// A contiguous range within a source file, used to anchor diagnostics at
/// declaration and assignment sites.
///
/// Ranges are provenance only: they never participate in value equality.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceRange {
    pub filename: Rc<str>,
    pub start: SourcePos,
    pub end: SourcePos,
}

impl SourceRange {
    pub fn new(filename: impl Into<Rc<str>>, start: SourcePos, end: SourcePos) -> Self {
        Self {
            filename: filename.into(),
            start,
            end,
        }
    }

    /// Compact rendering of the start of the range, e.g. `main.conf:4,1`.
    /// Used inside diagnostic details to name a declaration site.
    pub fn start_string(&self) -> alloc::string::String {
        alloc::format!("{}:{},{}", self.filename, self.start.line, self.start.col)
    }
}

impl fmt::Display for SourceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(
                f,
                "{}:{},{}-{}",
                self.filename, self.start.line, self.start.col, self.end.col
            )
        } else {
            write!(
                f,
                "{}:{},{}-{},{}",
                self.filename, self.start.line, self.start.col, self.end.line, self.end.col
            )
        }
    }
}
