// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::source::SourceRange;
use crate::Rc;

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    Error,
    Warning,
}

/// One problem found while resolving input variables.
///
/// Diagnostics are data, never exceptions: every fallible stage returns
/// `(result, diagnostics)` and the caller decides what an error means.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: Rc<str>,
    pub detail: Rc<str>,

    /// The range the problem is about, typically an assignment site.
    pub subject: Option<SourceRange>,

    /// A wider range giving context, typically the enclosing declaration.
    pub context: Option<SourceRange>,
}

impl Diagnostic {
    pub fn error(summary: impl Into<Rc<str>>, detail: impl Into<Rc<str>>) -> Self {
        Self {
            severity: Severity::Error,
            summary: summary.into(),
            detail: detail.into(),
            subject: None,
            context: None,
        }
    }

    pub fn warning(summary: impl Into<Rc<str>>, detail: impl Into<Rc<str>>) -> Self {
        Self {
            severity: Severity::Warning,
            summary: summary.into(),
            detail: detail.into(),
            subject: None,
            context: None,
        }
    }

    pub fn with_subject(mut self, range: SourceRange) -> Self {
        self.subject = Some(range);
        self
    }

    pub fn with_context(mut self, range: SourceRange) -> Self {
        self.context = Some(range);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.summary, self.detail)
    }
}

/// An append-only sequence of diagnostics.
///
/// Order is preserved for display and is deterministic per call, but has no
/// semantic meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    diags: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diag: Diagnostic) {
        self.diags.push(diag);
    }

    pub fn has_errors(&self) -> bool {
        self.diags.iter().any(Diagnostic::is_error)
    }

    pub fn is_empty(&self) -> bool {
        self.diags.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diags.len()
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Diagnostic> {
        self.diags.iter()
    }

    /// Collapse all error diagnostics into a single error, or `None` when
    /// there are none. Hosts that treat any error as fatal use this at the
    /// boundary.
    pub fn err(&self) -> Option<anyhow::Error> {
        if !self.has_errors() {
            return None;
        }
        let msg = self
            .diags
            .iter()
            .filter(|d| d.is_error())
            .map(|d| alloc::format!("{d}"))
            .collect::<Vec<String>>()
            .join("\n");
        Some(anyhow!(msg))
    }
}

impl From<Diagnostic> for Diagnostics {
    fn from(diag: Diagnostic) -> Self {
        let mut diags = Diagnostics::new();
        diags.push(diag);
        diags
    }
}

impl Extend<Diagnostic> for Diagnostics {
    fn extend<T: IntoIterator<Item = Diagnostic>>(&mut self, iter: T) {
        self.diags.extend(iter);
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = alloc::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diags.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = core::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diags.iter()
    }
}

impl FromIterator<Diagnostic> for Diagnostics {
    fn from_iter<T: IntoIterator<Item = Diagnostic>>(iter: T) -> Self {
        Self {
            diags: iter.into_iter().collect(),
        }
    }
}
