// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::source::SourceRange;
use crate::value::Value;
use crate::variable::VariableDecls;
use crate::Rc;

use alloc::collections::BTreeMap;
use core::fmt;

use serde::{Deserialize, Serialize};

/// Where an assignment came from.
///
/// Kinds tag provenance for diagnostics only; precedence between sources is
/// encoded by the order of [`InputValues::override_with`] layers, which the
/// caller composes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceKind {
    /// Origin not tracked; used by callers that synthesize values.
    Unknown,
    /// A default taken from the module configuration.
    Config,
    /// A default injected by the host.
    Default,
    /// An environment variable.
    EnvVar,
    /// A values file.
    File,
    /// A command-line argument.
    CliArg,
    /// Supplied programmatically by the calling system.
    Caller,
    /// Interactive input.
    Input,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SourceKind::Unknown => "unknown",
            SourceKind::Config => "config",
            SourceKind::Default => "default",
            SourceKind::EnvVar => "env-var",
            SourceKind::File => "file",
            SourceKind::CliArg => "cli-arg",
            SourceKind::Caller => "caller",
            SourceKind::Input => "input",
        };
        f.write_str(s)
    }
}

/// One incoming assignment: a value tagged with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputValue {
    pub value: Value,
    pub source_kind: SourceKind,
    pub source_range: Option<SourceRange>,
}

impl InputValue {
    pub fn new(value: Value, source_kind: SourceKind) -> Self {
        Self {
            value,
            source_kind,
            source_range: None,
        }
    }

    pub fn with_range(mut self, range: SourceRange) -> Self {
        self.source_range = Some(range);
        self
    }
}

/// A bag of assignments: at most one [`InputValue`] per variable name.
///
/// Backed by an ordered map so that iteration, and therefore diagnostic
/// emission, is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputValues {
    values: BTreeMap<Rc<str>, InputValue>,
}

impl InputValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a bag from plain values under a fixed source kind, with no
    /// source ranges. This is how caller-provided overrides enter the
    /// pipeline.
    pub fn from_map(values: BTreeMap<Rc<str>, Value>, kind: SourceKind) -> Self {
        Self {
            values: values
                .into_iter()
                .map(|(name, value)| (name, InputValue::new(value, kind)))
                .collect(),
        }
    }

    /// The defaults layer: exactly the declarations that carry a default,
    /// tagged as configuration at the declaration site. Values are taken
    /// verbatim; conversion against the declared type is the finalizer's
    /// job. Declarations without a default contribute nothing; their value
    /// must arrive from another layer or finalization reports them.
    pub fn default_values(decls: &VariableDecls) -> Self {
        let mut values = BTreeMap::new();
        for (name, decl) in decls.iter() {
            if let Some(default) = decl.default() {
                values.insert(
                    name.clone(),
                    InputValue::new(default.clone(), SourceKind::Config)
                        .with_range(decl.decl_range().clone()),
                );
            }
        }
        Self { values }
    }

    /// Merge `layers` over `self`, in order: for every key a later layer
    /// supplies, its assignment replaces the earlier one wholesale,
    /// provenance included, so that diagnostics point at the override site.
    /// Keys only present in `self` survive; keys only present in a layer are
    /// introduced. There is no deep merging.
    pub fn override_with(&self, layers: &[InputValues]) -> InputValues {
        let mut merged = self.values.clone();
        for layer in layers {
            for (name, value) in layer.values.iter() {
                merged.insert(name.clone(), value.clone());
            }
        }
        InputValues { values: merged }
    }

    /// True when the two bags agree on key set, raw value equality, and
    /// source kind. Source ranges are excluded so synthetic overrides built
    /// without ranges still compare equal to the real thing.
    pub fn identical(&self, other: &InputValues) -> bool {
        if self.values.len() != other.values.len() {
            return false;
        }
        self.values.iter().all(|(name, iv)| {
            other.values.get(name).is_some_and(|other_iv| {
                iv.value == other_iv.value && iv.source_kind == other_iv.source_kind
            })
        })
    }

    /// Strip provenance, leaving the plain name-to-value view the evaluator
    /// consumes.
    pub fn just_values(&self) -> BTreeMap<Rc<str>, Value> {
        self.values
            .iter()
            .map(|(name, iv)| (name.clone(), iv.value.clone()))
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&InputValue> {
        self.values.get(name)
    }

    pub fn insert(&mut self, name: impl Into<Rc<str>>, value: InputValue) -> Option<InputValue> {
        self.values.insert(name.into(), value)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &Rc<str>> {
        self.values.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Rc<str>, &InputValue)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(Rc<str>, InputValue)> for InputValues {
    fn from_iter<T: IntoIterator<Item = (Rc<str>, InputValue)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for InputValues {
    type Item = (Rc<str>, InputValue);
    type IntoIter = alloc::collections::btree_map::IntoIter<Rc<str>, InputValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a> IntoIterator for &'a InputValues {
    type Item = (&'a Rc<str>, &'a InputValue);
    type IntoIter = alloc::collections::btree_map::Iter<'a, Rc<str>, InputValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
