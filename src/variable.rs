// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::source::SourceRange;
use crate::types::Type;
use crate::value::Value;
use crate::Rc;

use alloc::collections::BTreeMap;

/// The declared input variables of a module, keyed by name.
pub type VariableDecls = BTreeMap<Rc<str>, VariableDecl>;

/// The declared attributes of one input variable.
///
/// Declarations are produced by the loader and immutable afterwards. The
/// loader has already validated the load-time invariants: a typed default
/// converts to the declared type, and `nullable = false` excludes a null
/// default.
#[derive(Debug, Clone)]
pub struct VariableDecl {
    name: Rc<str>,
    ty: Type,
    default: Option<Value>,
    nullable: bool,
    decl_range: SourceRange,
}

impl VariableDecl {
    /// `ty` is `Type::Dynamic` for declarations without a type constraint;
    /// variables are nullable unless declared otherwise.
    pub fn new(
        name: impl Into<Rc<str>>,
        ty: Type,
        default: Option<Value>,
        nullable: bool,
        decl_range: SourceRange,
    ) -> Self {
        Self {
            name: name.into(),
            ty,
            default,
            nullable,
            decl_range,
        }
    }

    pub fn name(&self) -> &Rc<str> {
        &self.name
    }

    /// The declared type constraint; `Type::Dynamic` when unconstrained.
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    /// The declared default, verbatim; conversion to the declared type
    /// happens at finalization. A declaration without a default is required.
    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }

    pub fn nullable(&self) -> bool {
        self.nullable
    }

    pub fn decl_range(&self) -> &SourceRange {
        &self.decl_range
    }
}

// Declarations compare on what was declared; where it was declared is
// provenance and stays out of equality.
impl PartialEq for VariableDecl {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.ty == other.ty
            && self.default == other.default
            && self.nullable == other.nullable
    }
}

impl Eq for VariableDecl {}
