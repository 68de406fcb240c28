// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::Rc;

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use serde::{Deserialize, Serialize};

/// Structural type of a value.
///
/// `Dynamic` is the top type (written `any` in declarations): it matches any
/// concrete type on conversion and propagates through containers. Collection
/// types are homogeneous (`list`, `set`, `map`) or heterogeneous with fixed
/// shape (`tuple`, `object`). Object and map keys are strings; key ordering
/// is canonical because fields live in ordered maps.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(tag = "type")]
#[serde(rename_all = "camelCase")]
pub enum Type {
    /// The `any` type.
    Dynamic,
    Bool,
    Number,
    String,

    // Homogeneous collections.
    List { element: Rc<Type> },
    Set { element: Rc<Type> },
    Map { element: Rc<Type> },

    // Fixed-shape collections.
    Tuple { elements: Rc<Vec<Type>> },
    Object { attributes: Rc<BTreeMap<Rc<str>, Type>> },
}

impl Type {
    pub fn list(element: Type) -> Type {
        Type::List {
            element: Rc::new(element),
        }
    }

    pub fn set(element: Type) -> Type {
        Type::Set {
            element: Rc::new(element),
        }
    }

    pub fn map(element: Type) -> Type {
        Type::Map {
            element: Rc::new(element),
        }
    }

    pub fn tuple(elements: Vec<Type>) -> Type {
        Type::Tuple {
            elements: Rc::new(elements),
        }
    }

    pub fn object(attributes: BTreeMap<Rc<str>, Type>) -> Type {
        Type::Object {
            attributes: Rc::new(attributes),
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, Type::Dynamic)
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Bool | Type::Number | Type::String)
    }

    pub fn is_collection(&self) -> bool {
        matches!(
            self,
            Type::List { .. }
                | Type::Set { .. }
                | Type::Map { .. }
                | Type::Tuple { .. }
                | Type::Object { .. }
        )
    }

    /// True if `Dynamic` occurs anywhere within this type.
    pub fn has_dynamic(&self) -> bool {
        match self {
            Type::Dynamic => true,
            Type::Bool | Type::Number | Type::String => false,
            Type::List { element } | Type::Set { element } | Type::Map { element } => {
                element.has_dynamic()
            }
            Type::Tuple { elements } => elements.iter().any(Type::has_dynamic),
            Type::Object { attributes } => attributes.values().any(Type::has_dynamic),
        }
    }

    /// Element type of a homogeneous collection.
    pub fn element_type(&self) -> Option<&Type> {
        match self {
            Type::List { element } | Type::Set { element } | Type::Map { element } => Some(element),
            _ => None,
        }
    }

    pub fn tuple_types(&self) -> Option<&Vec<Type>> {
        match self {
            Type::Tuple { elements } => Some(elements),
            _ => None,
        }
    }

    pub fn object_types(&self) -> Option<&BTreeMap<Rc<str>, Type>> {
        match self {
            Type::Object { attributes } => Some(attributes),
            _ => None,
        }
    }

    /// True if a value of type `self` already satisfies the constraint
    /// `constraint` without any coercion. `Dynamic` in the constraint
    /// matches anything at that position.
    pub fn conforms_to(&self, constraint: &Type) -> bool {
        match (self, constraint) {
            (_, Type::Dynamic) => true,
            (Type::List { element: a }, Type::List { element: b })
            | (Type::Set { element: a }, Type::Set { element: b })
            | (Type::Map { element: a }, Type::Map { element: b }) => a.conforms_to(b),
            (Type::Tuple { elements: a }, Type::Tuple { elements: b }) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.conforms_to(y))
            }
            (Type::Object { attributes: a }, Type::Object { attributes: b }) => {
                a.len() == b.len()
                    && a.iter().zip(b.iter()).all(|((ka, ta), (kb, tb))| {
                        ka == kb && ta.conforms_to(tb)
                    })
            }
            (a, b) => a == b,
        }
    }

    /// Smallest common type of `self` and `other`, if one exists.
    ///
    /// `Dynamic` unifies with anything, yielding the other side. Primitives
    /// unify through the lossless coercions: bool and number both render as
    /// strings, so either paired with `string` unifies to `string`.
    /// Collections of the same kind unify element-wise; tuples must agree on
    /// arity and objects on key set. Used when promoting a tuple to a list
    /// (or an object to a map) whose element type is unconstrained.
    pub fn unify(&self, other: &Type) -> Option<Type> {
        match (self, other) {
            (Type::Dynamic, t) | (t, Type::Dynamic) => Some(t.clone()),
            (Type::Number, Type::String)
            | (Type::String, Type::Number)
            | (Type::Bool, Type::String)
            | (Type::String, Type::Bool) => Some(Type::String),
            (Type::List { element: a }, Type::List { element: b }) => {
                Some(Type::list(a.unify(b)?))
            }
            (Type::Set { element: a }, Type::Set { element: b }) => Some(Type::set(a.unify(b)?)),
            (Type::Map { element: a }, Type::Map { element: b }) => Some(Type::map(a.unify(b)?)),
            (Type::Tuple { elements: a }, Type::Tuple { elements: b }) if a.len() == b.len() => {
                let elements = a
                    .iter()
                    .zip(b.iter())
                    .map(|(x, y)| x.unify(y))
                    .collect::<Option<Vec<_>>>()?;
                Some(Type::tuple(elements))
            }
            (Type::Object { attributes: a }, Type::Object { attributes: b })
                if a.len() == b.len() =>
            {
                let mut attributes = BTreeMap::new();
                for ((ka, ta), (kb, tb)) in a.iter().zip(b.iter()) {
                    if ka != kb {
                        return None;
                    }
                    attributes.insert(ka.clone(), ta.unify(tb)?);
                }
                Some(Type::object(attributes))
            }
            (a, b) if a == b => Some(a.clone()),
            _ => None,
        }
    }
}

// Renders the constraint syntax used in diagnostics:
// `any`, `string`, `list(string)`, `tuple([string, number])`,
// `object({name=string})`.
impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Dynamic => f.write_str("any"),
            Type::Bool => f.write_str("bool"),
            Type::Number => f.write_str("number"),
            Type::String => f.write_str("string"),
            Type::List { element } => write!(f, "list({element})"),
            Type::Set { element } => write!(f, "set({element})"),
            Type::Map { element } => write!(f, "map({element})"),
            Type::Tuple { elements } => {
                let inner: Vec<String> = elements.iter().map(|t| alloc::format!("{t}")).collect();
                write!(f, "tuple([{}])", inner.join(", "))
            }
            Type::Object { attributes } => {
                let inner: Vec<String> = attributes
                    .iter()
                    .map(|(k, t)| alloc::format!("{k}={t}"))
                    .collect();
                write!(f, "object({{{}}})", inner.join(", "))
            }
        }
    }
}
