// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::number::Number;
use crate::types::Type;
use crate::value::Value;
use crate::Rc;

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr as _;

/// Why a value could not be converted to a target type.
///
/// Every variant carries the traversal path to the failing element, in the
/// form `.attr[2].other` (empty at the root).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// No conversion exists between the two types.
    Incompatible {
        from: Type,
        to: Type,
        path: String,
    },
    /// A string was given where a number is required, and it does not parse.
    StringToNumber { value: Rc<str>, path: String },
    /// A string was given where a bool is required, and it is not
    /// "true"/"false".
    StringToBool { value: Rc<str>, path: String },
    /// Tuple arities do not match.
    WrongTupleLength {
        expected: usize,
        actual: usize,
        path: String,
    },
    /// The target object type requires an attribute the value lacks.
    MissingAttribute { name: Rc<str>, path: String },
    /// The value carries an attribute the target object type does not allow.
    UnexpectedAttribute { name: Rc<str>, path: String },
    /// Promotion to a homogeneous collection failed because the element
    /// types do not converge.
    NoCommonElementType {
        kind: &'static str,
        path: String,
    },
}

impl ConversionError {
    /// Traversal path to the failing element; empty at the root.
    pub fn path(&self) -> &str {
        match self {
            ConversionError::Incompatible { path, .. }
            | ConversionError::StringToNumber { path, .. }
            | ConversionError::StringToBool { path, .. }
            | ConversionError::WrongTupleLength { path, .. }
            | ConversionError::MissingAttribute { path, .. }
            | ConversionError::UnexpectedAttribute { path, .. }
            | ConversionError::NoCommonElementType { path, .. } => path,
        }
    }
}

fn write_path(f: &mut fmt::Formatter<'_>, path: &str) -> fmt::Result {
    if path.is_empty() {
        Ok(())
    } else {
        write!(f, " at '{path}'")
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionError::Incompatible { from, to, path } => {
                write!(f, "cannot convert {from} to {to}")?;
                write_path(f, path)
            }
            ConversionError::StringToNumber { value, path } => {
                write!(f, "a number is required, got \"{value}\"")?;
                write_path(f, path)
            }
            ConversionError::StringToBool { value, path } => {
                write!(f, "a bool is required, got \"{value}\"")?;
                write_path(f, path)
            }
            ConversionError::WrongTupleLength {
                expected,
                actual,
                path,
            } => {
                write!(
                    f,
                    "a tuple of length {expected} is required, but the value has {actual} elements"
                )?;
                write_path(f, path)
            }
            ConversionError::MissingAttribute { name, path } => {
                write!(f, "attribute \"{name}\" is required")?;
                write_path(f, path)
            }
            ConversionError::UnexpectedAttribute { name, path } => {
                write!(f, "an attribute named \"{name}\" is not expected here")?;
                write_path(f, path)
            }
            ConversionError::NoCommonElementType { kind, path } => {
                write!(f, "all {kind} elements must have the same type")?;
                write_path(f, path)
            }
        }
    }
}

impl core::error::Error for ConversionError {}

/// Convert `value` to the target type `ty`.
///
/// Guarantees:
/// - a dynamic target accepts the value unchanged;
/// - `convert(null(_), T)` is `null(T)` and `convert(unknown(_), T)` is
///   `unknown(T)`;
/// - conversion is the identity on values that already satisfy the target;
/// - on failure the error names the offending element by path.
pub fn convert(value: &Value, ty: &Type) -> Result<Value, ConversionError> {
    convert_path(value, ty, "")
}

fn convert_path(value: &Value, ty: &Type, path: &str) -> Result<Value, ConversionError> {
    // Values that already satisfy the constraint pass through unchanged.
    // This also covers every dynamic target position.
    if value.type_of().conforms_to(ty) {
        return Ok(value.clone());
    }

    // Null and unknown adopt the target type wholesale.
    match value {
        Value::Null(_) => return Ok(Value::Null(ty.clone())),
        Value::Unknown(_) => return Ok(Value::Unknown(ty.clone())),
        _ => {}
    }

    match (value, ty) {
        // Defined primitive coercions.
        (Value::Bool(b), Type::String) => Ok(Value::String(
            if *b { "true" } else { "false" }.into(),
        )),
        (Value::Number(n), Type::String) => Ok(Value::String(n.to_decimal_string().into())),
        (Value::String(s), Type::Number) => match Number::from_str(s) {
            Ok(n) => Ok(Value::Number(n)),
            Err(_) => Err(ConversionError::StringToNumber {
                value: s.clone(),
                path: path.into(),
            }),
        },
        (Value::String(s), Type::Bool) => {
            if s.eq_ignore_ascii_case("true") {
                Ok(Value::Bool(true))
            } else if s.eq_ignore_ascii_case("false") {
                Ok(Value::Bool(false))
            } else {
                Err(ConversionError::StringToBool {
                    value: s.clone(),
                    path: path.into(),
                })
            }
        }

        // Lists convert element-wise; a tuple promotes to a list when every
        // element converges on one element type.
        (Value::List(_, items), Type::List { element })
        | (Value::Tuple(items), Type::List { element }) => {
            let converted = convert_sequence(items, element, path)?;
            let (elem_ty, converted) = settle_elements(converted, element, "list", path)?;
            Ok(Value::List(Rc::new(elem_ty), Rc::new(converted)))
        }

        (Value::Set(_, items), Type::Set { element }) => {
            let items: Vec<Value> = items.iter().cloned().collect();
            let converted = convert_sequence(&items, element, path)?;
            let (elem_ty, converted) = settle_elements(converted, element, "set", path)?;
            Ok(Value::Set(
                Rc::new(elem_ty),
                Rc::new(converted.into_iter().collect::<BTreeSet<Value>>()),
            ))
        }

        // Maps convert entry-wise; an object promotes to a map under the
        // same convergence rule as tuple to list.
        (Value::Map(_, entries), Type::Map { element })
        | (Value::Object(entries), Type::Map { element }) => {
            let converted = convert_entries(entries, element, path)?;
            let (elem_ty, converted) = settle_entries(converted, element, "map", path)?;
            Ok(Value::Map(Rc::new(elem_ty), Rc::new(converted)))
        }

        (Value::Tuple(items), Type::Tuple { elements }) => {
            if items.len() != elements.len() {
                return Err(ConversionError::WrongTupleLength {
                    expected: elements.len(),
                    actual: items.len(),
                    path: path.into(),
                });
            }
            let mut converted = Vec::with_capacity(items.len());
            for (index, (item, elem_ty)) in items.iter().zip(elements.iter()).enumerate() {
                converted.push(convert_path(item, elem_ty, &format!("{path}[{index}]"))?);
            }
            Ok(Value::tuple(converted))
        }

        (Value::Object(attributes), Type::Object { attributes: target }) => {
            for name in attributes.keys() {
                if !target.contains_key(name) {
                    return Err(ConversionError::UnexpectedAttribute {
                        name: name.clone(),
                        path: path.into(),
                    });
                }
            }
            let mut converted = BTreeMap::new();
            for (name, attr_ty) in target.iter() {
                match attributes.get(name) {
                    Some(attr) => {
                        converted.insert(
                            name.clone(),
                            convert_path(attr, attr_ty, &format!("{path}.{name}"))?,
                        );
                    }
                    None => {
                        return Err(ConversionError::MissingAttribute {
                            name: name.clone(),
                            path: path.into(),
                        });
                    }
                }
            }
            Ok(Value::object(converted))
        }

        _ => Err(ConversionError::Incompatible {
            from: value.type_of(),
            to: ty.clone(),
            path: path.into(),
        }),
    }
}

fn convert_sequence(
    items: &[Value],
    element: &Type,
    path: &str,
) -> Result<Vec<Value>, ConversionError> {
    let mut converted = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        converted.push(convert_path(item, element, &format!("{path}[{index}]"))?);
    }
    Ok(converted)
}

fn convert_entries(
    entries: &BTreeMap<Rc<str>, Value>,
    element: &Type,
    path: &str,
) -> Result<BTreeMap<Rc<str>, Value>, ConversionError> {
    let mut converted = BTreeMap::new();
    for (key, item) in entries.iter() {
        converted.insert(
            key.clone(),
            convert_path(item, element, &format!("{path}[\"{key}\"]"))?,
        );
    }
    Ok(converted)
}

// Decide the element type of a homogeneous collection and settle every
// element on it. A fully constrained element target decides the type
// outright and the elements already satisfy it. A target containing `any`
// leaves the decision to the converted elements: their types must unify,
// and each element is then converted once more to the unified type.
fn settle_elements(
    converted: Vec<Value>,
    element: &Type,
    kind: &'static str,
    path: &str,
) -> Result<(Type, Vec<Value>), ConversionError> {
    let unified = match unified_element_type(converted.iter(), element, kind, path)? {
        Some(t) => t,
        None => return Ok((element.clone(), converted)),
    };
    let mut settled = Vec::with_capacity(converted.len());
    for (index, item) in converted.iter().enumerate() {
        settled.push(convert_path(item, &unified, &format!("{path}[{index}]"))?);
    }
    Ok((unified, settled))
}

fn settle_entries(
    converted: BTreeMap<Rc<str>, Value>,
    element: &Type,
    kind: &'static str,
    path: &str,
) -> Result<(Type, BTreeMap<Rc<str>, Value>), ConversionError> {
    let unified = match unified_element_type(converted.values(), element, kind, path)? {
        Some(t) => t,
        None => return Ok((element.clone(), converted)),
    };
    let mut settled = BTreeMap::new();
    for (key, item) in converted.iter() {
        settled.insert(
            key.clone(),
            convert_path(item, &unified, &format!("{path}[\"{key}\"]"))?,
        );
    }
    Ok((unified, settled))
}

fn unified_element_type<'a>(
    mut items: impl Iterator<Item = &'a Value>,
    element: &Type,
    kind: &'static str,
    path: &str,
) -> Result<Option<Type>, ConversionError> {
    if !element.has_dynamic() {
        return Ok(None);
    }
    let mut unified = match items.next() {
        Some(item) => item.type_of(),
        None => return Ok(None),
    };
    for item in items {
        unified = match unified.unify(&item.type_of()) {
            Some(t) => t,
            None => {
                return Err(ConversionError::NoCommonElementType {
                    kind,
                    path: path.into(),
                });
            }
        };
    }
    Ok(Some(unified))
}
