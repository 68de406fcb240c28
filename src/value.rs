// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::number::Number;
use crate::types::Type;
use crate::Rc;

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr as _;

use anyhow::{anyhow, Result};
use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

// Serialization sentinel for unknown values, mirroring how JSON cannot
// express "not yet decided".
const UNKNOWN_TOKEN: &str = "<unknown>";

/// A value in the three-valued model: concrete, null, or unknown.
///
/// Null and unknown carry a [`Type`]: `Value::Null(Type::String)` and
/// `Value::Null(Type::Dynamic)` are different values. Concrete collection
/// values carry enough type information that an empty `list(string)` stays
/// distinguishable from an empty `list(number)`.
///
/// Two values are *raw-equal* (`==`) when they agree on discriminant, type,
/// and payload. Source provenance is never part of a value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Value {
    /// A known absence of a value, of the given type.
    Null(Type),

    /// A placeholder of the given type whose payload will be decided later,
    /// or never if an error occurred.
    Unknown(Type),

    Bool(bool),
    Number(Number),
    String(Rc<str>),

    // Homogeneous collections carry their element type.
    List(Rc<Type>, Rc<Vec<Value>>),
    Set(Rc<Type>, Rc<BTreeSet<Value>>),
    Map(Rc<Type>, Rc<BTreeMap<Rc<str>, Value>>),

    // Fixed-shape collections; their type is implied by their payload.
    Tuple(Rc<Vec<Value>>),
    Object(Rc<BTreeMap<Rc<str>, Value>>),
}

impl Value {
    pub fn null(ty: Type) -> Value {
        Value::Null(ty)
    }

    pub fn unknown(ty: Type) -> Value {
        Value::Unknown(ty)
    }

    pub fn null_dynamic() -> Value {
        Value::Null(Type::Dynamic)
    }

    pub fn unknown_dynamic() -> Value {
        Value::Unknown(Type::Dynamic)
    }

    pub fn list(element: Type, items: Vec<Value>) -> Value {
        Value::List(Rc::new(element), Rc::new(items))
    }

    pub fn empty_list(element: Type) -> Value {
        Value::list(element, Vec::new())
    }

    pub fn set(element: Type, items: BTreeSet<Value>) -> Value {
        Value::Set(Rc::new(element), Rc::new(items))
    }

    pub fn map(element: Type, entries: BTreeMap<Rc<str>, Value>) -> Value {
        Value::Map(Rc::new(element), Rc::new(entries))
    }

    pub fn empty_map(element: Type) -> Value {
        Value::map(element, BTreeMap::new())
    }

    pub fn tuple(items: Vec<Value>) -> Value {
        Value::Tuple(Rc::new(items))
    }

    pub fn object(attributes: BTreeMap<Rc<str>, Value>) -> Value {
        Value::Object(Rc::new(attributes))
    }

    pub fn from_json_str(json: &str) -> Result<Value> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_str(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Value {
    /// The structural type of this value. For null and unknown this is the
    /// carried type; for fixed-shape collections it is computed from the
    /// payload.
    pub fn type_of(&self) -> Type {
        match self {
            Value::Null(ty) | Value::Unknown(ty) => ty.clone(),
            Value::Bool(_) => Type::Bool,
            Value::Number(_) => Type::Number,
            Value::String(_) => Type::String,
            Value::List(element, _) => Type::List {
                element: element.clone(),
            },
            Value::Set(element, _) => Type::Set {
                element: element.clone(),
            },
            Value::Map(element, _) => Type::Map {
                element: element.clone(),
            },
            Value::Tuple(items) => Type::tuple(items.iter().map(Value::type_of).collect()),
            Value::Object(attributes) => Type::object(
                attributes
                    .iter()
                    .map(|(k, v)| (k.clone(), v.type_of()))
                    .collect(),
            ),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null(_))
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Value::Unknown(_))
    }

    pub fn is_known_non_null(&self) -> bool {
        !matches!(self, Value::Null(_) | Value::Unknown(_))
    }

    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Value::Bool(b) => Ok(*b),
            _ => Err(anyhow!("not a bool")),
        }
    }

    pub fn as_number(&self) -> Result<&Number> {
        match self {
            Value::Number(n) => Ok(n),
            _ => Err(anyhow!("not a number")),
        }
    }

    pub fn as_string(&self) -> Result<&Rc<str>> {
        match self {
            Value::String(s) => Ok(s),
            _ => Err(anyhow!("not a string")),
        }
    }

    pub fn as_list(&self) -> Result<&Vec<Value>> {
        match self {
            Value::List(_, items) => Ok(items),
            _ => Err(anyhow!("not a list")),
        }
    }

    pub fn as_set(&self) -> Result<&BTreeSet<Value>> {
        match self {
            Value::Set(_, items) => Ok(items),
            _ => Err(anyhow!("not a set")),
        }
    }

    pub fn as_map(&self) -> Result<&BTreeMap<Rc<str>, Value>> {
        match self {
            Value::Map(_, entries) => Ok(entries),
            _ => Err(anyhow!("not a map")),
        }
    }

    pub fn as_tuple(&self) -> Result<&Vec<Value>> {
        match self {
            Value::Tuple(items) => Ok(items),
            _ => Err(anyhow!("not a tuple")),
        }
    }

    pub fn as_object(&self) -> Result<&BTreeMap<Rc<str>, Value>> {
        match self {
            Value::Object(attributes) => Ok(attributes),
            _ => Err(anyhow!("not an object")),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s.into())
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(Number::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(Number::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(Number::from(n))
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null(_) => serializer.serialize_none(),
            Value::Unknown(_) => serializer.serialize_str(UNKNOWN_TOKEN),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => n.serialize(serializer),
            Value::String(s) => serializer.serialize_str(s.as_ref()),
            Value::List(_, items) | Value::Tuple(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            // Display a set as an array.
            Value::Set(_, items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(_, entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries.iter() {
                    map.serialize_entry(k.as_ref(), v)?;
                }
                map.end()
            }
            Value::Object(attributes) => {
                let mut map = serializer.serialize_map(Some(attributes.len()))?;
                for (k, v) in attributes.iter() {
                    map.serialize_entry(k.as_ref(), v)?;
                }
                map.end()
            }
        }
    }
}

struct ValueVisitor;

// JSON has no types to preserve, so deserialization produces the implied
// shape: null becomes null(any), arrays become tuples, objects become
// objects. A type constraint is applied afterwards by conversion.
impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a value")
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Value::null_dynamic())
    }

    fn visit_bool<E>(self, v: bool) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Value::Bool(v))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Value::from(v))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Value::from(v))
    }

    fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Value::from(v))
    }

    fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Value::String(s.into()))
    }

    fn visit_string<E>(self, s: String) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Value::String(s.into()))
    }

    fn visit_seq<V>(self, mut visitor: V) -> Result<Self::Value, V::Error>
    where
        V: SeqAccess<'de>,
    {
        let mut items = Vec::new();
        while let Some(v) = visitor.next_element()? {
            items.push(v);
        }
        Ok(Value::tuple(items))
    }

    fn visit_map<V>(self, mut visitor: V) -> Result<Self::Value, V::Error>
    where
        V: MapAccess<'de>,
    {
        let mut attributes = BTreeMap::new();
        while let Some((key, value)) = visitor.next_entry::<String, Value>()? {
            attributes.insert(key.into(), value);
        }
        Ok(Value::object(attributes))
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ValueVisitor)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(s) => f.write_str(&s),
            Err(_e) => Err(fmt::Error),
        }
    }
}

impl Value {
    /// Parse a number literal into a number value.
    pub fn number_from_str(s: &str) -> Result<Value> {
        Number::from_str(s)
            .map(Value::Number)
            .map_err(|_| anyhow!("`{s}` is not a number"))
    }
}
