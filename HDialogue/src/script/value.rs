//! Generic script values
//!
//! The parser produces these without any knowledge of what the data means.
//! Tables keep their entries in source order because dialogue cues are
//! stored positionally and their order is the playback order.
//!
//! The serde representation is what the metadata cache writes to disk. It is
//! lossless: tables become arrays of `[key, value]` pairs (so order survives
//! any JSON reader), integer and float values stay distinct, and bare name
//! references are written as `{"$name": "..."}` so they never collide with
//! string literals.

use std::fmt;

use indexmap::IndexMap;
use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq, SerializeTuple};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Marker key used to serialize [`LuaValue::Name`].
const NAME_TAG: &str = "$name";

/// A table key: either a name (`Foo = ...`, `["Foo"] = ...`) or an integer
/// index (positional entries and `[3] = ...`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TableKey {
    Name(String),
    Index(i64),
}

impl TableKey {
    /// The key as a name, if it is one.
    #[must_use]
    pub fn as_name(&self) -> Option<&str> {
        match self {
            TableKey::Name(name) => Some(name),
            TableKey::Index(_) => None,
        }
    }
}

impl fmt::Display for TableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKey::Name(name) => f.write_str(name),
            TableKey::Index(index) => write!(f, "[{index}]"),
        }
    }
}

/// A parsed script value.
#[derive(Debug, Clone, PartialEq)]
pub enum LuaValue {
    Nil,
    Bool(bool),
    Integer(i64),
    Float(f64),
    /// A string literal.
    Str(String),
    /// A bare (possibly dotted) identifier such as `GlobalVoiceLines.HermesLines`.
    /// Left unresolved; consumers decide what it refers to.
    Name(String),
    Table(LuaTable),
}

impl LuaValue {
    /// The value as a string literal.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            LuaValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The value as a table.
    #[must_use]
    pub fn as_table(&self) -> Option<&LuaTable> {
        match self {
            LuaValue::Table(t) => Some(t),
            _ => None,
        }
    }

    /// The value as a number. Numeric strings are accepted, matching how the
    /// game's data occasionally quotes timings.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            LuaValue::Integer(i) => Some(*i as f64),
            LuaValue::Float(f) => Some(*f),
            LuaValue::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        matches!(self, LuaValue::Nil)
    }

    /// Short type name for diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            LuaValue::Nil => "nil",
            LuaValue::Bool(_) => "boolean",
            LuaValue::Integer(_) | LuaValue::Float(_) => "number",
            LuaValue::Str(_) => "string",
            LuaValue::Name(_) => "name",
            LuaValue::Table(_) => "table",
        }
    }
}

/// An ordered script table. Also the top-level result of parsing a file,
/// where each assignment becomes a named entry.
#[derive(Debug, Clone, Default)]
pub struct LuaTable {
    entries: IndexMap<TableKey, LuaValue>,
}

// Order-sensitive, unlike `IndexMap`'s own equality.
impl PartialEq for LuaTable {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len() && self.entries.iter().eq(other.entries.iter())
    }
}

/// The generic parse result handed to the cache and the catalog.
pub type RawTable = LuaTable;

impl LuaTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry. Re-assigning an existing key replaces the value but
    /// keeps the key's original position.
    pub fn insert(&mut self, key: TableKey, value: LuaValue) {
        self.entries.insert(key, value);
    }

    /// Look up a named entry. `nil` values read as absent.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&LuaValue> {
        self.entries
            .get(&TableKey::Name(name.to_string()))
            .filter(|v| !v.is_nil())
    }

    #[must_use]
    pub fn get_index(&self, index: i64) -> Option<&LuaValue> {
        self.entries.get(&TableKey::Index(index)).filter(|v| !v.is_nil())
    }

    /// Named string entry.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(LuaValue::as_str)
    }

    /// Named table entry.
    #[must_use]
    pub fn get_table(&self, name: &str) -> Option<&LuaTable> {
        self.get(name).and_then(LuaValue::as_table)
    }

    /// Named numeric entry.
    #[must_use]
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(LuaValue::as_f64)
    }

    /// All entries in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&TableKey, &LuaValue)> {
        self.entries.iter()
    }

    /// Entries with integer keys, in source order.
    pub fn positional(&self) -> impl Iterator<Item = &LuaValue> {
        self.entries
            .iter()
            .filter(|(k, _)| matches!(k, TableKey::Index(_)))
            .map(|(_, v)| v)
    }

    /// Entries with name keys, in source order.
    pub fn named(&self) -> impl Iterator<Item = (&str, &LuaValue)> {
        self.entries
            .iter()
            .filter_map(|(k, v)| k.as_name().map(|name| (name, v)))
    }

    /// True when every key is an integer index (a plain list).
    #[must_use]
    pub fn is_sequence(&self) -> bool {
        self.entries.keys().all(|k| matches!(k, TableKey::Index(_)))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(TableKey, LuaValue)> for LuaTable {
    fn from_iter<I: IntoIterator<Item = (TableKey, LuaValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

// ==================== Serialization ====================

impl Serialize for TableKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TableKey::Name(name) => serializer.serialize_str(name),
            TableKey::Index(index) => serializer.serialize_i64(*index),
        }
    }
}

impl<'de> Deserialize<'de> for TableKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct KeyVisitor;

        impl Visitor<'_> for KeyVisitor {
            type Value = TableKey;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a string or integer table key")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<TableKey, E> {
                Ok(TableKey::Name(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<TableKey, E> {
                Ok(TableKey::Index(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<TableKey, E> {
                i64::try_from(v)
                    .map(TableKey::Index)
                    .map_err(|_| E::custom(format!("table index {v} out of range")))
            }
        }

        deserializer.deserialize_any(KeyVisitor)
    }
}

/// Serializes a single `[key, value]` pair.
struct Entry<'a>(&'a TableKey, &'a LuaValue);

impl Serialize for Entry<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(self.0)?;
        tuple.serialize_element(self.1)?;
        tuple.end()
    }
}

impl Serialize for LuaTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            seq.serialize_element(&Entry(key, value))?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for LuaTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match LuaValue::deserialize(deserializer)? {
            LuaValue::Table(table) => Ok(table),
            other => Err(de::Error::custom(format!(
                "expected a table, found {}",
                other.type_name()
            ))),
        }
    }
}

impl Serialize for LuaValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LuaValue::Nil => serializer.serialize_unit(),
            LuaValue::Bool(b) => serializer.serialize_bool(*b),
            LuaValue::Integer(i) => serializer.serialize_i64(*i),
            LuaValue::Float(f) => serializer.serialize_f64(*f),
            LuaValue::Str(s) => serializer.serialize_str(s),
            LuaValue::Name(name) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(NAME_TAG, name)?;
                map.end()
            }
            LuaValue::Table(table) => table.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for LuaValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = LuaValue;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a script value")
            }

            fn visit_unit<E: de::Error>(self) -> Result<LuaValue, E> {
                Ok(LuaValue::Nil)
            }

            fn visit_none<E: de::Error>(self) -> Result<LuaValue, E> {
                Ok(LuaValue::Nil)
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<LuaValue, E> {
                Ok(LuaValue::Bool(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<LuaValue, E> {
                Ok(LuaValue::Integer(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<LuaValue, E> {
                i64::try_from(v)
                    .map(LuaValue::Integer)
                    .map_err(|_| E::custom(format!("integer {v} out of range")))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<LuaValue, E> {
                Ok(LuaValue::Float(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<LuaValue, E> {
                Ok(LuaValue::Str(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<LuaValue, E> {
                Ok(LuaValue::Str(v))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<LuaValue, A::Error> {
                let mut entries = IndexMap::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some((key, value)) = seq.next_element::<(TableKey, LuaValue)>()? {
                    entries.insert(key, value);
                }
                Ok(LuaValue::Table(LuaTable { entries }))
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<LuaValue, A::Error> {
                let Some((tag, name)) = map.next_entry::<String, String>()? else {
                    return Err(de::Error::custom("empty object is not a script value"));
                };
                if tag != NAME_TAG {
                    return Err(de::Error::unknown_field(&tag, &[NAME_TAG]));
                }
                if map.next_key::<String>()?.is_some() {
                    return Err(de::Error::custom("name reference object has extra fields"));
                }
                Ok(LuaValue::Name(name))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}
