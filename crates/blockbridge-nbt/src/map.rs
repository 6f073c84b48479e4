//! Insertion-ordered compound tags.
//!
//! Bedrock reads some compounds positionally (entity property lists are
//! indexed by their order), so [`NbtMap`] keeps keys in insertion order.
//! Maps are immutable once built; use [`NbtMapBuilder`] to make one.

use indexmap::IndexMap;

use crate::{NbtError, TagType, TagValue};

/// An immutable compound tag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NbtMap {
    entries: IndexMap<String, TagValue>,
}

impl NbtMap {
    pub fn builder() -> NbtMapBuilder {
        NbtMapBuilder::default()
    }

    /// Starts a builder pre-filled with this map's entries.
    pub fn to_builder(&self) -> NbtMapBuilder {
        NbtMapBuilder {
            entries: self.entries.clone(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&TagValue> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// String value at `key`. `None` when absent or not a string.
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(TagValue::as_str)
    }

    pub fn get_int(&self, key: &str) -> Option<i32> {
        self.get(key).and_then(TagValue::as_int)
    }

    pub fn get_compound(&self, key: &str) -> Option<&NbtMap> {
        match self.get(key) {
            Some(TagValue::Compound(map)) => Some(map),
            _ => None,
        }
    }

    pub fn get_list(&self, key: &str) -> Option<&[TagValue]> {
        match self.get(key) {
            Some(TagValue::List(items)) => Some(items),
            _ => None,
        }
    }

    /// String value at `key`, failing when it's absent or of another type.
    pub fn require_string(&self, key: &str) -> Result<&str, NbtError> {
        match self.get(key) {
            Some(TagValue::String(s)) => Ok(s),
            Some(other) => Err(NbtError::TypeMismatch {
                key: key.to_owned(),
                expected: TagType::String,
                found: other.tag_type(),
            }),
            None => Err(NbtError::MissingKey(key.to_owned())),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TagValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Mutable builder for [`NbtMap`].
///
/// Putting an existing key replaces its value in place, keeping the key's
/// original position.
#[derive(Debug, Clone, Default)]
pub struct NbtMapBuilder {
    entries: IndexMap<String, TagValue>,
}

impl NbtMapBuilder {
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<TagValue>) -> &mut Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn put_string(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.put(key, TagValue::String(value.into()))
    }

    pub fn put_int(&mut self, key: impl Into<String>, value: i32) -> &mut Self {
        self.put(key, TagValue::Int(value))
    }

    pub fn put_float(&mut self, key: impl Into<String>, value: f32) -> &mut Self {
        self.put(key, TagValue::Float(value))
    }

    pub fn put_byte(&mut self, key: impl Into<String>, value: i8) -> &mut Self {
        self.put(key, TagValue::Byte(value))
    }

    /// Booleans are stored as a byte, `1` or `0`.
    pub fn put_boolean(&mut self, key: impl Into<String>, value: bool) -> &mut Self {
        self.put_byte(key, i8::from(value))
    }

    pub fn put_list(&mut self, key: impl Into<String>, items: Vec<TagValue>) -> &mut Self {
        self.put(key, TagValue::List(items))
    }

    pub fn put_compound(&mut self, key: impl Into<String>, value: NbtMap) -> &mut Self {
        self.put(key, TagValue::Compound(value))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn build(&self) -> NbtMap {
        NbtMap {
            entries: self.entries.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_keep_insertion_order() {
        let map = NbtMap::builder()
            .put_string("z", "last-alphabetically")
            .put_int("a", 1)
            .put_boolean("m", true)
            .build();
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["z", "a", "m"]);
        assert_eq!(map.get("m"), Some(&TagValue::Byte(1)));
    }

    #[test]
    fn test_replacing_keeps_position() {
        let mut builder = NbtMap::builder();
        builder.put_int("a", 1).put_int("b", 2).put_int("a", 3);
        let map = builder.build();
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(map.get_int("a"), Some(3));
    }

    #[test]
    fn test_typed_getters() {
        let inner = NbtMap::builder().put_int("x", 5).build();
        let map = NbtMap::builder()
            .put_string("name", "pool")
            .put_compound("inner", inner.clone())
            .put_list("values", vec!["a".into()])
            .build();
        assert_eq!(map.get_string("name"), Some("pool"));
        assert_eq!(map.get_int("name"), None);
        assert_eq!(map.get_compound("inner"), Some(&inner));
        assert_eq!(map.get_list("values").map(<[TagValue]>::len), Some(1));
    }

    #[test]
    fn test_require_string_errors() {
        let map = NbtMap::builder().put_int("n", 1).build();
        assert!(matches!(
            map.require_string("n"),
            Err(NbtError::TypeMismatch { found: TagType::Int, .. })
        ));
        assert!(matches!(
            map.require_string("absent"),
            Err(NbtError::MissingKey(key)) if key == "absent"
        ));
    }

    #[test]
    fn test_to_builder_extends_copy() {
        let base = NbtMap::builder().put_int("a", 1).build();
        let extended = base.to_builder().put_int("b", 2).build();
        assert_eq!(base.len(), 1);
        assert_eq!(extended.len(), 2);
    }
}
