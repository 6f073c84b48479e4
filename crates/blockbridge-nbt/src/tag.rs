//! Tag types and values.

use std::fmt;

use crate::NbtMap;

/// The type byte that prefixes every tag in an encoded tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagType {
    End,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    String,
    List,
    Compound,
}

impl TagType {
    pub fn id(self) -> u8 {
        match self {
            Self::End => 0,
            Self::Byte => 1,
            Self::Short => 2,
            Self::Int => 3,
            Self::Long => 4,
            Self::Float => 5,
            Self::Double => 6,
            Self::String => 8,
            Self::List => 9,
            Self::Compound => 10,
        }
    }

    /// Byte, int and long arrays (7, 11, 12) never appear in the trees the
    /// bridge builds and are reported as unknown.
    pub fn from_id(id: u8) -> Option<Self> {
        Some(match id {
            0 => Self::End,
            1 => Self::Byte,
            2 => Self::Short,
            3 => Self::Int,
            4 => Self::Long,
            5 => Self::Float,
            6 => Self::Double,
            8 => Self::String,
            9 => Self::List,
            10 => Self::Compound,
            _ => return None,
        })
    }
}

impl fmt::Display for TagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::End => "TAG_End",
            Self::Byte => "TAG_Byte",
            Self::Short => "TAG_Short",
            Self::Int => "TAG_Int",
            Self::Long => "TAG_Long",
            Self::Float => "TAG_Float",
            Self::Double => "TAG_Double",
            Self::String => "TAG_String",
            Self::List => "TAG_List",
            Self::Compound => "TAG_Compound",
        };
        f.write_str(name)
    }
}

/// A single tag value.
///
/// Lists hold values of one type; the encoder rejects mixed lists.
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    List(Vec<TagValue>),
    Compound(NbtMap),
}

impl TagValue {
    pub fn tag_type(&self) -> TagType {
        match self {
            Self::Byte(_) => TagType::Byte,
            Self::Short(_) => TagType::Short,
            Self::Int(_) => TagType::Int,
            Self::Long(_) => TagType::Long,
            Self::Float(_) => TagType::Float,
            Self::Double(_) => TagType::Double,
            Self::String(_) => TagType::String,
            Self::List(_) => TagType::List,
            Self::Compound(_) => TagType::Compound,
        }
    }

    /// Element type of a list: the first element's type, or `End` when empty.
    pub fn list_element_type(items: &[TagValue]) -> TagType {
        items.first().map_or(TagType::End, TagValue::tag_type)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<&str> for TagValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for TagValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i32> for TagValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<f32> for TagValue {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<NbtMap> for TagValue {
    fn from(value: NbtMap) -> Self {
        Self::Compound(value)
    }
}
