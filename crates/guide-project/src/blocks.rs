//! Block arena
//!
//! Decodes a target's `blocks` dictionary into typed [`Block`] values indexed
//! by id. Every field is checked at this boundary: anything with an
//! unexpected shape decodes to "absent" rather than failing the target.
//!
//! Input encoding follows the SB3 format:
//! - `[1, value]` unobscured shadow
//! - `[2, value]` no shadow
//! - `[3, value, shadow]` reporter obscuring a shadow
//!
//! where `value` is a block id, `null`, or a primitive array
//! `[code, value, ...]`.

use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Primitive value embedded directly in an input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Primitive {
    /// Codes 4 to 8: number, positive number, whole number, integer, angle
    Number(String),
    /// Code 9
    Color(String),
    /// Code 10
    Text(String),
    /// Code 11
    Broadcast(String),
    /// Code 12
    Variable(String),
    /// Code 13
    List(String),
}

impl Primitive {
    fn decode(raw: &[Value]) -> Option<Self> {
        let code = raw.first()?.as_u64()?;
        let value = raw.get(1).map(scalar_text).unwrap_or_default();
        let primitive = match code {
            4..=8 => Self::Number(value),
            9 => Self::Color(value),
            10 => Self::Text(value),
            11 => Self::Broadcast(value),
            12 => Self::Variable(value),
            13 => Self::List(value),
            _ => return None,
        };
        Some(primitive)
    }
}

/// Value in an input slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputValue {
    /// Reference to another block
    Block(String),
    /// Inline literal
    Primitive(Primitive),
}

impl InputValue {
    fn decode(raw: &Value) -> Option<Self> {
        match raw {
            Value::String(id) => Some(Self::Block(id.clone())),
            Value::Array(items) => Primitive::decode(items).map(Self::Primitive),
            _ => None,
        }
    }
}

/// Decoded input slot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Input {
    /// Value shown in the slot
    pub value: Option<InputValue>,
    /// Shadow underneath an obscuring reporter
    pub shadow: Option<InputValue>,
}

impl Input {
    fn decode(raw: &Value) -> Self {
        let Some(items) = raw.as_array() else {
            return Self::default();
        };

        let value = items.get(1).and_then(InputValue::decode);
        let shadow = items.get(2).and_then(InputValue::decode);
        Self { value, shadow }
    }

    /// Value to render: the visible value, else the shadow
    #[inline]
    #[must_use]
    pub fn effective(&self) -> Option<&InputValue> {
        self.value.as_ref().or(self.shadow.as_ref())
    }

    /// Referenced block id, if the slot holds a block
    #[must_use]
    pub fn block_id(&self) -> Option<&str> {
        match self.effective()? {
            InputValue::Block(id) => Some(id),
            InputValue::Primitive(_) => None,
        }
    }
}

/// Custom-block mutation data
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mutation {
    /// Text with `%s`, `%n`, `%b` placeholders
    pub proccode: String,
    /// Argument ids, in placeholder order
    pub argument_ids: Vec<String>,
    /// Argument display names, in placeholder order
    pub argument_names: Vec<String>,
}

impl Mutation {
    fn decode(raw: &Value) -> Option<Self> {
        let obj = raw.as_object()?;
        Some(Self {
            proccode: obj
                .get("proccode")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            argument_ids: string_list(obj.get("argumentids")),
            argument_names: string_list(obj.get("argumentnames")),
        })
    }
}

/// One decoded block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Opcode token
    pub opcode: String,
    /// Next block in the stack
    pub next: Option<String>,
    /// Enclosing block
    pub parent: Option<String>,
    /// Whether the block starts a stack
    pub top_level: bool,
    /// Whether the block is a shadow
    pub shadow: bool,
    /// Inputs in manifest order
    pub inputs: IndexMap<String, Input>,
    /// Field values in manifest order
    pub fields: IndexMap<String, String>,
    /// Custom-block mutation
    pub mutation: Option<Mutation>,
}

impl Block {
    fn decode(obj: &Map<String, Value>) -> Option<Self> {
        let opcode = obj.get("opcode")?.as_str()?.to_string();

        let inputs = obj
            .get("inputs")
            .and_then(Value::as_object)
            .map(|m| {
                m.iter()
                    .map(|(k, v)| (k.clone(), Input::decode(v)))
                    .collect()
            })
            .unwrap_or_default();

        let fields = obj
            .get("fields")
            .and_then(Value::as_object)
            .map(|m| {
                m.iter()
                    .map(|(k, v)| {
                        let value = v
                            .as_array()
                            .and_then(|a| a.first())
                            .map(scalar_text)
                            .unwrap_or_default();
                        (k.clone(), value)
                    })
                    .collect()
            })
            .unwrap_or_default();

        Some(Self {
            opcode,
            next: obj.get("next").and_then(Value::as_str).map(str::to_owned),
            parent: obj.get("parent").and_then(Value::as_str).map(str::to_owned),
            top_level: obj.get("topLevel").and_then(Value::as_bool).unwrap_or(false),
            shadow: obj.get("shadow").and_then(Value::as_bool).unwrap_or(false),
            inputs,
            fields,
            mutation: obj.get("mutation").and_then(Mutation::decode),
        })
    }

    /// Look up an input
    #[inline]
    #[must_use]
    pub fn input(&self, name: &str) -> Option<&Input> {
        self.inputs.get(name)
    }

    /// Look up a field value
    #[inline]
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// Blocks of one target, indexed by id in manifest order
#[derive(Debug, Clone, Default)]
pub struct BlockArena {
    blocks: IndexMap<String, Block>,
    raw_count: usize,
}

impl BlockArena {
    /// Decode a `blocks` dictionary
    ///
    /// Array entries (loose variable/list reporters) and entries without an
    /// opcode are counted but not stored.
    #[must_use]
    pub fn from_value(raw: Option<&Value>) -> Self {
        let Some(map) = raw.and_then(Value::as_object) else {
            return Self::default();
        };

        let blocks = map
            .iter()
            .filter_map(|(id, v)| {
                let block = Block::decode(v.as_object()?)?;
                Some((id.clone(), block))
            })
            .collect();

        Self {
            blocks,
            raw_count: map.len(),
        }
    }

    /// Look up a block by id
    #[inline]
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Block> {
        self.blocks.get(id)
    }

    /// Iterate decoded blocks in manifest order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Block)> {
        self.blocks.iter().map(|(id, b)| (id.as_str(), b))
    }

    /// Number of decoded blocks
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Check if no block decoded
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Number of raw entries, including ones that did not decode
    #[inline]
    #[must_use]
    pub fn raw_count(&self) -> usize {
        self.raw_count
    }

    /// First `limit` opcodes in manifest order
    #[must_use]
    pub fn opcode_sample(&self, limit: usize) -> Vec<String> {
        self.blocks
            .values()
            .take(limit)
            .map(|b| b.opcode.clone())
            .collect()
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Mutation lists are stored either as JSON text or as real arrays
fn string_list(raw: Option<&Value>) -> Vec<String> {
    let parsed;
    let items = match raw {
        Some(Value::Array(items)) => items,
        Some(Value::String(text)) => {
            parsed = serde_json::from_str::<Value>(text).unwrap_or(Value::Null);
            match &parsed {
                Value::Array(items) => items,
                _ => return Vec::new(),
            }
        }
        _ => return Vec::new(),
    };

    items.iter().map(scalar_text).collect()
}
