use core::fmt;

use crate::error::UuidError;

/// Data objects exchanged between the host and control methods.
#[derive(Clone, PartialEq, Eq, Default)]
pub enum Value {
    /// What a method without a `Return` evaluates to.
    #[default]
    Uninitialized,
    Integer(u64),
    String(String),
    Buffer(Vec<u8>),
    Package(Vec<Value>),
}

impl Value {
    pub fn as_integer(&self) -> Option<u64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Uninitialized => f.write_str("Uninitialized"),
            Value::Integer(v) => write!(f, "Integer(0x{v:X})"),
            Value::String(s) => write!(f, "String({s:?})"),
            Value::Buffer(bytes) => {
                f.write_str("Buffer{")?;
                for (i, b) in bytes.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "0x{b:02X}")?;
                }
                f.write_str("}")
            }
            Value::Package(items) => f.debug_list().entries(items).finish(),
        }
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Integer(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Buffer(bytes)
    }
}

impl From<&[u8]> for Value {
    fn from(bytes: &[u8]) -> Self {
        Value::Buffer(bytes.to_vec())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Package(items)
    }
}

/// Converts a textual UUID into the 16-byte buffer produced by ASL `ToUUID`.
///
/// The first three groups are stored little-endian, the last two in string
/// order: `a486d8f8-0bda-471b-a72b-6042a6b5bee0` becomes
/// `F8 D8 86 A4 DA 0B 1B 47 A7 2B 60 42 A6 B5 BE E0`.
pub fn to_uuid(text: &str) -> Result<[u8; 16], UuidError> {
    let malformed = || UuidError::Malformed(text.to_owned());

    let groups: Vec<&str> = text.trim().split('-').collect();
    let widths = [8, 4, 4, 4, 12];
    if groups.len() != widths.len()
        || groups
            .iter()
            .zip(widths)
            .any(|(g, w)| g.len() != w || !g.bytes().all(|b| b.is_ascii_hexdigit()))
    {
        return Err(malformed());
    }

    let hex: String = groups.concat();
    let mut raw = [0u8; 16];
    for (i, byte) in raw.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).map_err(|_| malformed())?;
    }

    let mut out = raw;
    out[0..4].copy_from_slice(&[raw[3], raw[2], raw[1], raw[0]]);
    out[4..6].copy_from_slice(&[raw[5], raw[4]]);
    out[6..8].copy_from_slice(&[raw[7], raw[6]]);
    Ok(out)
}
