//! Variant values and their encoded blob form.
//!
//! Default parameter values travel to the builder as an encoded blob: a
//! little-endian `u16` elemental code followed by the payload. Text is a
//! `u32` unit count followed by UTF-16 units.

use crate::vartype::VarType;

/// A constant value: an enum constant or a parameter default.
#[derive(Clone, PartialEq, Debug)]
pub enum VariantValue {
    /// Explicit null (`VT_EMPTY`).
    Empty,
    Bool(bool),
    I1(i8),
    UI1(u8),
    I2(i16),
    UI2(u16),
    I4(i32),
    UI4(u32),
    I8(i64),
    UI8(u64),
    R4(f32),
    R8(f64),
    Bstr(String),
}

/// Automation `true` for a 16-bit boolean.
const VARIANT_TRUE: i16 = -1;

impl VariantValue {
    /// Elemental code of the value.
    pub fn var_type(&self) -> VarType {
        match self {
            VariantValue::Empty => VarType::VT_EMPTY,
            VariantValue::Bool(_) => VarType::VT_BOOL,
            VariantValue::I1(_) => VarType::VT_I1,
            VariantValue::UI1(_) => VarType::VT_UI1,
            VariantValue::I2(_) => VarType::VT_I2,
            VariantValue::UI2(_) => VarType::VT_UI2,
            VariantValue::I4(_) => VarType::VT_I4,
            VariantValue::UI4(_) => VarType::VT_UI4,
            VariantValue::I8(_) => VarType::VT_I8,
            VariantValue::UI8(_) => VarType::VT_UI8,
            VariantValue::R4(_) => VarType::VT_R4,
            VariantValue::R8(_) => VarType::VT_R8,
            VariantValue::Bstr(_) => VarType::VT_BSTR,
        }
    }

    /// Encode into the blob form.
    pub fn encode(&self) -> DefaultValue {
        let mut out = Vec::with_capacity(10);
        out.extend_from_slice(&self.var_type().code().to_le_bytes());
        match self {
            VariantValue::Empty => {}
            VariantValue::Bool(b) => {
                let v = if *b { VARIANT_TRUE } else { 0 };
                out.extend_from_slice(&v.to_le_bytes());
            }
            VariantValue::I1(v) => out.extend_from_slice(&v.to_le_bytes()),
            VariantValue::UI1(v) => out.push(*v),
            VariantValue::I2(v) => out.extend_from_slice(&v.to_le_bytes()),
            VariantValue::UI2(v) => out.extend_from_slice(&v.to_le_bytes()),
            VariantValue::I4(v) => out.extend_from_slice(&v.to_le_bytes()),
            VariantValue::UI4(v) => out.extend_from_slice(&v.to_le_bytes()),
            VariantValue::I8(v) => out.extend_from_slice(&v.to_le_bytes()),
            VariantValue::UI8(v) => out.extend_from_slice(&v.to_le_bytes()),
            VariantValue::R4(v) => out.extend_from_slice(&v.to_le_bytes()),
            VariantValue::R8(v) => out.extend_from_slice(&v.to_le_bytes()),
            VariantValue::Bstr(s) => {
                let units: Vec<u16> = s.encode_utf16().collect();
                #[allow(clippy::cast_possible_truncation)] // default strings are short
                let len = units.len() as u32;
                out.extend_from_slice(&len.to_le_bytes());
                for unit in units {
                    out.extend_from_slice(&unit.to_le_bytes());
                }
            }
        }
        DefaultValue(out.into_boxed_slice())
    }
}

/// An encoded default-value blob.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct DefaultValue(Box<[u8]>);

impl DefaultValue {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Decode the blob; `None` if it is malformed.
    pub fn decode(&self) -> Option<VariantValue> {
        let mut r = Reader(&self.0);
        let vt = VarType::from_code(u16::from_le_bytes(r.take()?))?;
        let value = match vt {
            VarType::VT_EMPTY => VariantValue::Empty,
            VarType::VT_BOOL => VariantValue::Bool(i16::from_le_bytes(r.take()?) != 0),
            VarType::VT_I1 => VariantValue::I1(i8::from_le_bytes(r.take()?)),
            VarType::VT_UI1 => VariantValue::UI1(u8::from_le_bytes(r.take()?)),
            VarType::VT_I2 => VariantValue::I2(i16::from_le_bytes(r.take()?)),
            VarType::VT_UI2 => VariantValue::UI2(u16::from_le_bytes(r.take()?)),
            VarType::VT_I4 => VariantValue::I4(i32::from_le_bytes(r.take()?)),
            VarType::VT_UI4 => VariantValue::UI4(u32::from_le_bytes(r.take()?)),
            VarType::VT_I8 => VariantValue::I8(i64::from_le_bytes(r.take()?)),
            VarType::VT_UI8 => VariantValue::UI8(u64::from_le_bytes(r.take()?)),
            VarType::VT_R4 => VariantValue::R4(f32::from_le_bytes(r.take()?)),
            VarType::VT_R8 => VariantValue::R8(f64::from_le_bytes(r.take()?)),
            VarType::VT_BSTR => {
                let len = u32::from_le_bytes(r.take()?) as usize;
                let mut units = Vec::with_capacity(len);
                for _ in 0..len {
                    units.push(u16::from_le_bytes(r.take()?));
                }
                VariantValue::Bstr(String::from_utf16(&units).ok()?)
            }
            _ => return None,
        };
        r.0.is_empty().then_some(value)
    }
}

struct Reader<'a>(&'a [u8]);

impl Reader<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let (head, rest) = self.0.split_first_chunk::<N>()?;
        self.0 = rest;
        Some(*head)
    }
}
