//! Explicit marshaling overrides.
//!
//! A [`MarshalAs`] attached to a parameter, return value or field forces a
//! specific native representation instead of the default one (a boolean
//! carried as a 16-bit integer, text carried as a narrow C string, an array
//! carried as a flat pointer instead of a safe array).

/// Native representation requested by a marshaling override.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NativeType {
    /// 4-byte platform boolean.
    Bool,
    /// 2-byte automation boolean.
    VariantBool,
    I1,
    U1,
    I2,
    U2,
    I4,
    U4,
    I8,
    U8,
    R4,
    R8,
    /// Platform-sized signed integer.
    SysInt,
    /// Platform-sized unsigned integer.
    SysUInt,
    /// Status code.
    Error,
    /// Fixed-point currency.
    Currency,
    /// Automation string.
    BStr,
    /// Narrow C string.
    LPStr,
    /// Wide C string.
    LPWStr,
    /// Platform-default C string.
    LPTStr,
    IUnknown,
    IDispatch,
    Interface,
    Struct,
    SafeArray,
    /// Flat pointer to the first element.
    LPArray,
    /// Inline fixed-size array (fields only).
    ByValArray,
}

/// An explicit marshaling override.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarshalAs {
    pub native: NativeType,
    /// Representation of array elements (arrays only).
    pub array_sub_type: Option<NativeType>,
    /// Element count for inline fixed-size arrays.
    pub size_const: Option<u32>,
}

impl MarshalAs {
    pub const fn new(native: NativeType) -> Self {
        MarshalAs {
            native,
            array_sub_type: None,
            size_const: None,
        }
    }

    #[must_use]
    pub const fn with_sub_type(mut self, sub: NativeType) -> Self {
        self.array_sub_type = Some(sub);
        self
    }

    #[must_use]
    pub const fn with_size(mut self, size: u32) -> Self {
        self.size_const = Some(size);
        self
    }

    /// The override to apply to array elements, if one was given.
    pub fn element(&self) -> Option<MarshalAs> {
        self.array_sub_type.map(MarshalAs::new)
    }
}

impl From<NativeType> for MarshalAs {
    fn from(native: NativeType) -> Self {
        MarshalAs::new(native)
    }
}
