//! Elemental type codes.
//!
//! The numeric values are the automation runtime's `VARENUM` codes and are
//! part of the committed format.

use std::fmt;

/// Elemental type code of a type descriptor.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
#[repr(u16)]
#[allow(non_camel_case_types)] // runtime spelling
pub enum VarType {
    VT_EMPTY = 0,
    VT_I2 = 2,
    VT_I4 = 3,
    VT_R4 = 4,
    VT_R8 = 5,
    VT_CY = 6,
    VT_DATE = 7,
    VT_BSTR = 8,
    VT_DISPATCH = 9,
    VT_ERROR = 10,
    VT_BOOL = 11,
    VT_VARIANT = 12,
    VT_UNKNOWN = 13,
    VT_DECIMAL = 14,
    VT_I1 = 16,
    VT_UI1 = 17,
    VT_UI2 = 18,
    VT_UI4 = 19,
    VT_I8 = 20,
    VT_UI8 = 21,
    VT_INT = 22,
    VT_UINT = 23,
    VT_VOID = 24,
    VT_HRESULT = 25,
    VT_PTR = 26,
    VT_SAFEARRAY = 27,
    VT_CARRAY = 28,
    VT_USERDEFINED = 29,
    VT_LPSTR = 30,
    VT_LPWSTR = 31,
}

impl VarType {
    const ALL: [VarType; 30] = [
        VarType::VT_EMPTY,
        VarType::VT_I2,
        VarType::VT_I4,
        VarType::VT_R4,
        VarType::VT_R8,
        VarType::VT_CY,
        VarType::VT_DATE,
        VarType::VT_BSTR,
        VarType::VT_DISPATCH,
        VarType::VT_ERROR,
        VarType::VT_BOOL,
        VarType::VT_VARIANT,
        VarType::VT_UNKNOWN,
        VarType::VT_DECIMAL,
        VarType::VT_I1,
        VarType::VT_UI1,
        VarType::VT_UI2,
        VarType::VT_UI4,
        VarType::VT_I8,
        VarType::VT_UI8,
        VarType::VT_INT,
        VarType::VT_UINT,
        VarType::VT_VOID,
        VarType::VT_HRESULT,
        VarType::VT_PTR,
        VarType::VT_SAFEARRAY,
        VarType::VT_CARRAY,
        VarType::VT_USERDEFINED,
        VarType::VT_LPSTR,
        VarType::VT_LPWSTR,
    ];

    /// The numeric code.
    #[inline]
    pub const fn code(self) -> u16 {
        self as u16
    }

    /// Look a code up by its numeric value.
    pub fn from_code(code: u16) -> Option<VarType> {
        Self::ALL.iter().copied().find(|vt| vt.code() == code)
    }

    /// Whether the code wraps another descriptor.
    pub const fn is_composite(self) -> bool {
        matches!(
            self,
            VarType::VT_PTR | VarType::VT_SAFEARRAY | VarType::VT_CARRAY | VarType::VT_USERDEFINED
        )
    }

    /// Whether the code is a fixed-width integer.
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            VarType::VT_I1
                | VarType::VT_UI1
                | VarType::VT_I2
                | VarType::VT_UI2
                | VarType::VT_I4
                | VarType::VT_UI4
                | VarType::VT_I8
                | VarType::VT_UI8
                | VarType::VT_INT
                | VarType::VT_UINT
        )
    }

    /// Whether values of this code are interface pointers.
    pub const fn is_object(self) -> bool {
        matches!(self, VarType::VT_UNKNOWN | VarType::VT_DISPATCH)
    }

    /// Whether the code may appear as a safe-array element.
    ///
    /// C strings, raw pointers, C arrays and `void` have no safe-array form.
    pub const fn is_safearray_element(self) -> bool {
        !matches!(
            self,
            VarType::VT_EMPTY
                | VarType::VT_VOID
                | VarType::VT_HRESULT
                | VarType::VT_PTR
                | VarType::VT_SAFEARRAY
                | VarType::VT_CARRAY
                | VarType::VT_LPSTR
                | VarType::VT_LPWSTR
        )
    }

    /// IDL spelling, used when rendering descriptors.
    pub const fn idl_name(self) -> &'static str {
        match self {
            VarType::VT_EMPTY => "empty",
            VarType::VT_I2 => "short",
            VarType::VT_I4 => "long",
            VarType::VT_R4 => "single",
            VarType::VT_R8 => "double",
            VarType::VT_CY => "CURRENCY",
            VarType::VT_DATE => "DATE",
            VarType::VT_BSTR => "BSTR",
            VarType::VT_DISPATCH => "IDispatch*",
            VarType::VT_ERROR => "SCODE",
            VarType::VT_BOOL => "VARIANT_BOOL",
            VarType::VT_VARIANT => "VARIANT",
            VarType::VT_UNKNOWN => "IUnknown*",
            VarType::VT_DECIMAL => "DECIMAL",
            VarType::VT_I1 => "char",
            VarType::VT_UI1 => "unsigned char",
            VarType::VT_UI2 => "unsigned short",
            VarType::VT_UI4 => "unsigned long",
            VarType::VT_I8 => "int64",
            VarType::VT_UI8 => "uint64",
            VarType::VT_INT => "int",
            VarType::VT_UINT => "unsigned int",
            VarType::VT_VOID => "void",
            VarType::VT_HRESULT => "HRESULT",
            VarType::VT_PTR => "*",
            VarType::VT_SAFEARRAY => "SAFEARRAY",
            VarType::VT_CARRAY => "[]",
            VarType::VT_USERDEFINED => "user-defined",
            VarType::VT_LPSTR => "LPSTR",
            VarType::VT_LPWSTR => "LPWSTR",
        }
    }
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.idl_name())
    }
}
