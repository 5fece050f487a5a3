//! Error codes for all exporter diagnostics.
//!
//! Each code is a unique identifier (e.g., `W2001`) whose first digit
//! indicates the export phase. The numeric part is stable across releases
//! and is what upstream callers match on.

use std::fmt;

/// Error codes for all exporter diagnostics.
///
/// Format: `E####` for fatal conditions, `W####` for recoverable ones.
/// - E0xxx: Source unit loading
/// - E1xxx: Library structure / target builder
/// - W2xxx: Elemental type mapping
/// - W3xxx: Reference resolution
/// - W4xxx: Dispatch layout
/// - W5xxx: Naming
/// - E9xxx: Internal exporter errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub enum ErrorCode {
    // Unit Errors (E0xxx)
    /// Source unit cannot be loaded
    E0001,
    /// Required type is absent from the source unit
    E0002,

    // Structural Errors (E1xxx)
    /// Duplicate library identity
    E1001,
    /// Duplicate type identity
    E1002,
    /// Type-library builder rejected a call
    E1003,

    // Mapping Warnings (W2xxx)
    /// Member excluded: unmappable parameter or return type
    W2001,
    /// Record field excluded: unmappable field type
    W2002,
    /// Enum constant excluded: value does not fit the target constant width
    W2003,

    // Reference Warnings (W3xxx)
    /// Reference to an unresolvable type replaced by the generic object
    W3001,
    /// Implemented interface skipped: no descriptor available
    W3002,
    /// Explicit default interface cannot be resolved
    W3003,
    /// Enum reference degraded to its underlying integer
    W3004,
    /// Dependent library generated on demand
    W3005,

    // Layout Warnings (W4xxx)
    /// Dispatch id reassigned after a collision
    W4001,

    // Naming Warnings (W5xxx)
    /// Type name disambiguated with its namespace
    W5001,
    /// Enum constant name disambiguated
    W5002,

    // Internal Errors (E9xxx)
    /// Internal exporter error (invariant violation)
    E9001,
}

impl ErrorCode {
    /// All error codes, for iteration and documentation.
    pub const ALL: &'static [ErrorCode] = &[
        ErrorCode::E0001,
        ErrorCode::E0002,
        ErrorCode::E1001,
        ErrorCode::E1002,
        ErrorCode::E1003,
        ErrorCode::W2001,
        ErrorCode::W2002,
        ErrorCode::W2003,
        ErrorCode::W3001,
        ErrorCode::W3002,
        ErrorCode::W3003,
        ErrorCode::W3004,
        ErrorCode::W3005,
        ErrorCode::W4001,
        ErrorCode::W5001,
        ErrorCode::W5002,
        ErrorCode::E9001,
    ];

    /// Get the code as a string (e.g., "W2001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "E0001",
            ErrorCode::E0002 => "E0002",
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::W2001 => "W2001",
            ErrorCode::W2002 => "W2002",
            ErrorCode::W2003 => "W2003",
            ErrorCode::W3001 => "W3001",
            ErrorCode::W3002 => "W3002",
            ErrorCode::W3003 => "W3003",
            ErrorCode::W3004 => "W3004",
            ErrorCode::W3005 => "W3005",
            ErrorCode::W4001 => "W4001",
            ErrorCode::W5001 => "W5001",
            ErrorCode::W5002 => "W5002",
            ErrorCode::E9001 => "E9001",
        }
    }

    /// The stable numeric code (e.g., `2001` for `W2001`).
    ///
    /// Numeric ranges of fatal and recoverable codes never overlap, so the
    /// number alone identifies the code.
    pub fn number(&self) -> u32 {
        self.as_str()[1..]
            .bytes()
            .fold(0, |acc, b| acc * 10 + u32::from(b - b'0'))
    }

    /// Look up a code by its numeric value.
    pub fn from_number(number: u32) -> Option<ErrorCode> {
        Self::ALL.iter().copied().find(|code| code.number() == number)
    }

    /// Check if this code denotes a fatal condition (`E` prefix).
    pub fn is_fatal(&self) -> bool {
        self.as_str().starts_with('E')
    }

    /// Check if this is a warning code (`W` prefix).
    pub fn is_warning(&self) -> bool {
        self.as_str().starts_with('W')
    }

    /// Check if this is an elemental mapping warning (W2xxx range).
    pub fn is_mapping_warning(&self) -> bool {
        matches!(self, ErrorCode::W2001 | ErrorCode::W2002 | ErrorCode::W2003)
    }

    /// Check if this is a reference resolution warning (W3xxx range).
    pub fn is_reference_warning(&self) -> bool {
        matches!(
            self,
            ErrorCode::W3001
                | ErrorCode::W3002
                | ErrorCode::W3003
                | ErrorCode::W3004
                | ErrorCode::W3005
        )
    }

    /// Check if this is a naming warning (W5xxx range).
    pub fn is_naming_warning(&self) -> bool {
        matches!(self, ErrorCode::W5001 | ErrorCode::W5002)
    }

    /// Short human-readable summary of the code.
    pub fn summary(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "source unit cannot be loaded",
            ErrorCode::E0002 => "required type is absent",
            ErrorCode::E1001 => "duplicate library identity",
            ErrorCode::E1002 => "duplicate type identity",
            ErrorCode::E1003 => "type-library builder rejected a call",
            ErrorCode::W2001 => "member excluded: unmappable type",
            ErrorCode::W2002 => "record field excluded: unmappable type",
            ErrorCode::W2003 => "enum constant excluded: value out of range",
            ErrorCode::W3001 => "unresolvable reference replaced by generic object",
            ErrorCode::W3002 => "implemented interface skipped",
            ErrorCode::W3003 => "explicit default interface cannot be resolved",
            ErrorCode::W3004 => "enum reference degraded to underlying integer",
            ErrorCode::W3005 => "dependent library generated",
            ErrorCode::W4001 => "dispatch id reassigned",
            ErrorCode::W5001 => "type name disambiguated",
            ErrorCode::W5002 => "enum constant name disambiguated",
            ErrorCode::E9001 => "internal exporter error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests;
