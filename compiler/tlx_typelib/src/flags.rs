//! Descriptor flag sets.
//!
//! Bit values are those of the automation runtime so a committed library
//! can be serialized without translation.

use bitflags::bitflags;

bitflags! {
    /// Type-level flags.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct TypeFlags: u16 {
        /// Instances can be created by clients.
        const CANCREATE = 0x0002;
        const HIDDEN = 0x0010;
        /// Interface supports both dynamic and direct binding.
        const DUAL = 0x0040;
        /// Types are restricted to automation-compatible signatures.
        const OLEAUTOMATION = 0x0100;
        const RESTRICTED = 0x0200;
        /// Interface derives from the dynamic-invocation contract.
        const DISPATCHABLE = 0x1000;
    }
}

bitflags! {
    /// Flags on a class's (or interface's) implemented-type slot.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct ImplTypeFlags: u8 {
        const DEFAULT = 0x1;
        /// Outgoing (event) interface.
        const SOURCE = 0x2;
        const RESTRICTED = 0x4;
    }
}

bitflags! {
    /// Parameter direction and option flags.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct ParamFlags: u8 {
        const IN = 0x01;
        const OUT = 0x02;
        const RETVAL = 0x08;
        const OPT = 0x10;
        /// A default-value blob is attached.
        const HASDEFAULT = 0x20;
    }
}

bitflags! {
    /// Function-level flags.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct FuncFlags: u16 {
        const RESTRICTED = 0x0001;
        const SOURCE = 0x0002;
        const HIDDEN = 0x0040;
    }
}

bitflags! {
    /// Variable-level flags.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct VarFlags: u16 {
        const READONLY = 0x0001;
        const HIDDEN = 0x0040;
        const RESTRICTED = 0x0080;
    }
}
