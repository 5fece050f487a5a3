//! Virtual-table layout.
//!
//! Slot `n` of an interface's own functions sits after the reserved
//! base-contract slots and every slot inherited along its local base
//! chain. Offsets are slot numbers times the target pointer size.

use tlx_typelib::{reserved_slots, PointerWidth};

use crate::classify::InterfaceMode;

/// Slot layout of one interface.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct VtableLayout {
    reserved: u32,
    inherited: u32,
    slot_size: u32,
}

impl VtableLayout {
    pub fn new(mode: InterfaceMode, inherited: u32, width: PointerWidth) -> Self {
        VtableLayout {
            reserved: reserved_slots(mode.type_kind(), mode.flags()),
            inherited,
            slot_size: width.bytes(),
        }
    }

    /// First slot available to the interface's own functions.
    pub fn first_slot(&self) -> u32 {
        self.reserved + self.inherited
    }

    /// Byte offset of the `index`-th own function.
    pub fn offset(&self, index: usize) -> u32 {
        let index = u32::try_from(index).unwrap_or(u32::MAX);
        self.first_slot()
            .saturating_add(index)
            .saturating_mul(self.slot_size)
    }
}
