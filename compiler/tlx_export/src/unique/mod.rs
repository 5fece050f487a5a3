//! Library-wide name uniqueness.
//!
//! A type library has one flat, case-insensitive namespace shared by type
//! names and enum constants. [`NameRegistry`] hands out names in unit
//! order before any descriptor exists:
//!
//! - the first type to use a name keeps it
//! - on the first collision both the holder and the newcomer are renamed
//!   to `<Namespace>_<Name>` (dots become underscores), and the plain name
//!   stays blocked
//! - later colliders are prefixed on arrival
//! - a name that still collides gets `_2`, `_3`, ... appended

use rustc_hash::FxHashMap;

use tlx_diagnostic::{Diagnostic, DiagnosticQueue, ErrorCode};
use tlx_meta::TypeId;
use tlx_typelib::name_key;

/// A type asking for a library name.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct TypeCandidate {
    pub id: TypeId,
    pub namespace: String,
    /// `Namespace.Name`, for diagnostics.
    pub qualified: String,
    /// The mapped (aliased) name the type would like.
    pub name: String,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum Slot {
    /// Held by the candidate at this position.
    Type(usize),
    /// Two types wanted this plain name; nobody gets it.
    Collided,
    /// Taken by a renamed type, class interface or constant.
    Reserved,
}

/// Assigns unique names across one library.
#[derive(Debug, Default)]
pub struct NameRegistry {
    slots: FxHashMap<String, Slot>,
    candidates: Vec<TypeCandidate>,
    assigned: FxHashMap<TypeId, String>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type, renaming it (and an earlier holder) on collision.
    pub fn add_type(&mut self, candidate: TypeCandidate, diagnostics: &mut DiagnosticQueue) {
        let key = name_key(&candidate.name);
        let pos = self.candidates.len();
        match self.slots.get(&key).copied() {
            None => {
                self.slots.insert(key, Slot::Type(pos));
                self.assigned.insert(candidate.id, candidate.name.clone());
                self.candidates.push(candidate);
            }
            Some(Slot::Type(holder)) => {
                self.slots.insert(key, Slot::Collided);
                self.candidates.push(candidate);
                self.prefix(holder, diagnostics);
                self.prefix(pos, diagnostics);
            }
            Some(Slot::Collided | Slot::Reserved) => {
                self.candidates.push(candidate);
                self.prefix(pos, diagnostics);
            }
        }
    }

    fn prefix(&mut self, pos: usize, diagnostics: &mut DiagnosticQueue) {
        let Some(candidate) = self.candidates.get(pos) else {
            return;
        };
        let wanted = if candidate.namespace.is_empty() {
            candidate.name.clone()
        } else {
            format!("{}_{}", candidate.namespace.replace('.', "_"), candidate.name)
        };
        let (id, qualified, original) = (
            candidate.id,
            candidate.qualified.clone(),
            candidate.name.clone(),
        );
        let name = self.claim(&wanted);
        tracing::debug!(ty = %qualified, from = %original, to = %name, "type renamed");
        diagnostics.add(
            Diagnostic::note(ErrorCode::W5001)
                .with_subject(qualified)
                .with_message(format!("exported as `{name}`"))
                .with_note(format!("`{original}` is used by more than one exported type")),
        );
        self.assigned.insert(id, name);
    }

    /// Claim `wanted`, or the first free `wanted_N`, and return it.
    fn claim(&mut self, wanted: &str) -> String {
        let mut name = wanted.to_owned();
        let mut n = 2u32;
        while self.slots.contains_key(&name_key(&name)) {
            name = format!("{wanted}_{n}");
            n += 1;
        }
        self.slots.insert(name_key(&name), Slot::Reserved);
        name
    }

    /// Reserve a name for a class interface or an enum constant.
    ///
    /// Returns the name actually reserved; when it differs from `wanted`
    /// a diagnostic with `code` is recorded against `subject`.
    pub fn reserve(
        &mut self,
        subject: &str,
        wanted: &str,
        code: ErrorCode,
        diagnostics: &mut DiagnosticQueue,
    ) -> String {
        let name = self.claim(wanted);
        if name != wanted {
            tracing::debug!(subject, from = wanted, to = %name, "name disambiguated");
            diagnostics.add(
                Diagnostic::note(code)
                    .with_subject(subject)
                    .with_message(format!("exported as `{name}`"))
                    .with_note(format!("`{wanted}` is already used in this library")),
            );
        }
        name
    }

    /// The name assigned to a registered type.
    pub fn type_name(&self, id: TypeId) -> Option<&str> {
        self.assigned.get(&id).map(String::as_str)
    }
}

#[cfg(test)]
mod tests;
