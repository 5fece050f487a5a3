//! Dispatch-id assignment.
//!
//! Ids are handed out per member identity (a property's accessors share
//! one identity) in declaration order. The first claimant of an id keeps
//! it; later claimants, including a second claimant of a reserved id, are
//! moved to the smallest free positive id that no later identity asks for.

use rustc_hash::{FxHashMap, FxHashSet};

use tlx_typelib::MEMBERID_NIL;

/// A dispatch id that had to move.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Reassignment {
    /// Position of the identity.
    pub identity: usize,
    pub wanted: i32,
    pub assigned: i32,
}

/// Result of assigning ids to one interface.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct Assignment {
    /// Final id per identity, in identity order.
    pub ids: Vec<i32>,
    pub reassigned: Vec<Reassignment>,
}

/// Assigns dispatch ids within one interface.
#[derive(Clone, Debug)]
pub struct DispIdAssigner {
    first_auto: i32,
    inherited: FxHashSet<i32>,
}

impl DispIdAssigner {
    pub fn new(first_auto: i32) -> Self {
        DispIdAssigner {
            first_auto,
            inherited: FxHashSet::default(),
        }
    }

    /// Ids claimed by members inherited from base interfaces.
    #[must_use]
    pub fn with_inherited(mut self, ids: impl IntoIterator<Item = i32>) -> Self {
        self.inherited.extend(ids);
        self
    }

    /// Assign ids to identities given their explicit requests.
    ///
    /// `MEMBERID_NIL` counts as no request.
    pub fn assign(&self, requested: &[Option<i32>]) -> Assignment {
        let requested: Vec<Option<i32>> = requested
            .iter()
            .map(|r| r.filter(|&id| id != MEMBERID_NIL))
            .collect();

        // Explicit requests not yet processed.
        let mut pending: FxHashMap<i32, usize> = FxHashMap::default();
        for id in requested.iter().flatten() {
            *pending.entry(*id).or_default() += 1;
        }

        let mut claimed = self.inherited.clone();
        let mut out = Assignment::default();
        for (ordinal, request) in requested.iter().enumerate() {
            if let Some(id) = request {
                if let Some(count) = pending.get_mut(id) {
                    *count -= 1;
                    if *count == 0 {
                        pending.remove(id);
                    }
                }
            }

            let auto = self.auto_id(ordinal);
            let (wanted, usable) = match (*request, auto) {
                (Some(id), _) => (id, !claimed.contains(&id)),
                (None, Some(id)) => (id, id > 0 && !claimed.contains(&id)),
                (None, None) => (i32::MAX, false),
            };

            let id = if usable {
                wanted
            } else {
                let free = smallest_free(&claimed, &pending);
                out.reassigned.push(Reassignment {
                    identity: ordinal,
                    wanted,
                    assigned: free,
                });
                free
            };
            claimed.insert(id);
            out.ids.push(id);
        }
        out
    }

    fn auto_id(&self, ordinal: usize) -> Option<i32> {
        i32::try_from(ordinal)
            .ok()
            .and_then(|n| self.first_auto.checked_add(n))
    }
}

fn smallest_free(claimed: &FxHashSet<i32>, pending: &FxHashMap<i32, usize>) -> i32 {
    let mut id = 1;
    while claimed.contains(&id) || pending.contains_key(&id) {
        id += 1;
    }
    id
}
