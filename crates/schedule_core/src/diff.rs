use crate::Slot;

/// Return every slot of `current` that has no equal slot in `previous`, in `current` order.
///
/// Matching is per element: a slot repeated in `current` is dropped entirely as soon as
/// `previous` holds it once, and kept entirely (duplicates included) when it does not.
pub fn diff(current: &[Slot], previous: &[Slot]) -> Vec<Slot> {
    current
        .iter()
        .filter(|slot| !previous.contains(slot))
        .copied()
        .collect()
}
