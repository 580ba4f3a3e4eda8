//! Metadata store
//!
//! Associates typed records with a controller type under a named slot. The
//! store is built during setup, written while controllers are annotated and
//! only read afterwards, so it is passed by reference instead of living in a
//! global.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

/// Identity of a controller type
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassId {
    type_id: TypeId,
    name: &'static str,
}

impl ClassId {
    pub fn of<C: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<C>(),
            name: std::any::type_name::<C>(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Slot a record is stored under
///
/// Mapping records and controller options live in separate slots so that the
/// two are never confused for the same class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// `Vec<MappingRecord<C>>`
    Mappings,
    /// `ControllerOptions`
    Options,
    /// Extension slots for host plugins
    Custom(&'static str),
}

/// Keyed store of per-class metadata
#[derive(Default)]
pub struct MetadataStore {
    entries: HashMap<(Slot, ClassId), Box<dyn Any + Send + Sync>>,
}

impl MetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` at `(slot, class)`, replacing whatever was there
    pub fn define<T: Any + Send + Sync>(&mut self, slot: Slot, class: ClassId, value: T) {
        self.entries.insert((slot, class), Box::new(value));
    }

    /// Read the value at `(slot, class)`
    ///
    /// Returns `None` when nothing was defined or the stored value is not a `T`.
    pub fn get<T: Any>(&self, slot: Slot, class: ClassId) -> Option<&T> {
        self.entries
            .get(&(slot, class))
            .and_then(|value| value.downcast_ref::<T>())
    }

    /// Remove and return the value at `(slot, class)`
    pub fn take<T: Any>(&mut self, slot: Slot, class: ClassId) -> Option<T> {
        let value = self.entries.remove(&(slot, class))?;
        match value.downcast::<T>() {
            Ok(value) => Some(*value),
            Err(value) => {
                // Wrong type requested, put it back untouched
                self.entries.insert((slot, class), value);
                None
            }
        }
    }

    pub fn contains(&self, slot: Slot, class: ClassId) -> bool {
        self.entries.contains_key(&(slot, class))
    }

    /// Classes that have at least one record in `slot`
    pub fn classes(&self, slot: Slot) -> Vec<ClassId> {
        self.entries
            .keys()
            .filter(|(s, _)| *s == slot)
            .map(|(_, class)| *class)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for MetadataStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Users;
    struct Orders;

    #[test]
    fn test_define_overwrites() {
        let mut store = MetadataStore::new();
        store.define(Slot::Options, ClassId::of::<Users>(), 1u32);
        store.define(Slot::Options, ClassId::of::<Users>(), 2u32);

        assert_eq!(store.get::<u32>(Slot::Options, ClassId::of::<Users>()), Some(&2));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_slots_and_classes_are_independent() {
        let mut store = MetadataStore::new();
        store.define(Slot::Mappings, ClassId::of::<Users>(), vec!["index"]);
        store.define(Slot::Options, ClassId::of::<Users>(), "prefix");

        assert!(store.get::<Vec<&str>>(Slot::Mappings, ClassId::of::<Orders>()).is_none());
        assert_eq!(
            store.get::<&str>(Slot::Options, ClassId::of::<Users>()),
            Some(&"prefix")
        );
        assert_eq!(store.classes(Slot::Mappings), vec![ClassId::of::<Users>()]);
    }

    #[test]
    fn test_get_with_wrong_type_is_absent() {
        let mut store = MetadataStore::new();
        store.define(Slot::Custom("flag"), ClassId::of::<Users>(), true);

        assert!(store.get::<String>(Slot::Custom("flag"), ClassId::of::<Users>()).is_none());
        assert!(store.take::<String>(Slot::Custom("flag"), ClassId::of::<Users>()).is_none());
        assert_eq!(
            store.take::<bool>(Slot::Custom("flag"), ClassId::of::<Users>()),
            Some(true)
        );
        assert!(store.is_empty());
    }
}
