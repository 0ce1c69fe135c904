use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::entity::Kind;
use crate::model::{
    AnalysisSoftware, Contact, DbSequence, Peptide, PeptideEvidence, Sample, SearchDatabase,
    SpectraData, SpectrumIdentificationItem, SpectrumIdentificationList,
    SpectrumIdentificationProtocol, SpectrumIdentificationResult,
};

/// Identity of one document root.
///
/// Every entity records the context it is attached to; `None` means the
/// entity has not been adopted by a document yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(u64);

impl ContextId {
    /// Issues a context id that no other document in this process holds.
    pub fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        ContextId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx#{}", self.0)
    }
}

/// Typed index of an entity in its document's arena.
///
/// Two handles are equal exactly when they name the same entity object.
pub struct Handle<T> {
    index: u32,
    marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    fn new(index: usize) -> Self {
        Handle {
            index: index as u32,
            marker: PhantomData,
        }
    }

    /// Position of the entity in its arena.
    pub fn index(self) -> usize {
        self.index as usize
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<T> PartialOrd for Handle<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Handle<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.index.cmp(&other.index)
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({})", self.index)
    }
}

/// Append-only storage for the entities of one kind.
///
/// Entities are never removed, so handles stay valid for the life of the
/// arena. Indexing with a handle issued by a different arena panics.
#[derive(Debug, Clone)]
pub struct Arena<T> {
    slots: Vec<T>,
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Arena { slots: Vec::new() }
    }

    /// Stores an entity, returning its handle.
    pub fn alloc(&mut self, value: T) -> Handle<T> {
        self.slots.push(value);
        Handle::new(self.slots.len() - 1)
    }

    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        self.slots.get(handle.index())
    }

    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        self.slots.get_mut(handle.index())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> {
        self.slots.iter().enumerate().map(|(i, v)| (Handle::new(i), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Handle<T>, &mut T)> {
        self.slots.iter_mut().enumerate().map(|(i, v)| (Handle::new(i), v))
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<Handle<T>> for Arena<T> {
    type Output = T;

    fn index(&self, handle: Handle<T>) -> &T {
        &self.slots[handle.index()]
    }
}

impl<T> IndexMut<Handle<T>> for Arena<T> {
    fn index_mut(&mut self, handle: Handle<T>) -> &mut T {
        &mut self.slots[handle.index()]
    }
}

/// Every entity object of one document, one arena per kind.
#[derive(Debug, Default)]
pub struct Arenas {
    pub(crate) contacts: Arena<Contact>,
    pub(crate) software: Arena<AnalysisSoftware>,
    pub(crate) samples: Arena<Sample>,
    pub(crate) databases: Arena<SearchDatabase>,
    pub(crate) spectra_data: Arena<SpectraData>,
    pub(crate) db_sequences: Arena<DbSequence>,
    pub(crate) peptides: Arena<Peptide>,
    pub(crate) evidence: Arena<PeptideEvidence>,
    pub(crate) protocols: Arena<SpectrumIdentificationProtocol>,
    pub(crate) id_lists: Arena<SpectrumIdentificationList>,
    pub(crate) id_results: Arena<SpectrumIdentificationResult>,
    pub(crate) id_items: Arena<SpectrumIdentificationItem>,
}

impl Arenas {
    pub fn get<T: Kind>(&self, handle: Handle<T>) -> Option<&T> {
        T::arena(self).get(handle)
    }

    pub fn get_mut<T: Kind>(&mut self, handle: Handle<T>) -> Option<&mut T> {
        T::arena_mut(self).get_mut(handle)
    }

    pub fn arena<T: Kind>(&self) -> &Arena<T> {
        T::arena(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_stable() {
        let mut arena = Arena::new();
        let a = arena.alloc("first".to_string());
        let b = arena.alloc("second".to_string());
        assert_ne!(a, b);
        assert_eq!(arena[a], "first");
        assert_eq!(arena[b], "second");
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn foreign_handle_is_none() {
        let mut big = Arena::new();
        big.alloc(1u32);
        let h = big.alloc(2u32);
        let small: Arena<u32> = Arena::new();
        assert!(small.get(h).is_none());
    }

    #[test]
    fn contexts_are_unique() {
        let a = ContextId::fresh();
        let b = ContextId::fresh();
        assert_ne!(a, b);
    }
}
