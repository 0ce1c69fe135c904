use indexmap::IndexMap;

use crate::arena::{Arenas, ContextId, Handle};
use crate::entity::{Entity, Kind};
use crate::value_eq::{multiset_eq, multiset_hash, ValueEq};

/// An ordered list of owned entities with an optional identifier index.
///
/// Members are handles into the owning document's arenas. Adding a member
/// attaches it (and whatever it owns) to the collection's context. The index,
/// when active, maps each identifier to the first member that carried it.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    members: Vec<Handle<T>>,
    index: Option<IndexMap<String, Handle<T>>>,
    context: Option<ContextId>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Collection {
            members: Vec::new(),
            index: None,
            context: None,
        }
    }
}

impl<T: Kind> Collection<T> {
    pub fn new(context: Option<ContextId>) -> Self {
        Collection {
            context,
            ..Default::default()
        }
    }

    /// Creates a collection with an active, empty index.
    pub fn indexed(context: Option<ContextId>) -> Self {
        Collection {
            index: Some(IndexMap::new()),
            context,
            ..Default::default()
        }
    }

    pub fn context(&self) -> Option<ContextId> {
        self.context
    }

    /// Appends a member and attaches it to this collection's context.
    pub fn add(&mut self, handle: Handle<T>, arenas: &mut Arenas) {
        if let Some(index) = &mut self.index {
            if let Some(id) = arenas.get(handle).and_then(Entity::id) {
                if index.contains_key(id) {
                    log::warn!("{} id {id:?} already indexed; keeping the first", T::KIND);
                } else {
                    index.insert(id.to_string(), handle);
                }
            }
        }
        T::attach_tree(handle, self.context, arenas);
        self.members.push(handle);
    }

    pub fn add_range(&mut self, handles: impl IntoIterator<Item = Handle<T>>, arenas: &mut Arenas) {
        for handle in handles {
            self.add(handle, arenas);
        }
    }

    /// (Re)builds the identifier index from the current members.
    ///
    /// Returns how many members were shadowed by an earlier member with the
    /// same identifier.
    pub fn build_index(&mut self, arenas: &Arenas) -> usize {
        let mut index = IndexMap::new();
        let mut shadowed = 0;
        for &handle in &self.members {
            let Some(id) = arenas.get(handle).and_then(Entity::id) else {
                continue;
            };
            if index.contains_key(id) {
                log::warn!("{} id {id:?} is shadowed by an earlier member", T::KIND);
                shadowed += 1;
            } else {
                index.insert(id.to_string(), handle);
            }
        }
        self.index = Some(index);
        shadowed
    }

    pub fn drop_index(&mut self) {
        self.index = None;
    }

    pub fn is_indexed(&self) -> bool {
        self.index.is_some()
    }

    /// Finds a member by identifier: indexed lookup when active, otherwise
    /// the first member in order.
    ///
    /// An index hit is checked against the member's current identifier; a
    /// stale hit or a miss falls back to the scan, so members renamed in
    /// place are still found under their new identifier only.
    pub fn find_by_id(&self, id: &str, arenas: &Arenas) -> Option<Handle<T>> {
        let hit = self.index.as_ref().and_then(|index| index.get(id).copied());
        match hit {
            Some(h) if arenas.get(h).and_then(Entity::id) == Some(id) => Some(h),
            _ => self.scan(id, arenas),
        }
    }

    fn scan(&self, id: &str, arenas: &Arenas) -> Option<Handle<T>> {
        self.members
            .iter()
            .copied()
            .find(|&h| arenas.get(h).and_then(Entity::id) == Some(id))
    }

    /// Re-homes the collection and every member subtree.
    pub fn set_context(&mut self, context: Option<ContextId>, arenas: &mut Arenas) {
        self.context = context;
        for &handle in &self.members {
            T::attach_tree(handle, context, arenas);
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Handle<T>> + '_ {
        self.members.iter().copied()
    }

    pub fn handles(&self) -> &[Handle<T>] {
        &self.members
    }

    /// Iterates the member entities in order.
    pub fn entities<'a>(&'a self, arenas: &'a Arenas) -> impl Iterator<Item = &'a T> + 'a {
        self.members.iter().filter_map(move |&h| arenas.get(h))
    }

    pub fn contains(&self, handle: Handle<T>) -> bool {
        self.members.contains(&handle)
    }

    /// Removes every member. An active index stays active and empty.
    pub fn clear(&mut self) {
        self.members.clear();
        if let Some(index) = &mut self.index {
            index.clear();
        }
    }
}

impl<T: Kind> ValueEq for Collection<T> {
    fn value_eq(&self, other: &Self, arenas: &Arenas) -> bool {
        let lhs: Vec<&T> = self.entities(arenas).collect();
        let rhs: Vec<&T> = other.entities(arenas).collect();
        multiset_eq(&lhs, &rhs, arenas)
    }

    fn value_hash(&self, arenas: &Arenas) -> u64 {
        multiset_hash(self.entities(arenas).map(|e| e.value_hash(arenas)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SpectraData;

    fn spectra(arenas: &mut Arenas, id: &str, location: &str) -> Handle<SpectraData> {
        arenas.spectra_data.alloc(SpectraData {
            id: Some(id.to_string()),
            location: location.to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn index_is_first_write_wins() {
        let mut arenas = Arenas::default();
        let a = spectra(&mut arenas, "SID_1", "a.mgf");
        let b = spectra(&mut arenas, "SID_1", "b.mgf");
        let mut collection = Collection::new(None);
        collection.add_range([a, b], &mut arenas);

        assert_eq!(collection.build_index(&arenas), 1);
        assert_eq!(collection.find_by_id("SID_1", &arenas), Some(a));
        // Idempotent.
        assert_eq!(collection.build_index(&arenas), 1);
        assert_eq!(collection.find_by_id("SID_1", &arenas), Some(a));
    }

    #[test]
    fn linear_scan_without_index() {
        let mut arenas = Arenas::default();
        let a = spectra(&mut arenas, "SID_1", "a.mgf");
        let b = spectra(&mut arenas, "SID_2", "b.mgf");
        let mut collection = Collection::new(None);
        collection.add_range([a, b], &mut arenas);

        assert!(!collection.is_indexed());
        assert_eq!(collection.find_by_id("SID_2", &arenas), Some(b));
        assert_eq!(collection.find_by_id("SID_3", &arenas), None);
    }

    #[test]
    fn active_index_tracks_adds() {
        let mut arenas = Arenas::default();
        let mut collection = Collection::indexed(None);
        let a = spectra(&mut arenas, "SID_1", "a.mgf");
        collection.add(a, &mut arenas);
        assert_eq!(collection.find_by_id("SID_1", &arenas), Some(a));

        collection.drop_index();
        assert!(!collection.is_indexed());
        assert_eq!(collection.find_by_id("SID_1", &arenas), Some(a));
    }

    #[test]
    fn add_attaches_and_set_context_rehomes() {
        let mut arenas = Arenas::default();
        let ctx = ContextId::fresh();
        let a = spectra(&mut arenas, "SID_1", "a.mgf");
        let mut collection = Collection::new(Some(ctx));
        collection.add(a, &mut arenas);
        assert_eq!(arenas.spectra_data[a].context, Some(ctx));

        let other = ContextId::fresh();
        collection.set_context(Some(other), &mut arenas);
        assert_eq!(collection.context(), Some(other));
        assert_eq!(arenas.spectra_data[a].context, Some(other));
    }

    #[test]
    fn equality_ignores_order_and_ids() {
        let mut arenas = Arenas::default();
        let a1 = spectra(&mut arenas, "x", "a.mgf");
        let b1 = spectra(&mut arenas, "y", "b.mgf");
        let a2 = spectra(&mut arenas, "SID_0", "a.mgf");
        let b2 = spectra(&mut arenas, "SID_1", "b.mgf");
        let mut left = Collection::new(None);
        left.add_range([a1, b1], &mut arenas);
        let mut right = Collection::new(None);
        right.add_range([b2, a2], &mut arenas);

        assert!(left.value_eq(&right, &arenas));
        assert_eq!(left.value_hash(&arenas), right.value_hash(&arenas));

        arenas.spectra_data[b2].location = "c.mgf".to_string();
        assert!(!left.value_eq(&right, &arenas));
    }

    #[test]
    fn clear_keeps_index_active() {
        let mut arenas = Arenas::default();
        let a = spectra(&mut arenas, "SID_1", "a.mgf");
        let mut collection = Collection::indexed(None);
        collection.add(a, &mut arenas);
        collection.clear();
        assert!(collection.is_empty());
        assert!(collection.is_indexed());
        assert_eq!(collection.find_by_id("SID_1", &arenas), None);
    }

    #[test]
    fn in_place_rename_is_seen_by_lookup() {
        let mut arenas = Arenas::default();
        let a = spectra(&mut arenas, "SID_1", "a.mgf");
        let mut collection = Collection::indexed(None);
        collection.add(a, &mut arenas);

        arenas.spectra_data[a].id = Some("renamed".to_string());
        assert_eq!(collection.find_by_id("renamed", &arenas), Some(a));
        assert_eq!(collection.find_by_id("SID_1", &arenas), None);
    }
}
