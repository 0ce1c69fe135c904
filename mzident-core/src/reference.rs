use crate::arena::{Arenas, Handle};
use crate::entity::{Entity, Kind};
use crate::value_eq::{mix, ValueEq, SEED};

/// Resolves identifiers to entity handles.
pub trait Lookup<T> {
    fn find(&self, id: &str) -> Option<Handle<T>>;
}

/// A reference field: persisted as a textual identifier, navigated as a
/// direct link once resolved.
///
/// In the resolved state the identifier is read from the target, so the
/// link and the text cannot disagree.
#[derive(Debug, Clone)]
pub enum Ref<T> {
    Unset,
    /// Identifier known, target not found (yet).
    IdOnly(String),
    Resolved(Handle<T>),
}

impl<T> Default for Ref<T> {
    fn default() -> Self {
        Ref::Unset
    }
}

impl<T> Ref<T> {
    /// An unresolved reference; an empty identifier gives `Unset`.
    pub fn by_id(id: impl Into<String>) -> Self {
        let id = id.into();
        if id.is_empty() {
            Ref::Unset
        } else {
            Ref::IdOnly(id)
        }
    }

    pub fn to(handle: Handle<T>) -> Self {
        Ref::Resolved(handle)
    }

    pub fn is_set(&self) -> bool {
        !matches!(self, Ref::Unset)
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Ref::Resolved(_))
    }

    /// The target handle, if resolved.
    pub fn get(&self) -> Option<Handle<T>> {
        match self {
            Ref::Resolved(handle) => Some(*handle),
            _ => None,
        }
    }

    /// Sets the identifier, resolving it right away when a lookup is given.
    pub fn assign_id(&mut self, id: &str, lookup: Option<&dyn Lookup<T>>) {
        *self = Ref::by_id(id);
        if let Some(lookup) = lookup {
            self.resolve(lookup);
        }
    }

    pub fn assign(&mut self, handle: Handle<T>) {
        *self = Ref::Resolved(handle);
    }

    /// Tries to resolve an identifier-only reference.
    ///
    /// Returns true when the reference changed to resolved.
    pub fn resolve(&mut self, lookup: &dyn Lookup<T>) -> bool {
        let Ref::IdOnly(id) = self else {
            return false;
        };
        match lookup.find(id) {
            Some(handle) => {
                *self = Ref::Resolved(handle);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        *self = Ref::Unset;
    }
}

impl<T: Kind> Ref<T> {
    /// The identifier: the target's current one when resolved.
    pub fn id<'a>(&'a self, arenas: &'a Arenas) -> Option<&'a str> {
        match self {
            Ref::Unset => None,
            Ref::IdOnly(id) => Some(id.as_str()),
            Ref::Resolved(handle) => arenas.get(*handle).and_then(Entity::id),
        }
    }

    pub fn target<'a>(&self, arenas: &'a Arenas) -> Option<&'a T> {
        self.get().and_then(|handle| arenas.get(handle))
    }
}

impl<T: Kind> ValueEq for Handle<T> {
    fn value_eq(&self, other: &Self, arenas: &Arenas) -> bool {
        if self == other {
            return true;
        }
        match (arenas.get(*self), arenas.get(*other)) {
            (Some(a), Some(b)) => a.value_eq(b, arenas),
            _ => false,
        }
    }

    fn value_hash(&self, arenas: &Arenas) -> u64 {
        arenas.get(*self).map_or(SEED, |entity| entity.value_hash(arenas))
    }
}

/// References compare by target content. Unresolved references compare by
/// identifier text and never equal a resolved one.
impl<T: Kind> ValueEq for Ref<T> {
    fn value_eq(&self, other: &Self, arenas: &Arenas) -> bool {
        match (self, other) {
            (Ref::Unset, Ref::Unset) => true,
            (Ref::IdOnly(a), Ref::IdOnly(b)) => a == b,
            (Ref::Resolved(a), Ref::Resolved(b)) => a.value_eq(b, arenas),
            _ => false,
        }
    }

    fn value_hash(&self, arenas: &Arenas) -> u64 {
        match self {
            Ref::Unset => mix(SEED, 0),
            Ref::IdOnly(id) => mix(mix(SEED, 1), id.value_hash(arenas)),
            Ref::Resolved(handle) => mix(mix(SEED, 2), handle.value_hash(arenas)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SearchDatabase;

    struct Table(Vec<(String, Handle<SearchDatabase>)>);

    impl Lookup<SearchDatabase> for Table {
        fn find(&self, id: &str) -> Option<Handle<SearchDatabase>> {
            self.0.iter().find(|(k, _)| k == id).map(|(_, h)| *h)
        }
    }

    fn database(arenas: &mut Arenas, id: &str, location: &str) -> Handle<SearchDatabase> {
        arenas.databases.alloc(SearchDatabase {
            id: Some(id.to_string()),
            location: location.to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn empty_id_is_unset() {
        let r: Ref<SearchDatabase> = Ref::by_id("");
        assert!(!r.is_set());
        let mut r = Ref::<SearchDatabase>::by_id("DB1");
        r.assign_id("", None);
        assert!(!r.is_set());
    }

    #[test]
    fn assign_id_resolves_when_found() {
        let mut arenas = Arenas::default();
        let db = database(&mut arenas, "DB1", "uniprot.fasta");
        let table = Table(vec![("DB1".into(), db)]);

        let mut r: Ref<SearchDatabase> = Ref::default();
        r.assign_id("DB1", Some(&table));
        assert_eq!(r.get(), Some(db));

        let mut missing: Ref<SearchDatabase> = Ref::default();
        missing.assign_id("DB2", Some(&table));
        assert!(!missing.is_resolved());
        assert_eq!(missing.id(&arenas), Some("DB2"));
    }

    #[test]
    fn resolved_id_follows_target() {
        let mut arenas = Arenas::default();
        let db = database(&mut arenas, "DB1", "uniprot.fasta");
        let r = Ref::to(db);
        arenas.databases[db].id = Some("SearchDB_0".into());
        assert_eq!(r.id(&arenas), Some("SearchDB_0"));
        assert_eq!(r.target(&arenas).map(|d| d.location.as_str()), Some("uniprot.fasta"));
    }

    #[test]
    fn late_resolution() {
        let mut arenas = Arenas::default();
        let mut r: Ref<SearchDatabase> = Ref::by_id("DB1");
        assert!(!r.resolve(&Table(Vec::new())));
        let db = database(&mut arenas, "DB1", "uniprot.fasta");
        assert!(r.resolve(&Table(vec![("DB1".into(), db)])));
        assert!(!r.resolve(&Table(Vec::new())));
        assert_eq!(r.get(), Some(db));
    }

    #[test]
    fn equality_follows_content() {
        let mut arenas = Arenas::default();
        let a = database(&mut arenas, "DB1", "uniprot.fasta");
        let b = database(&mut arenas, "DB2", "uniprot.fasta");
        let c = database(&mut arenas, "DB3", "other.fasta");

        assert!(Ref::to(a).value_eq(&Ref::to(b), &arenas));
        assert_eq!(Ref::to(a).value_hash(&arenas), Ref::to(b).value_hash(&arenas));
        assert!(!Ref::to(a).value_eq(&Ref::to(c), &arenas));
        assert!(!Ref::to(a).value_eq(&Ref::by_id("DB1"), &arenas));
        assert!(Ref::<SearchDatabase>::by_id("X").value_eq(&Ref::by_id("X"), &arenas));
    }
}
