use std::fmt::Debug;

use crate::arena::{Arena, Arenas, ContextId, Handle};
use crate::collection::Collection;
use crate::document::{Document, Registries};
use crate::value_eq::ValueEq;

/// A document entity: optional identifier plus a back-reference to the
/// document root it is attached to.
pub trait Entity: ValueEq + Debug + Clone + 'static {
    /// Kind name used in diagnostics and construction errors.
    const KIND: &'static str;

    fn id(&self) -> Option<&str>;

    fn set_id(&mut self, id: Option<String>);

    fn context(&self) -> Option<ContextId>;

    /// Sets the context of this entity and of values it owns inline.
    fn attach(&mut self, context: Option<ContextId>);
}

/// An entity kind with its own arena in [`Arenas`].
pub trait Kind: Entity {
    fn arena(arenas: &Arenas) -> &Arena<Self>;

    fn arena_mut(arenas: &mut Arenas) -> &mut Arena<Self>;

    /// Attaches the entity at `handle` and everything it owns through nested
    /// collections.
    fn attach_tree(handle: Handle<Self>, context: Option<ContextId>, arenas: &mut Arenas) {
        if let Some(entity) = Self::arena_mut(arenas).get_mut(handle) {
            entity.attach(context);
        }
    }

    /// Re-attempts resolution of every identifier-only reference field.
    ///
    /// Returns how many fields became resolved.
    fn resolve_refs(&mut self, _doc: &Document) -> usize {
        0
    }
}

/// A kind with a top-level registry in the document root.
pub trait Registered: Kind {
    fn registry(registries: &Registries) -> &Collection<Self>;

    fn registry_mut(registries: &mut Registries) -> &mut Collection<Self>;
}

/// Implements [`Entity`] for a struct with `id` and `context` fields.
macro_rules! impl_entity {
    ($ty:ty, $kind:literal) => {
        impl $crate::entity::Entity for $ty {
            const KIND: &'static str = $kind;

            fn id(&self) -> Option<&str> {
                self.id.as_deref()
            }

            fn set_id(&mut self, id: Option<String>) {
                self.id = id;
            }

            fn context(&self) -> Option<$crate::arena::ContextId> {
                self.context
            }

            fn attach(&mut self, context: Option<$crate::arena::ContextId>) {
                self.context = context;
            }
        }
    };
}

/// Expands to the arena accessors of a [`Kind`] impl.
macro_rules! arena_access {
    ($field:ident) => {
        fn arena(arenas: &$crate::arena::Arenas) -> &$crate::arena::Arena<Self> {
            &arenas.$field
        }

        fn arena_mut(arenas: &mut $crate::arena::Arenas) -> &mut $crate::arena::Arena<Self> {
            &mut arenas.$field
        }
    };
}

/// Implements [`Registered`] against one field of `Registries`.
macro_rules! impl_registered {
    ($ty:ty, $field:ident) => {
        impl $crate::entity::Registered for $ty {
            fn registry(
                registries: &$crate::document::Registries,
            ) -> &$crate::collection::Collection<Self> {
                &registries.$field
            }

            fn registry_mut(
                registries: &mut $crate::document::Registries,
            ) -> &mut $crate::collection::Collection<Self> {
                &mut registries.$field
            }
        }
    };
}

pub(crate) use {arena_access, impl_entity, impl_registered};
