use std::collections::HashMap;

use rtti_core::{Reflect, RttiError, StableId, Type, fatal};

/// An explicitly owned collection of descriptors, indexed by id and name.
///
/// Nothing is registered implicitly: the owner decides which descriptors go
/// in, and the repository iterates them in registration order.
#[derive(Debug, Default)]
pub struct Repository {
    types: Vec<&'static Type>,
    by_id: HashMap<StableId, usize>,
    by_name: HashMap<&'static str, usize>,
}

impl Repository {
    /// An empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a descriptor.
    ///
    /// Fails with [`RttiError::DuplicateId`] if it is already present,
    /// [`RttiError::IdCollision`] if a different name hashes to the same id
    /// and [`RttiError::DuplicateName`] if its name is taken by another id.
    pub fn try_register(&mut self, ty: &'static Type) -> Result<(), RttiError> {
        if let Some(&index) = self.by_id.get(&ty.id()) {
            let existing = self.types[index];
            return Err(if existing.name() == ty.name() {
                RttiError::DuplicateId {
                    id: ty.id(),
                    name: ty.name(),
                }
            } else {
                RttiError::IdCollision {
                    id: ty.id(),
                    existing: existing.name(),
                    incoming: ty.name(),
                }
            });
        }
        if self.by_name.contains_key(ty.name()) {
            return Err(RttiError::DuplicateName { name: ty.name() });
        }

        let index = self.types.len();
        self.types.push(ty);
        self.by_id.insert(ty.id(), index);
        self.by_name.insert(ty.name(), index);
        crate::debug!("registered {} ({})", ty.name(), ty.id());
        Ok(())
    }

    /// Adds a descriptor, panicking on duplicates and id collisions.
    #[track_caller]
    pub fn register(&mut self, ty: &'static Type) {
        if let Err(err) = self.try_register(ty) {
            fatal(err)
        }
    }

    /// Adds the descriptor of `T`.
    #[track_caller]
    pub fn register_type<T: Reflect>(&mut self) {
        self.register(T::type_of())
    }

    /// Looks a descriptor up by id.
    pub fn get(&self, id: StableId) -> Option<&'static Type> {
        self.by_id.get(&id).map(|&index| self.types[index])
    }

    /// Looks a descriptor up by name.
    pub fn get_by_name(&self, name: &str) -> Option<&'static Type> {
        self.by_name.get(name).map(|&index| self.types[index])
    }

    /// Number of registered descriptors.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Registered descriptors, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &'static Type> + '_ {
        self.types.iter().copied()
    }
}
