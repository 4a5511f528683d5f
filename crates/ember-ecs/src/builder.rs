//! Fluent builders for archetypes and entities.
//!
//! Builders stage work onto the manager's deferred queues; nothing they do
//! is observable to queries until
//! [`refresh_manager_data`](crate::manager::EntityManager::refresh_manager_data)
//! commits it.

use std::mem;

use crate::archetype::Archetype;
use crate::component::{Component, ComponentId};
use crate::component_data::ComponentData;
use crate::entity::Entity;
use crate::fingerprint::Fingerprint;
use crate::manager::EntityManager;

// ---------------------------------------------------------------------------
// ArchetypeBuilder
// ---------------------------------------------------------------------------

/// Composes an archetype out of registered component types.
///
/// `build` hands the archetype back by value for immediate read use; the
/// manager commits its own copy on the next refresh if the fingerprint is
/// new.
pub struct ArchetypeBuilder<'manager> {
    manager: &'manager mut EntityManager,
    fingerprint: Fingerprint,
    component_ids: Vec<ComponentId>,
}

impl<'manager> ArchetypeBuilder<'manager> {
    pub(crate) fn new(manager: &'manager mut EntityManager) -> Self {
        let fingerprint = manager.blank_fingerprint();
        Self {
            manager,
            fingerprint,
            component_ids: Vec::new(),
        }
    }

    /// Add a component type to the archetype.
    ///
    /// # Panics
    ///
    /// Panics if `T` is not registered or was already added.
    pub fn with<T: Component>(mut self) -> Self {
        let index = self.manager.fingerprint_bit(T::ID);
        assert!(
            !self.fingerprint.get(index),
            "component {:?} is already part of the archetype",
            T::ID
        );

        self.fingerprint.set(index, true);
        self.component_ids.push(T::ID);
        self
    }

    /// Build the archetype and queue it for commit if its fingerprint is
    /// not yet committed.
    pub fn build(self) -> Archetype {
        let archetype = Archetype::new(self.fingerprint, self.component_ids);
        self.manager.adopt_built_archetype(&archetype);
        archetype
    }
}

// ---------------------------------------------------------------------------
// EntityBuilder
// ---------------------------------------------------------------------------

/// Composes a new entity from individual component values.
pub struct EntityBuilder<'manager> {
    manager: &'manager mut EntityManager,
    entity: Entity,
    fingerprint: Fingerprint,
    component_data: ComponentData,
}

impl<'manager> EntityBuilder<'manager> {
    pub(crate) fn new(manager: &'manager mut EntityManager, entity: Entity) -> Self {
        debug_assert!(entity.is_valid());
        let fingerprint = manager.blank_fingerprint();
        Self {
            manager,
            entity,
            fingerprint,
            component_data: ComponentData::new(),
        }
    }

    /// Stage one component value for the entity.
    ///
    /// # Panics
    ///
    /// Panics if `T` is not registered or was already set.
    pub fn set_component_data<T: Component>(mut self, value: T) -> Self {
        let index = self.manager.fingerprint_bit(T::ID);
        assert!(
            !self.fingerprint.get(index),
            "component {:?} is already set for this entity",
            T::ID
        );

        self.fingerprint.set(index, true);
        self.component_data
            .add(T::ID, mem::size_of::<T>(), bytemuck::bytes_of(&value));
        self
    }

    /// Enqueue the entity and its staged component data for the next
    /// refresh.
    pub fn build(self) -> Entity {
        let Self {
            manager,
            entity,
            component_data,
            ..
        } = self;
        manager.stage_entity(entity, component_data);
        entity
    }
}

// ---------------------------------------------------------------------------
// EntityBuilderFromArchetype
// ---------------------------------------------------------------------------

/// Composes a new entity that must match an archetype exactly.
///
/// The tracking fingerprint starts as the archetype's; every supplied
/// component clears its bit, and `build` asserts none remain, which
/// guarantees the entity provides exactly the archetype's component set.
pub struct EntityBuilderFromArchetype<'manager> {
    manager: &'manager mut EntityManager,
    entity: Entity,
    fingerprint_track: Fingerprint,
    component_data: ComponentData,
}

impl<'manager> EntityBuilderFromArchetype<'manager> {
    pub(crate) fn new(
        manager: &'manager mut EntityManager,
        entity: Entity,
        archetype: &Archetype,
    ) -> Self {
        debug_assert!(entity.is_valid());
        assert!(
            archetype.component_count() > 0,
            "archetype must have components"
        );

        Self {
            manager,
            entity,
            fingerprint_track: archetype.fingerprint().clone(),
            component_data: ComponentData::new(),
        }
    }

    /// Stage one component value for the entity.
    ///
    /// # Panics
    ///
    /// Panics if `T` is not part of the archetype or was already set.
    pub fn set_component_data<T: Component>(mut self, value: T) -> Self {
        let index = self.manager.fingerprint_bit(T::ID);
        assert!(
            self.fingerprint_track.get(index),
            "component {:?} is not pending for this archetype",
            T::ID
        );

        self.fingerprint_track.set(index, false);
        self.component_data
            .add(T::ID, mem::size_of::<T>(), bytemuck::bytes_of(&value));
        self
    }

    /// Enqueue the entity for the next refresh.
    ///
    /// # Panics
    ///
    /// Panics unless every component of the archetype was supplied.
    pub fn build(self) -> Entity {
        assert_eq!(
            self.fingerprint_track.true_count(),
            0,
            "not all components of the archetype were set"
        );

        let Self {
            manager,
            entity,
            component_data,
            ..
        } = self;
        manager.stage_entity(entity, component_data);
        entity
    }
}
