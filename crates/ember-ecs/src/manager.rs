//! The entity manager.
//!
//! The [`EntityManager`] owns the component catalogue, the entity and
//! archetype registries, and the deferred-mutation queues. Structural
//! changes -- entity creation and destruction, component addition and
//! removal, archetype creation -- are staged by the builders and `try_*`
//! operations and become observable only when
//! [`refresh_manager_data`](EntityManager::refresh_manager_data) commits
//! them, so queries in flight never observe torn state.

use std::collections::{HashMap, HashSet};
use std::mem;

use ember_memory::PLATFORM_ALIGNMENT;

use crate::archetype::Archetype;
use crate::builder::{ArchetypeBuilder, EntityBuilder, EntityBuilderFromArchetype};
use crate::component::{Component, ComponentCatalogue, ComponentId};
use crate::component_data::ComponentData;
use crate::entity::{Entity, EntityId};
use crate::fingerprint::Fingerprint;
use crate::query::ComponentQuery;
use crate::EcsError;

/// Entity registry, archetype registry, and deferred-mutation queues.
#[derive(Default)]
pub struct EntityManager {
    // Entity registry.
    entities: Vec<Entity>,
    entity_to_index: HashMap<EntityId, usize>,
    entity_to_fingerprint: HashMap<EntityId, Fingerprint>,
    entities_to_add: Vec<Entity>,
    entity_to_component_data_to_add: HashMap<EntityId, ComponentData>,

    // Component registry.
    catalogue: ComponentCatalogue,
    component_to_fingerprints: HashMap<ComponentId, Vec<Fingerprint>>,

    // Archetype registry.
    fingerprint_to_archetype: HashMap<Fingerprint, Archetype>,
    archetypes_to_add: Vec<Archetype>,
    fingerprint_to_entities_to_remove: HashMap<Fingerprint, Vec<EntityId>>,

    next_entity_id: u64,
}

impl EntityManager {
    /// Create an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    // -- component registration ---------------------------------------------

    /// Register a component type, assigning it the next dense fingerprint
    /// bit. Idempotent per component; a no-op once the catalogue is locked.
    ///
    /// # Panics
    ///
    /// Panics if `T`'s alignment exceeds the platform alignment column
    /// storage is allocated at.
    pub fn register_component<T: Component>(&mut self) -> &mut Self {
        if self.catalogue.is_locked() {
            return self;
        }
        assert!(
            mem::align_of::<T>() <= PLATFORM_ALIGNMENT,
            "component alignment exceeds platform alignment"
        );

        self.catalogue.register(T::ID);
        self.component_to_fingerprints.entry(T::ID).or_default();
        self
    }

    /// Flip the one-way registration latch. All archetype and entity
    /// creation must happen afterwards.
    pub fn lock_components(&mut self) {
        self.catalogue.lock();
    }

    /// Whether component registration is locked.
    pub fn is_locked(&self) -> bool {
        self.catalogue.is_locked()
    }

    // -- builders -----------------------------------------------------------

    /// Start composing an archetype.
    ///
    /// # Panics
    ///
    /// Panics unless component registration is locked.
    pub fn create_archetype(&mut self) -> ArchetypeBuilder<'_> {
        assert!(
            self.catalogue.is_locked(),
            "component registration must be locked"
        );
        ArchetypeBuilder::new(self)
    }

    /// Start composing a new entity.
    ///
    /// # Panics
    ///
    /// Panics unless component registration is locked.
    pub fn create_entity(&mut self) -> EntityBuilder<'_> {
        assert!(
            self.catalogue.is_locked(),
            "component registration must be locked"
        );
        let entity = self.create_entity_internal();
        EntityBuilder::new(self, entity)
    }

    /// Start composing a new entity that must match `archetype` exactly.
    ///
    /// # Panics
    ///
    /// Panics unless component registration is locked.
    pub fn create_entity_from_archetype(
        &mut self,
        archetype: &Archetype,
    ) -> EntityBuilderFromArchetype<'_> {
        assert!(
            self.catalogue.is_locked(),
            "component registration must be locked"
        );
        let entity = self.create_entity_internal();
        EntityBuilderFromArchetype::new(self, entity, archetype)
    }

    /// Issue the next monotonic entity ID, probing past any collision with
    /// a live entity.
    fn create_entity_internal(&mut self) -> Entity {
        self.next_entity_id += 1;
        let mut id = EntityId::from_raw(self.next_entity_id);
        while self.entity_to_index.contains_key(&id) {
            self.next_entity_id += 1;
            id = EntityId::from_raw(self.next_entity_id);
        }
        Entity::new(id)
    }

    // -- entity lifecycle ---------------------------------------------------

    /// Invalidate the entity's registry record and queue it for removal
    /// from its archetype at the next refresh. A no-op for entities that
    /// were never committed.
    ///
    /// # Panics
    ///
    /// Panics unless component registration is locked.
    pub fn destroy_entity(&mut self, entity: &Entity) {
        assert!(
            self.catalogue.is_locked(),
            "component registration must be locked"
        );

        let Some(&index) = self.entity_to_index.get(&entity.id()) else {
            return;
        };
        self.entities[index].invalidate();

        let fingerprint = self
            .entity_to_fingerprint
            .get(&entity.id())
            .expect("committed entity must be mapped to an archetype")
            .clone();
        self.fingerprint_to_entities_to_remove
            .entry(fingerprint)
            .or_default()
            .push(entity.id());
    }

    // -- component mutation -------------------------------------------------

    /// Stage `value` as a new component on `entity`. The migration to the
    /// widened archetype happens at the next refresh.
    ///
    /// Returns `false` (leaving state unchanged) when the entity is
    /// unknown, the component is not registered, or the entity already has
    /// it.
    pub fn try_add_component<T: Component>(&mut self, entity: &Entity, value: T) -> bool {
        assert!(entity.is_valid(), "entity must be valid");

        match self.try_add_component_raw(
            entity.id(),
            T::ID,
            mem::size_of::<T>(),
            bytemuck::bytes_of(&value),
        ) {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(entity = %entity.id(), %error, "component add rejected");
                false
            }
        }
    }

    fn try_add_component_raw(
        &mut self,
        entity_id: EntityId,
        component_id: ComponentId,
        size: usize,
        bytes: &[u8],
    ) -> Result<(), EcsError> {
        let index = self
            .catalogue
            .index_of(component_id)
            .ok_or(EcsError::UnregisteredComponent(component_id))?;

        // An entity with staged data just grows its staged record.
        if let Some(staged) = self.entity_to_component_data_to_add.get_mut(&entity_id) {
            if staged.component_ids().contains(&component_id) {
                return Err(EcsError::DuplicateComponent {
                    entity: entity_id,
                    component: component_id,
                });
            }
            staged.add(component_id, size, bytes);
            return Ok(());
        }

        let fingerprint = self
            .entity_to_fingerprint
            .get(&entity_id)
            .ok_or(EcsError::UnknownEntity(entity_id))?
            .clone();
        if fingerprint.get(index) {
            return Err(EcsError::DuplicateComponent {
                entity: entity_id,
                component: component_id,
            });
        }

        let archetype = self
            .fingerprint_to_archetype
            .get(&fingerprint)
            .ok_or(EcsError::MissingArchetype(entity_id))?;

        let mut data = ComponentData::new();
        archetype.component_data_for_entity(entity_id, &mut data);
        data.add(component_id, size, bytes);

        self.entity_to_component_data_to_add.insert(entity_id, data);
        self.fingerprint_to_entities_to_remove
            .entry(fingerprint)
            .or_default()
            .push(entity_id);

        Ok(())
    }

    /// Stage the removal of component `T` from `entity`: a copy of the
    /// entity's data minus the component is staged, and the old archetype
    /// drops the entity at the next refresh.
    ///
    /// Returns `false` (leaving state unchanged) when the entity is
    /// unknown, the component is not registered, or the entity does not
    /// have it.
    pub fn try_remove_component<T: Component>(&mut self, entity: &Entity) -> bool {
        assert!(entity.is_valid(), "entity must be valid");

        match self.try_remove_component_raw(entity.id(), T::ID) {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(entity = %entity.id(), %error, "component removal rejected");
                false
            }
        }
    }

    fn try_remove_component_raw(
        &mut self,
        entity_id: EntityId,
        component_id: ComponentId,
    ) -> Result<(), EcsError> {
        let index = self
            .catalogue
            .index_of(component_id)
            .ok_or(EcsError::UnregisteredComponent(component_id))?;

        if let Some(staged) = self.entity_to_component_data_to_add.get_mut(&entity_id) {
            if !staged.component_ids().contains(&component_id) {
                return Err(EcsError::MissingComponent {
                    entity: entity_id,
                    component: component_id,
                });
            }
            staged.remove(component_id);
            return Ok(());
        }

        let fingerprint = self
            .entity_to_fingerprint
            .get(&entity_id)
            .ok_or(EcsError::UnknownEntity(entity_id))?
            .clone();
        if !fingerprint.get(index) {
            return Err(EcsError::MissingComponent {
                entity: entity_id,
                component: component_id,
            });
        }

        let archetype = self
            .fingerprint_to_archetype
            .get(&fingerprint)
            .ok_or(EcsError::MissingArchetype(entity_id))?;

        let mut data = ComponentData::new();
        archetype.component_data_for_entity(entity_id, &mut data);
        data.remove(component_id);

        self.entity_to_component_data_to_add.insert(entity_id, data);
        self.fingerprint_to_entities_to_remove
            .entry(fingerprint)
            .or_default()
            .push(entity_id);

        Ok(())
    }

    // -- component access ---------------------------------------------------

    /// Whether the committed state of `entity` includes component `T`.
    pub fn has_component<T: Component>(&self, entity: &Entity) -> bool {
        self.has_component_id(entity.id(), T::ID)
    }

    /// Whether the committed state of `entity_id` includes `component_id`.
    pub fn has_component_id(&self, entity_id: EntityId, component_id: ComponentId) -> bool {
        let Some(index) = self.catalogue.index_of(component_id) else {
            return false;
        };
        let Some(fingerprint) = self.entity_to_fingerprint.get(&entity_id) else {
            return false;
        };
        fingerprint.get(index)
    }

    /// A typed view of one committed component of `entity`, or `None` when
    /// the entity or component is absent.
    pub fn component_for_entity<T: Component>(&self, entity: &Entity) -> Option<&T> {
        let fingerprint = self.entity_to_fingerprint.get(&entity.id())?;
        let archetype = self.fingerprint_to_archetype.get(fingerprint)?;
        archetype.component_for_entity::<T>(entity.id())
    }

    /// A mutable typed view of one committed component of `entity`.
    pub fn component_for_entity_mut<T: Component>(&mut self, entity: &Entity) -> Option<&mut T> {
        let fingerprint = self.entity_to_fingerprint.get(&entity.id())?;
        let archetype = self.fingerprint_to_archetype.get_mut(fingerprint)?;
        archetype.component_for_entity_mut::<T>(entity.id())
    }

    /// A tuple of typed views of several committed components of `entity`,
    /// or `None` when the entity or any queried component is absent.
    pub fn components_for_entity<Q: ComponentQuery>(
        &mut self,
        entity: &Entity,
    ) -> Option<Q::Item<'_>> {
        let mut ids = Vec::new();
        Q::component_ids(&mut ids);

        let fingerprint = self.entity_to_fingerprint.get(&entity.id())?;
        let archetype = self.fingerprint_to_archetype.get(fingerprint)?;
        let row = archetype.row_of(entity.id())?;
        if !ids.iter().all(|&id| archetype.has_component_id(id)) {
            return None;
        }

        // Exclusive access through `&mut self` makes the mutable views
        // sound.
        Some(unsafe { Q::fetch(archetype, row) })
    }

    // -- queries ------------------------------------------------------------

    /// Invoke `callback` once per committed entity whose fingerprint is a
    /// superset of the queried component set.
    ///
    /// # Panics
    ///
    /// Panics if a queried component is not registered or the query names
    /// the same component twice.
    pub fn for_each<Q: ComponentQuery, F>(&mut self, mut callback: F)
    where
        F: FnMut(Q::Item<'_>),
    {
        let mut ids = Vec::new();
        Q::component_ids(&mut ids);
        for first in 0..ids.len() {
            for second in first + 1..ids.len() {
                assert_ne!(
                    ids[first], ids[second],
                    "components in a query must be unique"
                );
            }
        }

        let mut requested = self.blank_fingerprint();
        for &id in &ids {
            requested.set(self.fingerprint_bit(id), true);
        }

        let mut matches: HashSet<Fingerprint> = HashSet::new();
        for id in &ids {
            let Some(fingerprints) = self.component_to_fingerprints.get(id) else {
                continue;
            };
            for fingerprint in fingerprints {
                if fingerprint.includes(&requested) {
                    matches.insert(fingerprint.clone());
                }
            }
        }

        for fingerprint in &matches {
            // Only committed archetypes are observable to queries.
            if let Some(archetype) = self.fingerprint_to_archetype.get_mut(fingerprint) {
                archetype.for_each::<Q, _>(&mut callback);
            }
        }
    }

    // -- counts -------------------------------------------------------------

    /// Number of committed entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Number of registered components.
    pub fn component_count(&self) -> usize {
        self.catalogue.len()
    }

    /// Number of committed archetypes.
    pub fn archetype_count(&self) -> usize {
        self.fingerprint_to_archetype.len()
    }

    // -- refresh ------------------------------------------------------------

    /// The sole commit point: drain every staging queue and reconcile the
    /// archetype and entity registries. Before this call, staged mutations
    /// are invisible to counts and queries; after it, they appear
    /// atomically.
    ///
    /// # Panics
    ///
    /// Panics unless component registration is locked.
    pub fn refresh_manager_data(&mut self) {
        assert!(
            self.catalogue.is_locked(),
            "component registration must be locked"
        );

        self.refresh_archetypes();
        self.refresh_entities();
    }

    fn refresh_archetypes(&mut self) {
        // Staged component data determines each entity's target
        // fingerprint; fingerprints without a committed or queued archetype
        // get a fresh one queued.
        let staged: Vec<(EntityId, ComponentData)> =
            self.entity_to_component_data_to_add.drain().collect();
        let mut insertions: Vec<(EntityId, Fingerprint, ComponentData)> =
            Vec::with_capacity(staged.len());

        for (entity_id, data) in staged {
            let mut fingerprint = self.blank_fingerprint();
            for (id, _, _) in data.iter() {
                let index = self
                    .catalogue
                    .index_of(id)
                    .expect("staged component must be registered");
                fingerprint.set(index, true);
            }

            if !self.fingerprint_to_archetype.contains_key(&fingerprint)
                && !self
                    .archetypes_to_add
                    .iter()
                    .any(|queued| queued.fingerprint() == &fingerprint)
            {
                let ids = data.component_ids().to_vec();
                self.record_fingerprint_for_components(&ids, &fingerprint);
                self.archetypes_to_add
                    .push(Archetype::new(fingerprint.clone(), ids));
            }

            self.entity_to_fingerprint
                .insert(entity_id, fingerprint.clone());
            insertions.push((entity_id, fingerprint, data));
        }

        // Commit queued archetypes; the first archetype per fingerprint
        // wins.
        while let Some(archetype) = self.archetypes_to_add.pop() {
            tracing::debug!(fingerprint = ?archetype.fingerprint(), "committing archetype");
            self.fingerprint_to_archetype
                .entry(archetype.fingerprint().clone())
                .or_insert(archetype);
        }

        // Entities queued for removal leave their old archetypes before the
        // staged data lands, so a migration whose target equals its source
        // re-inserts cleanly.
        let removals: Vec<(Fingerprint, Vec<EntityId>)> =
            self.fingerprint_to_entities_to_remove.drain().collect();
        for (fingerprint, entity_ids) in removals {
            let Some(archetype) = self.fingerprint_to_archetype.get_mut(&fingerprint) else {
                continue;
            };
            for entity_id in entity_ids {
                archetype.try_remove_component_data(entity_id);
            }
        }

        // Staged component data lands in the now-committed archetypes.
        for (entity_id, fingerprint, data) in insertions {
            let archetype = self
                .fingerprint_to_archetype
                .get_mut(&fingerprint)
                .expect("staged fingerprint must have a committed archetype");

            let ids: Vec<ComponentId> = data.component_ids().to_vec();
            let sizes: Vec<usize> = data.component_sizes().to_vec();
            archetype.try_add_component_data(entity_id, &ids, &sizes, data.bytes());
        }
    }

    fn refresh_entities(&mut self) {
        while let Some(entity) = self.entities_to_add.pop() {
            self.entity_to_index.insert(entity.id(), self.entities.len());
            self.entities.push(entity);
        }

        // Sweep invalidated records, patching the swapped survivor's index.
        let mut index = 0;
        while index < self.entities.len() {
            if self.entities[index].is_valid() {
                index += 1;
                continue;
            }

            let removed = self.entities.swap_remove(index);
            tracing::debug!(entity = %removed.id(), "removing destroyed entity");
            self.entity_to_index.remove(&removed.id());
            self.entity_to_fingerprint.remove(&removed.id());
            if index < self.entities.len() {
                self.entity_to_index.insert(self.entities[index].id(), index);
            }
        }
    }

    // -- shared internals ---------------------------------------------------

    /// An empty fingerprint pre-sized to the catalogue's bit width.
    pub(crate) fn blank_fingerprint(&self) -> Fingerprint {
        Fingerprint::with_bit_capacity(self.catalogue.len())
    }

    /// The dense fingerprint bit for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not registered.
    pub(crate) fn fingerprint_bit(&self, id: ComponentId) -> usize {
        self.catalogue
            .index_of(id)
            .unwrap_or_else(|| panic!("component {id:?} must be registered"))
    }

    /// Queue a builder-produced archetype for commit (unless its
    /// fingerprint is already committed or queued) and record its
    /// fingerprint under every member component.
    pub(crate) fn adopt_built_archetype(&mut self, archetype: &Archetype) {
        if !self
            .fingerprint_to_archetype
            .contains_key(archetype.fingerprint())
            && !self
                .archetypes_to_add
                .iter()
                .any(|queued| queued.fingerprint() == archetype.fingerprint())
        {
            self.archetypes_to_add.push(archetype.clone());
        }

        let ids = archetype.component_ids().to_vec();
        self.record_fingerprint_for_components(&ids, archetype.fingerprint());
    }

    /// Enqueue a built entity and its staged component data.
    pub(crate) fn stage_entity(&mut self, entity: Entity, data: ComponentData) {
        assert!(
            !self
                .entity_to_component_data_to_add
                .contains_key(&entity.id()),
            "entity is already staged"
        );
        self.entities_to_add.push(entity);
        self.entity_to_component_data_to_add.insert(entity.id(), data);
    }

    fn record_fingerprint_for_components(
        &mut self,
        ids: &[ComponentId],
        fingerprint: &Fingerprint,
    ) {
        for &id in ids {
            let fingerprints = self.component_to_fingerprints.entry(id).or_default();
            if !fingerprints.contains(fingerprint) {
                fingerprints.push(fingerprint.clone());
            }
        }
    }
}

impl std::fmt::Debug for EntityManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityManager")
            .field("entity_count", &self.entities.len())
            .field("component_count", &self.catalogue.len())
            .field("archetype_count", &self.fingerprint_to_archetype.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
    #[repr(C)]
    struct TestComponent1 {
        a: i32,
        b: i32,
    }

    impl Component for TestComponent1 {
        const ID: ComponentId = ComponentId::new(1);
    }

    #[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
    #[repr(C)]
    struct TestComponent2 {
        c: i32,
        d: i32,
    }

    impl Component for TestComponent2 {
        const ID: ComponentId = ComponentId::new(2);
    }

    #[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
    #[repr(C)]
    struct TestComponent3 {
        e: i32,
        f: i32,
    }

    impl Component for TestComponent3 {
        const ID: ComponentId = ComponentId::new(3);
    }

    fn with_memory_system(test: impl FnOnce()) {
        ember_memory::initialise(32 * 1024);
        test();
        assert_eq!(ember_memory::used_memory(), 0);
        ember_memory::shutdown();
    }

    fn locked_manager() -> EntityManager {
        let mut manager = EntityManager::new();
        manager
            .register_component::<TestComponent1>()
            .register_component::<TestComponent2>()
            .register_component::<TestComponent3>();
        manager.lock_components();
        manager
    }

    #[test]
    fn register_components_assigns_dense_indices() {
        let mut manager = EntityManager::new();
        manager
            .register_component::<TestComponent1>()
            .register_component::<TestComponent2>();
        assert_eq!(manager.component_count(), 2);

        // Idempotent per component.
        manager.register_component::<TestComponent1>();
        assert_eq!(manager.component_count(), 2);
    }

    #[test]
    fn registration_after_lock_is_a_no_op() {
        let mut manager = EntityManager::new();
        manager.register_component::<TestComponent1>();
        manager.lock_components();
        manager.register_component::<TestComponent2>();
        assert_eq!(manager.component_count(), 1);
    }

    #[test]
    #[should_panic(expected = "must be locked")]
    fn create_archetype_requires_the_lock() {
        let mut manager = EntityManager::new();
        let _ = manager.create_archetype();
    }

    #[test]
    #[should_panic(expected = "must be locked")]
    fn create_entity_requires_the_lock() {
        let mut manager = EntityManager::new();
        let _ = manager.create_entity();
    }

    #[test]
    fn archetype_becomes_visible_on_refresh() {
        with_memory_system(|| {
            let mut manager = locked_manager();

            let archetype = manager
                .create_archetype()
                .with::<TestComponent1>()
                .with::<TestComponent2>()
                .build();

            assert_eq!(archetype.component_count(), 2);
            assert_eq!(archetype.entity_count(), 0);
            assert_eq!(manager.archetype_count(), 0);

            manager.refresh_manager_data();

            assert_eq!(manager.archetype_count(), 1);
            assert_eq!(manager.entity_count(), 0);
        });
    }

    #[test]
    #[should_panic(expected = "must be registered")]
    fn archetype_with_unregistered_component_is_fatal() {
        let mut manager = EntityManager::new();
        manager.register_component::<TestComponent1>();
        manager.lock_components();

        let _ = manager.create_archetype().with::<TestComponent2>();
    }

    #[test]
    fn entity_becomes_visible_on_refresh() {
        with_memory_system(|| {
            let mut manager = locked_manager();

            let entity = manager
                .create_entity()
                .set_component_data(TestComponent1 { a: 1, b: 2 })
                .set_component_data(TestComponent2 { c: 3, d: 4 })
                .build();

            assert!(entity.is_valid());
            assert_eq!(manager.entity_count(), 0);

            manager.refresh_manager_data();

            assert_eq!(manager.entity_count(), 1);
            assert_eq!(manager.archetype_count(), 1);
            assert_eq!(manager.component_count(), 3);
        });
    }

    #[test]
    fn entity_from_archetype_matches_it_exactly() {
        with_memory_system(|| {
            let mut manager = locked_manager();

            let archetype = manager
                .create_archetype()
                .with::<TestComponent1>()
                .with::<TestComponent2>()
                .build();

            let entity = manager
                .create_entity_from_archetype(&archetype)
                .set_component_data(TestComponent1 { a: 1, b: 2 })
                .set_component_data(TestComponent2 { c: 3, d: 4 })
                .build();

            assert!(entity.is_valid());
            manager.refresh_manager_data();

            // Same fingerprint: the entity joins the built archetype rather
            // than creating a second one.
            assert_eq!(manager.entity_count(), 1);
            assert_eq!(manager.archetype_count(), 1);
        });
    }

    #[test]
    #[should_panic(expected = "not all components")]
    fn entity_from_archetype_requires_every_component() {
        ember_memory::initialise(32 * 1024);
        let mut manager = locked_manager();

        let archetype = manager
            .create_archetype()
            .with::<TestComponent1>()
            .with::<TestComponent2>()
            .build();

        let _ = manager
            .create_entity_from_archetype(&archetype)
            .set_component_data(TestComponent1 { a: 1, b: 2 })
            .build();
    }

    #[test]
    fn destroy_entity_takes_effect_on_refresh() {
        with_memory_system(|| {
            let mut manager = locked_manager();

            let entity = manager
                .create_entity()
                .set_component_data(TestComponent1 { a: 1, b: 2 })
                .build();
            manager.refresh_manager_data();
            assert_eq!(manager.entity_count(), 1);

            manager.destroy_entity(&entity);
            assert_eq!(manager.entity_count(), 1);

            manager.refresh_manager_data();
            assert_eq!(manager.entity_count(), 0);
            assert_eq!(manager.archetype_count(), 1);
            assert!(!manager.has_component::<TestComponent1>(&entity));
        });
    }

    #[test]
    fn add_component_migrates_the_entity() {
        with_memory_system(|| {
            let mut manager = locked_manager();

            let entity = manager
                .create_entity()
                .set_component_data(TestComponent1 { a: 1, b: 2 })
                .build();
            manager.refresh_manager_data();

            assert!(manager.has_component::<TestComponent1>(&entity));
            assert!(!manager.has_component::<TestComponent2>(&entity));
            assert_eq!(manager.archetype_count(), 1);

            assert!(manager.try_add_component(&entity, TestComponent2 { c: 3, d: 4 }));

            // Invisible until the refresh commits it.
            assert!(!manager.has_component::<TestComponent2>(&entity));

            manager.refresh_manager_data();

            assert!(manager.has_component::<TestComponent1>(&entity));
            assert!(manager.has_component::<TestComponent2>(&entity));
            assert_eq!(manager.entity_count(), 1);
            assert_eq!(manager.archetype_count(), 2);

            // The original component survived the migration.
            assert_eq!(
                manager.component_for_entity::<TestComponent1>(&entity),
                Some(&TestComponent1 { a: 1, b: 2 })
            );
            assert_eq!(
                manager.component_for_entity::<TestComponent2>(&entity),
                Some(&TestComponent2 { c: 3, d: 4 })
            );
        });
    }

    #[test]
    fn adding_a_present_component_is_refused() {
        with_memory_system(|| {
            let mut manager = locked_manager();

            let entity = manager
                .create_entity()
                .set_component_data(TestComponent1 { a: 1, b: 2 })
                .build();
            manager.refresh_manager_data();

            assert!(!manager.try_add_component(&entity, TestComponent1 { a: 9, b: 9 }));
            assert_eq!(
                manager.component_for_entity::<TestComponent1>(&entity),
                Some(&TestComponent1 { a: 1, b: 2 })
            );
        });
    }

    #[test]
    fn remove_component_migrates_the_entity() {
        with_memory_system(|| {
            let mut manager = locked_manager();

            let entity = manager
                .create_entity()
                .set_component_data(TestComponent1 { a: 1, b: 2 })
                .set_component_data(TestComponent2 { c: 3, d: 4 })
                .build();
            manager.refresh_manager_data();
            assert_eq!(manager.archetype_count(), 1);

            assert!(manager.try_remove_component::<TestComponent2>(&entity));
            assert!(manager.has_component::<TestComponent2>(&entity));

            manager.refresh_manager_data();

            assert!(manager.has_component::<TestComponent1>(&entity));
            assert!(!manager.has_component::<TestComponent2>(&entity));
            assert_eq!(manager.entity_count(), 1);
            assert_eq!(manager.archetype_count(), 2);
            assert_eq!(
                manager.component_for_entity::<TestComponent1>(&entity),
                Some(&TestComponent1 { a: 1, b: 2 })
            );
        });
    }

    #[test]
    fn removing_an_absent_component_is_refused() {
        with_memory_system(|| {
            let mut manager = locked_manager();

            let entity = manager
                .create_entity()
                .set_component_data(TestComponent1 { a: 1, b: 2 })
                .build();
            manager.refresh_manager_data();

            assert!(!manager.try_remove_component::<TestComponent2>(&entity));
        });
    }

    #[test]
    fn mutation_through_typed_access_persists() {
        with_memory_system(|| {
            let mut manager = locked_manager();

            let entity = manager
                .create_entity()
                .set_component_data(TestComponent1 { a: 0, b: 0 })
                .build();
            manager.refresh_manager_data();

            manager
                .component_for_entity_mut::<TestComponent1>(&entity)
                .unwrap()
                .a = 77;

            assert_eq!(
                manager.component_for_entity::<TestComponent1>(&entity),
                Some(&TestComponent1 { a: 77, b: 0 })
            );
        });
    }

    #[test]
    fn tuple_typed_access_fetches_every_column() {
        with_memory_system(|| {
            let mut manager = locked_manager();

            let entity = manager
                .create_entity()
                .set_component_data(TestComponent1 { a: 1, b: 2 })
                .set_component_data(TestComponent2 { c: 3, d: 4 })
                .build();
            manager.refresh_manager_data();

            {
                let (first, second) = manager
                    .components_for_entity::<(TestComponent1, TestComponent2)>(&entity)
                    .unwrap();
                assert_eq!(first, &TestComponent1 { a: 1, b: 2 });
                second.c = 30;
            }

            assert_eq!(
                manager.component_for_entity::<TestComponent2>(&entity),
                Some(&TestComponent2 { c: 30, d: 4 })
            );

            // A component outside the entity's set fails the whole fetch.
            assert!(manager
                .components_for_entity::<(TestComponent1, TestComponent3)>(&entity)
                .is_none());
        });
    }

    #[test]
    fn for_each_matches_fingerprint_supersets() {
        with_memory_system(|| {
            let mut manager = locked_manager();

            let e1 = manager
                .create_entity()
                .set_component_data(TestComponent1 { a: 1, b: 0 })
                .set_component_data(TestComponent2 { c: 1, d: 0 })
                .set_component_data(TestComponent3 { e: 1, f: 0 })
                .build();
            let e2 = manager
                .create_entity()
                .set_component_data(TestComponent1 { a: 2, b: 0 })
                .set_component_data(TestComponent2 { c: 2, d: 0 })
                .build();
            let e3 = manager
                .create_entity()
                .set_component_data(TestComponent1 { a: 3, b: 0 })
                .set_component_data(TestComponent3 { e: 3, f: 0 })
                .build();
            manager.refresh_manager_data();

            assert_eq!(manager.entity_count(), 3);
            assert_eq!(manager.archetype_count(), 3);

            let mut visited = 0;
            manager.for_each::<(TestComponent1,), _>(|(_first,)| visited += 1);
            assert_eq!(visited, 3);

            let mut seen = Vec::new();
            manager.for_each::<(TestComponent1, TestComponent2), _>(|(first, second)| {
                assert_eq!(first.a, second.c);
                seen.push(first.a);
            });
            seen.sort_unstable();
            assert_eq!(seen, vec![1, 2]);

            let _ = (e1, e2, e3);
        });
    }

    #[test]
    fn for_each_visits_each_matching_entity_exactly_once() {
        with_memory_system(|| {
            let mut manager = locked_manager();

            for raw in 0..5 {
                let _ = manager
                    .create_entity()
                    .set_component_data(TestComponent1 { a: raw, b: 0 })
                    .set_component_data(TestComponent2 { c: 0, d: 0 })
                    .build();
            }
            manager.refresh_manager_data();

            let mut seen = Vec::new();
            manager.for_each::<(TestComponent1,), _>(|(first,)| seen.push(first.a));
            seen.sort_unstable();
            assert_eq!(seen, vec![0, 1, 2, 3, 4]);
        });
    }

    #[test]
    #[should_panic(expected = "must be unique")]
    fn duplicate_query_components_are_fatal() {
        ember_memory::initialise(32 * 1024);
        let mut manager = locked_manager();
        manager.refresh_manager_data();
        manager.for_each::<(TestComponent1, TestComponent1), _>(|(_a, _b)| {});
    }

    #[test]
    fn for_each_mutations_are_visible_afterwards() {
        with_memory_system(|| {
            let mut manager = locked_manager();

            let entity = manager
                .create_entity()
                .set_component_data(TestComponent1 { a: 1, b: 1 })
                .build();
            manager.refresh_manager_data();

            manager.for_each::<(TestComponent1,), _>(|(first,)| {
                first.a *= 10;
                first.b *= 20;
            });

            assert_eq!(
                manager.component_for_entity::<TestComponent1>(&entity),
                Some(&TestComponent1 { a: 10, b: 20 })
            );
        });
    }

    #[test]
    fn entity_ids_are_unique_and_monotonic() {
        with_memory_system(|| {
            let mut manager = locked_manager();

            let mut ids = Vec::new();
            for raw in 0..10 {
                let entity = manager
                    .create_entity()
                    .set_component_data(TestComponent1 { a: raw, b: 0 })
                    .build();
                ids.push(entity.id());
            }

            let mut deduplicated = ids.clone();
            deduplicated.sort();
            deduplicated.dedup();
            assert_eq!(deduplicated.len(), ids.len());
            assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));

            manager.refresh_manager_data();
        });
    }
}
