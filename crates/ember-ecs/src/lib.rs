//! Ember ECS -- archetype-based entity-component system with deferred
//! structural mutation.
//!
//! Entities are stored in archetypes (one per unique component set) using a
//! column-oriented layout keyed by a fingerprint bitset. Structural changes
//! are staged through builders and `try_*` operations and committed
//! atomically by
//! [`EntityManager::refresh_manager_data`](manager::EntityManager::refresh_manager_data),
//! so queries never observe torn state. All column and staging buffers
//! allocate through [`ember_memory`].
//!
//! # Quick Start
//!
//! ```
//! use ember_ecs::prelude::*;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
//! #[repr(C)]
//! struct Position { x: f32, y: f32 }
//!
//! impl Component for Position {
//!     const ID: ComponentId = ComponentId::new(1);
//! }
//!
//! ember_memory::initialise(16 * 1024);
//! {
//!     let mut manager = EntityManager::new();
//!     manager.register_component::<Position>();
//!     manager.lock_components();
//!
//!     let entity = manager
//!         .create_entity()
//!         .set_component_data(Position { x: 1.0, y: 2.0 })
//!         .build();
//!
//!     assert_eq!(manager.entity_count(), 0);
//!     manager.refresh_manager_data();
//!     assert_eq!(manager.entity_count(), 1);
//!     assert!(manager.has_component::<Position>(&entity));
//! }
//! ember_memory::shutdown();
//! ```

#![deny(unsafe_code)]

#[allow(unsafe_code)]
pub mod archetype;
pub mod builder;
pub mod component;
#[allow(unsafe_code)]
pub mod component_data;
pub mod entity;
pub mod fingerprint;
#[allow(unsafe_code)]
pub mod manager;
#[allow(unsafe_code)]
pub mod query;

use component::ComponentId;
use entity::EntityId;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Why a `try_*` staging operation was rejected.
///
/// The public surface reports these as `false` returns; the error carries
/// the detail for the log line.
#[derive(Debug, thiserror::Error)]
pub enum EcsError {
    /// The component ID has no catalogue entry.
    #[error("component {0:?} is not registered")]
    UnregisteredComponent(ComponentId),

    /// The entity is not mapped to any committed archetype.
    #[error("entity {0} is not mapped to an archetype")]
    UnknownEntity(EntityId),

    /// The entity already has (or already stages) the component.
    #[error("entity {entity} already has component {component:?}")]
    DuplicateComponent {
        entity: EntityId,
        component: ComponentId,
    },

    /// The entity does not have the component.
    #[error("entity {entity} does not have component {component:?}")]
    MissingComponent {
        entity: EntityId,
        component: ComponentId,
    },

    /// The entity's fingerprint has no committed archetype.
    #[error("no archetype is committed for entity {0}")]
    MissingArchetype(EntityId),
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::archetype::Archetype;
    pub use crate::builder::{ArchetypeBuilder, EntityBuilder, EntityBuilderFromArchetype};
    pub use crate::component::{Component, ComponentCatalogue, ComponentId};
    pub use crate::component_data::ComponentData;
    pub use crate::entity::{Entity, EntityId};
    pub use crate::fingerprint::Fingerprint;
    pub use crate::manager::EntityManager;
    pub use crate::query::ComponentQuery;
    pub use crate::EcsError;
}

// ---------------------------------------------------------------------------
// Integration Tests
// ---------------------------------------------------------------------------
