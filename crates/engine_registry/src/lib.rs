//! # engine_registry
//!
//! Entity ids and a component registry with reference-counted lifetimes.
//!
//! This crate provides:
//!
//! - [`Entity`] and [`EntityAllocator`]: `u64` entity ids, recycled oldest-first.
//! - [`Component`]: the contract every stored payload satisfies, including
//!   the [`FamilyId`] it is indexed under.
//! - [`ComponentRegistry`]: owns component records and indexes them by entity
//!   and by family. Records can be shared between registries with
//!   [`ComponentRegistry::attach_component`].
//! - [`ComponentHandle`]: an external reference to a record. While any handle
//!   (or another registry) refers to a record, the registry refuses to
//!   release it or reuse its id.
//! - [`SlotReport`]: per-slot diagnostics, also logged by
//!   [`ComponentRegistry::dump`].

pub mod component;
pub mod config;
pub mod diagnostics;
pub mod entity;
pub mod error;
pub mod handle;
pub mod recycle;
pub mod registry;

pub use component::{Component, ComponentHeader, ComponentId, FamilyId, Payload};
pub use config::RegistryConfig;
pub use diagnostics::{SlotReport, SlotState};
pub use entity::{Entity, EntityAllocator};
pub use error::{AllocError, RegistryError};
pub use handle::ComponentHandle;
pub use recycle::RecycleQueue;
pub use registry::ComponentRegistry;
