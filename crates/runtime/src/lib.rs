//! Runtime orchestration for the realm turn scheduler.
//!
//! This crate wraps [`realm_core::TurnEngine`] in an async service: a single
//! worker owns the world, turns run against a working copy that is committed
//! only on success, and progress is broadcast on a topic-based event bus.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides topic-based event bus for flexible event routing
//! - [`hooks`] plugs turn-level behaviour into the engine's hook points
//! - [`repository`] saves and loads worlds between turns
//! - `workers` keeps background tasks internal to the crate
pub mod api;
pub mod events;
pub mod hooks;
pub mod repository;
pub mod runtime;

mod workers;

pub use api::{Result, RuntimeError, RuntimeHandle};
pub use events::{CommandNotice, Event, EventBus, Topic, TurnEvent};
pub use hooks::{
    ConsistencyHook, HookCriticality, HookPhase, HookRegistry, StandingOrderHook, TurnHook,
};
pub use repository::{
    FileWorldRepository, InMemoryWorldRepo, RepositoryError, WorldRepository,
};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig, default_data_dir};
