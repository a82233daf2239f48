//! The engine facade.

use crate::access::Actor;
use crate::archive;
use crate::config::EngineConfig;
use crate::deletes::{self, DeleteItem, DeleteOutcome};
use crate::ends;
use crate::error::{EngineError, EngineResult};
use crate::pipeline::{insert_pipeline, update_pipeline, MutationContext};
use crate::sync;
use growlog_model::{EndId, ObjectId, Syncable, UserId};
use growlog_store::Store;
use std::sync::Arc;

/// The sync engine: one shared handle over a store, exposing every
/// diary operation the transport layer dispatches to.
///
/// Generic over the store so tests can wrap [`growlog_store::MemoryStore`]
/// with instrumented doubles.
#[derive(Debug)]
pub struct Engine<S> {
    store: Arc<S>,
    config: EngineConfig,
}

// Manual impl: a derive would demand `S: Clone`, but the store is
// shared behind the `Arc`, never cloned itself.
impl<S> Clone for Engine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
        }
    }
}

impl<S: Store> Engine<S> {
    /// Creates an engine with default configuration.
    pub fn new(store: Arc<S>) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    /// Creates an engine with explicit configuration.
    pub fn with_config(store: Arc<S>, config: EngineConfig) -> Self {
        Self { store, config }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Inserts a record through the mutation pipeline and returns the
    /// minted primary key.
    pub fn insert<E: Syncable + 'static>(
        &self,
        actor: Actor,
        entity: E,
        now_ms: u64,
    ) -> EngineResult<ObjectId>
    where
        S: growlog_store::EntityStore<E> + 'static,
    {
        let mut ctx = MutationContext::new(actor, entity, now_ms);
        insert_pipeline::<S, E>().run(&self.store, &mut ctx)?;
        ctx.object_id.ok_or(EngineError::MissingObjectId)
    }

    /// Updates a record through the mutation pipeline (last write wins).
    pub fn update<E: Syncable + 'static>(&self, actor: Actor, entity: E, now_ms: u64) -> EngineResult<()>
    where
        S: growlog_store::EntityStore<E> + 'static,
    {
        let mut ctx = MutationContext::new(actor, entity, now_ms);
        update_pipeline::<S, E>().run(&self.store, &mut ctx)
    }

    /// Returns the actor's dirty backlog for one collection.
    pub fn backlog<E: Syncable>(&self, actor: Actor) -> EngineResult<Vec<E>>
    where
        S: growlog_store::EntityStore<E>,
    {
        sync::backlog(self.store.as_ref(), actor)
    }

    /// Acknowledges one pulled record for the acting end.
    pub fn acknowledge<E: Syncable>(&self, actor: Actor, object_id: ObjectId) -> EngineResult<()> {
        sync::acknowledge::<S, E>(self.store.as_ref(), actor, object_id)
    }

    /// Archives a plant and cascades over its subtree.
    pub fn archive_plant(&self, actor: Actor, plant_id: ObjectId, now_ms: u64) -> EngineResult<()> {
        archive::archive_plant(self.store.as_ref(), actor, plant_id, now_ms)
    }

    /// Applies a batch of soft-deletes.
    pub fn apply_deletes(
        &self,
        actor: Actor,
        items: &[DeleteItem],
        now_ms: u64,
    ) -> EngineResult<DeleteOutcome> {
        deletes::apply_deletes(self.store.as_ref(), actor, items, now_ms)
    }

    /// Registers a new end under a user, backfilling its shadow rows
    /// per configuration.
    pub fn register_end(&self, user_id: UserId, name: String, now_ms: u64) -> EngineResult<EndId> {
        ends::register_end(self.store.as_ref(), &self.config, user_id, name, now_ms)
    }
}
