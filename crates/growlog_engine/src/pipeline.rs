//! The mutation pipeline.
//!
//! Every insert and update flows through an ordered chain of stages over
//! a shared [`MutationContext`]. A stage either transforms the context
//! (stamping ownership, persisting, fanning out shadow rows) or rejects
//! the mutation; the first error aborts the chain. Earlier stages catch
//! client mistakes, later stages touch storage, so a rejected request
//! leaves no partial writes before the persist stage.

use crate::access::{self, Actor};
use crate::error::{EngineError, EngineResult};
use growlog_model::{Object, ObjectId, OwnedObject, ParentLink, ShadowRow, Syncable};
use growlog_store::{EntityStore, Store};

/// Mutable request state threaded through the stages.
#[derive(Debug)]
pub struct MutationContext<E> {
    /// Who the request acts as.
    pub actor: Actor,
    /// The decoded entity, owned and rewritten in place.
    pub entity: E,
    /// Server-side timestamp for `cat`/`uat` stamping, unix milliseconds.
    pub now_ms: u64,
    /// The record's primary key, set by `require_id` (updates) or the
    /// persist stage (inserts).
    pub object_id: Option<ObjectId>,
}

impl<E: Syncable> MutationContext<E> {
    /// Creates the context for one mutation request.
    pub fn new(actor: Actor, entity: E, now_ms: u64) -> Self {
        Self {
            actor,
            entity,
            now_ms,
            object_id: None,
        }
    }
}

/// One step of the mutation pipeline.
pub trait Stage<S, E>: Send + Sync {
    /// Transforms or rejects the in-flight mutation.
    fn apply(&self, store: &S, ctx: &mut MutationContext<E>) -> EngineResult<()>;
}

impl<S, E, F> Stage<S, E> for F
where
    F: Fn(&S, &mut MutationContext<E>) -> EngineResult<()> + Send + Sync,
{
    fn apply(&self, store: &S, ctx: &mut MutationContext<E>) -> EngineResult<()> {
        self(store, ctx)
    }
}

/// An ordered chain of [`Stage`]s.
pub struct Pipeline<S, E> {
    stages: Vec<Box<dyn Stage<S, E>>>,
}

impl<S, E> Default for Pipeline<S, E> {
    fn default() -> Self {
        Self { stages: Vec::new() }
    }
}

impl<S, E> Pipeline<S, E> {
    /// Creates an empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a stage.
    #[must_use]
    pub fn then(mut self, stage: impl Stage<S, E> + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Runs the stages in order, stopping at the first error.
    pub fn run(&self, store: &S, ctx: &mut MutationContext<E>) -> EngineResult<()> {
        for stage in &self.stages {
            stage.apply(store, ctx)?;
        }
        Ok(())
    }
}

/// The insert chain: stamp, validate references, reject archived
/// subtrees, persist, fan out shadow rows to every end.
pub fn insert_pipeline<S: Store + EntityStore<E> + 'static, E: Syncable + 'static>(
) -> Pipeline<S, E> {
    Pipeline::new()
        .then(stamp_owner)
        .then(check_parent)
        .then(reject_archived_parent)
        .then(persist_insert)
        .then(fan_out)
}

/// The update chain: require the key, check the stored record's owner,
/// stamp, validate references, replace the row, dirty the peers.
pub fn update_pipeline<S: Store + EntityStore<E> + 'static, E: Syncable + 'static>(
) -> Pipeline<S, E> {
    Pipeline::new()
        .then(require_id)
        .then(check_record_owner)
        .then(stamp_owner)
        .then(check_parent)
        .then(persist_update)
        .then(mark_peers_dirty)
}

/// Overwrites the entity's owner from the token and stamps timestamps.
///
/// Client-supplied `userID` values are never trusted.
pub fn stamp_owner<S, E: Syncable>(_: &S, ctx: &mut MutationContext<E>) -> EngineResult<()> {
    ctx.entity.set_owner(ctx.actor.user_id);
    ctx.entity.stamp(ctx.now_ms);
    Ok(())
}

/// Requires a primary key on the wire body and records it in the
/// context.
pub fn require_id<S, E: Syncable>(_: &S, ctx: &mut MutationContext<E>) -> EngineResult<()> {
    let id = ctx.entity.id().ok_or(EngineError::MissingObjectId)?;
    ctx.object_id = Some(id);
    Ok(())
}

/// Checks that the stored record being updated belongs to the actor.
pub fn check_record_owner<S: Store, E: Syncable>(
    store: &S,
    ctx: &mut MutationContext<E>,
) -> EngineResult<()> {
    let id = ctx.object_id.ok_or(EngineError::MissingObjectId)?;
    access::require_owned(store, E::COLLECTION, id, ctx.actor.user_id)
}

/// Checks that the entity's parent reference, when present, exists and
/// belongs to the actor.
pub fn check_parent<S: Store, E: Syncable>(
    store: &S,
    ctx: &mut MutationContext<E>,
) -> EngineResult<()> {
    match ctx.entity.parent() {
        ParentLink::None | ParentLink::Optional { id: None, .. } => Ok(()),
        ParentLink::Required { collection, id }
        | ParentLink::Optional {
            collection,
            id: Some(id),
        } => access::require_owned(store, collection, id, ctx.actor.user_id),
    }
}

/// Rejects inserts under an archived plant subtree.
pub fn reject_archived_parent<S: Store, E: Syncable>(
    store: &S,
    ctx: &mut MutationContext<E>,
) -> EngineResult<()> {
    let (collection, id) = match ctx.entity.parent() {
        ParentLink::None | ParentLink::Optional { id: None, .. } => return Ok(()),
        ParentLink::Required { collection, id }
        | ParentLink::Optional {
            collection,
            id: Some(id),
        } => (collection, id),
    };
    if store.aggregate_archived(collection, id)? {
        return Err(EngineError::Archived);
    }
    Ok(())
}

/// Persists a new row, minting its primary key.
pub fn persist_insert<S: Store + EntityStore<E>, E: Syncable>(
    store: &S,
    ctx: &mut MutationContext<E>,
) -> EngineResult<()> {
    let id = EntityStore::<E>::insert(store, &ctx.entity)?;
    ctx.entity.set_id(id);
    ctx.object_id = Some(id);
    Ok(())
}

/// Replaces the stored row with the decoded one.
pub fn persist_update<S: Store + EntityStore<E>, E: Syncable>(
    store: &S,
    ctx: &mut MutationContext<E>,
) -> EngineResult<()> {
    EntityStore::<E>::update(store, &ctx.entity)?;
    Ok(())
}

/// Creates one shadow row per end of the owning user. The originator's
/// row is born `sent = true`, every other end's row `dirty = true`.
pub fn fan_out<S: Store, E: Syncable>(store: &S, ctx: &mut MutationContext<E>) -> EngineResult<()> {
    let id = ctx.object_id.ok_or(EngineError::MissingObjectId)?;
    let ends = store.ends_for_user(ctx.actor.user_id)?;
    let mut rows = 0;
    for end in &ends {
        let Some(end_id) = end.id else { continue };
        let row = if end_id == ctx.actor.end_id {
            ShadowRow::originator(end_id, id)
        } else {
            ShadowRow::pending(end_id, id)
        };
        store.insert_shadow(E::COLLECTION, row)?;
        rows += 1;
    }
    tracing::debug!(collection = %E::COLLECTION, object = %id, rows, "fanned out shadow rows");
    Ok(())
}

/// Dirties the shadow row of every peer end in one atomic statement,
/// leaving the originator's row untouched.
pub fn mark_peers_dirty<S: Store, E: Syncable>(
    store: &S,
    ctx: &mut MutationContext<E>,
) -> EngineResult<()> {
    let id = ctx.object_id.ok_or(EngineError::MissingObjectId)?;
    let dirtied =
        store.mark_dirty_except(E::COLLECTION, id, ctx.actor.end_id, ctx.actor.user_id)?;
    tracing::debug!(collection = %E::COLLECTION, object = %id, dirtied, "marked peer ends dirty");
    Ok(())
}
