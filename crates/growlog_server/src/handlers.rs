//! Request handlers.

use crate::auth::{AuthError, Claims, TokenSigner};
use crate::decode::decode_json;
use crate::error::ServerError;
use crate::password;
use crate::response::Response;
use growlog_engine::{Actor, DeleteItem, Engine, EngineError};
use growlog_model::{End, ObjectId, Syncable, User};
use growlog_store::{Store, UserStore};
use serde::Deserialize;
use std::time::{SystemTime, UNIX_EPOCH};

/// The diary service: an engine plus a token signer, exposing one
/// method per route.
#[derive(Debug)]
pub struct DiaryService<S> {
    engine: Engine<S>,
    signer: TokenSigner,
}

impl<S> Clone for DiaryService<S> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            signer: self.signer.clone(),
        }
    }
}

/// Wire shape of a delete batch.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DeleteBatch {
    deletes: Vec<DeleteWireItem>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DeleteWireItem {
    id: ObjectId,
    #[serde(rename = "type")]
    kind: String,
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as u64)
}

impl<S: Store> DiaryService<S> {
    /// Creates the service.
    pub fn new(engine: Engine<S>, signer: TokenSigner) -> Self {
        Self { engine, signer }
    }

    /// The underlying engine.
    pub fn engine(&self) -> &Engine<S> {
        &self.engine
    }

    fn claims(&self, token: Option<&str>) -> Result<Claims, ServerError> {
        let token = token.ok_or(AuthError::Malformed)?;
        Ok(self.signer.verify(token, now_ms())?)
    }

    /// Resolves the acting (user, end) pair from a sync token.
    fn actor(&self, token: Option<&str>) -> Result<Actor, ServerError> {
        let claims = self.claims(token)?;
        let end_id = claims
            .end_id
            .ok_or_else(|| ServerError::Validation("Missing userEndID".into()))?;
        Ok(Actor::new(claims.user_id, end_id))
    }

    /// `POST /user`: registers an account.
    pub fn create_user(&self, body: &[u8]) -> Result<Response, ServerError> {
        let mut user: User = decode_json(body)?;
        let nickname = user.nickname.trim().to_string();
        if !(4..=21).contains(&nickname.chars().count()) {
            return Err(ServerError::Validation(
                "Nickname must be between 4 and 21 characters".into(),
            ));
        }
        if user.password.is_empty() {
            return Err(ServerError::Validation("Password must not be empty".into()));
        }
        user.nickname = nickname;
        user.password = password::hash(&user.password);
        let now = now_ms();
        user.cat = now;
        user.uat = now;

        let id = self
            .engine
            .store()
            .insert_user(&user)
            .map_err(EngineError::from)?;
        tracing::info!(user = %id, "created user");
        Ok(Response::created_user(id))
    }

    /// `POST /login`: checks credentials and mints a user-only token.
    pub fn login(&self, body: &[u8]) -> Result<Response, ServerError> {
        let creds: User = decode_json(body)?;
        let user = self
            .engine
            .store()
            .user_by_handle(&creds.nickname)
            .map_err(EngineError::from)?
            .ok_or(ServerError::BadCredentials)?;
        if !password::verify(&creds.password, &user.password) {
            return Err(ServerError::BadCredentials);
        }
        let user_id = user
            .id
            .ok_or_else(|| ServerError::Validation("user record without an ID".into()))?;
        let token = self.signer.sign(&Claims {
            user_id,
            end_id: None,
            issued_at_ms: now_ms(),
        });
        Ok(Response::token(&token))
    }

    /// `POST /userend`: registers an end under the logged-in user and
    /// mints the (user, end) token sync endpoints require.
    pub fn register_end(&self, token: Option<&str>, body: &[u8]) -> Result<Response, ServerError> {
        let claims = self.claims(token)?;
        let end: End = decode_json(body)?;
        let now = now_ms();
        let end_id = self.engine.register_end(claims.user_id, end.name, now)?;
        let token = self.signer.sign(&Claims {
            user_id: claims.user_id,
            end_id: Some(end_id),
            issued_at_ms: now,
        });
        Ok(Response::created_end(end_id, &token))
    }

    /// `POST /<kind>`: inserts a record.
    pub fn insert<E: Syncable + 'static>(
        &self,
        token: Option<&str>,
        body: &[u8],
    ) -> Result<Response, ServerError>
    where
        S: growlog_store::EntityStore<E> + 'static,
    {
        let actor = self.actor(token)?;
        let entity: E = decode_json(body)?;
        let id = self.engine.insert(actor, entity, now_ms())?;
        Ok(Response::created(id))
    }

    /// `PUT /<kind>`: updates a record, last write wins.
    pub fn update<E: Syncable + 'static>(
        &self,
        token: Option<&str>,
        body: &[u8],
    ) -> Result<Response, ServerError>
    where
        S: growlog_store::EntityStore<E> + 'static,
    {
        let actor = self.actor(token)?;
        let entity: E = decode_json(body)?;
        self.engine.update(actor, entity, now_ms())?;
        Ok(Response::ok())
    }

    /// `GET /sync<Kind>s`: returns the acting end's dirty backlog.
    pub fn pull<E: Syncable>(&self, token: Option<&str>) -> Result<Response, ServerError>
    where
        S: growlog_store::EntityStore<E>,
    {
        let actor = self.actor(token)?;
        let items: Vec<E> = self.engine.backlog(actor)?;
        Response::items(&items)
    }

    /// `POST /<kind>/:id/sync`: acknowledges one pulled record.
    pub fn ack<E: Syncable>(
        &self,
        token: Option<&str>,
        id: &str,
    ) -> Result<Response, ServerError> {
        let actor = self.actor(token)?;
        let object_id = parse_object_id(id)?;
        self.engine.acknowledge::<E>(actor, object_id)?;
        Ok(Response::ok())
    }

    /// `POST /plant/:id/archive`: archives a plant subtree.
    pub fn archive(&self, token: Option<&str>, id: &str) -> Result<Response, ServerError> {
        let actor = self.actor(token)?;
        let plant_id = parse_object_id(id)?;
        self.engine.archive_plant(actor, plant_id, now_ms())?;
        Ok(Response::ok())
    }

    /// `POST /deletes`: applies a batch of soft-deletes.
    pub fn deletes(&self, token: Option<&str>, body: &[u8]) -> Result<Response, ServerError> {
        let actor = self.actor(token)?;
        let batch: DeleteBatch = decode_json(body)?;
        let items: Vec<DeleteItem> = batch
            .deletes
            .into_iter()
            .map(|item| DeleteItem {
                kind: item.kind,
                id: item.id,
            })
            .collect();
        self.engine.apply_deletes(actor, &items, now_ms())?;
        Ok(Response::ok())
    }
}

fn parse_object_id(id: &str) -> Result<ObjectId, ServerError> {
    id.parse()
        .map_err(|_| ServerError::Validation("Missing object's ID".into()))
}
