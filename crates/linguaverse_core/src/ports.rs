//! crates/linguaverse_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture: the remote
//! identity/document service is consumed only through them, so the controller
//! never depends on a concrete backend.

use crate::domain::{AuthCredential, AuthUser, Message, SignInMethod, SocialProvider};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// An error reported by the remote service as a `(code, message)` pair.
///
/// Provider collisions additionally carry the conflicting email and, when the
/// attempted provider's credential could be rebuilt from the payload, that credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    pub code: String,
    pub message: String,
    pub email: Option<String>,
    pub credential: Option<AuthCredential>,
}

impl ProviderError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            email: None,
            credential: None,
        }
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.code)
    }
}

/// A generic error type for all port operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PortError {
    #[error("Provider error: {0}")]
    Provider(ProviderError),
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl PortError {
    pub fn provider(code: impl Into<String>, message: impl Into<String>) -> Self {
        PortError::Provider(ProviderError::new(code, message))
    }

    /// The provider error code, if this error came from the remote service.
    pub fn code(&self) -> Option<&str> {
        match self {
            PortError::Provider(err) => Some(&err.code),
            _ => None,
        }
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Listener Plumbing
//=========================================================================================

/// Callback invoked with every snapshot (or failure) of a subscription.
pub type Listener<T> = Arc<dyn Fn(PortResult<T>) + Send + Sync>;

/// Callback invoked with the new session on every authentication-state change.
pub type AuthStateListener = Arc<dyn Fn(Option<AuthUser>) + Send + Sync>;

/// Handle to an attached listener. Detaching (explicitly or by drop) guarantees the
/// callback is never invoked again.
pub struct ListenerRegistration {
    detach: Option<Box<dyn FnOnce() + Send>>,
}

impl ListenerRegistration {
    pub fn new(detach: impl FnOnce() + Send + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    /// A registration with nothing to tear down.
    pub fn noop() -> Self {
        Self { detach: None }
    }

    pub fn detach(mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for ListenerRegistration {
    fn drop(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl fmt::Debug for ListenerRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistration")
            .field("attached", &self.detach.is_some())
            .finish()
    }
}

//=========================================================================================
// Document Shapes
//=========================================================================================

/// A stored document: its id within the collection plus its raw fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Value,
}

impl Document {
    /// Decodes the fields into a typed value.
    pub fn decode<T: serde::de::DeserializeOwned>(&self) -> PortResult<T> {
        serde_json::from_value(self.fields.clone()).map_err(|e| {
            PortError::Unexpected(format!("Malformed document {}: {}", self.id, e))
        })
    }
}

/// A collection subscription, optionally ordered ascending by one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionQuery {
    pub path: String,
    pub order_by: Option<String>,
}

impl CollectionQuery {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            order_by: None,
        }
    }

    pub fn order_by(mut self, field: impl Into<String>) -> Self {
        self.order_by = Some(field.into());
        self
    }
}

/// Result of a successful popup sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocialSignIn {
    pub user: AuthUser,
    pub credential: AuthCredential,
    pub is_new_user: bool,
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait IdentityService: Send + Sync {
    async fn create_user_with_email(&self, email: &str, password: &str) -> PortResult<AuthUser>;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> PortResult<AuthUser>;

    /// Runs the provider's interactive popup flow.
    async fn sign_in_with_provider(&self, provider: SocialProvider) -> PortResult<SocialSignIn>;

    async fn sign_out(&self) -> PortResult<()>;

    /// Sign-in methods already registered for an email. Some providers return an
    /// empty list even for existing accounts.
    async fn fetch_sign_in_methods(&self, email: &str) -> PortResult<Vec<SignInMethod>>;

    /// Links `credential` onto the account `user` is signed in to.
    async fn link_credential(
        &self,
        user: &AuthUser,
        credential: &AuthCredential,
    ) -> PortResult<AuthUser>;

    fn current_user(&self) -> Option<AuthUser>;

    /// Subscribes to session changes. The listener is invoked once with the current
    /// session immediately after registration.
    ///
    /// Implementations must invoke the listener for a change before the call that caused
    /// it resolves. `App` drains its queue right after each sign-in, so the new session
    /// is applied before any follow-up work (profile writes, credential linking). A
    /// notification delivered later would reset a linking request re-entered after a
    /// failed link.
    fn on_auth_state_changed(&self, listener: AuthStateListener) -> ListenerRegistration;
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Subscribes to one document; `None` means the document does not exist.
    fn listen_document(&self, path: &str, listener: Listener<Option<Document>>)
        -> ListenerRegistration;

    fn listen_collection(
        &self,
        query: CollectionQuery,
        listener: Listener<Vec<Document>>,
    ) -> ListenerRegistration;

    /// Writes a document. With `merge`, only the given top-level fields are replaced.
    async fn set_document(&self, path: &str, fields: Value, merge: bool) -> PortResult<()>;

    /// Partially updates an existing document.
    async fn update_document(&self, path: &str, fields: Value) -> PortResult<()>;

    /// Adds a document with a server-assigned id, returning that id.
    async fn add_document(&self, collection: &str, fields: Value) -> PortResult<String>;
}

#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Stores a message, assigning its id and timestamp server-side.
    async fn add_message(&self, text: &str, author_id: &str) -> PortResult<Message>;
}
