//! crates/linguaverse_core/src/memory.rs
//!
//! An in-process implementation of every port, for tests and local development.
//!
//! It follows the remote service's observable behaviour closely enough to drive the
//! whole client: one account per email, provider collisions, popup identities scripted
//! per provider, real-time listeners with initial snapshots, and injectable failures.
//!
//! ```rust,ignore
//! let backend = MemoryBackend::new();
//! backend.set_popup_identity(SocialProvider::Google, PopupIdentity::new("ana@gmail.com", "g-ana"));
//! let app = App::new(Arc::new(backend.clone()), Arc::new(backend.clone()));
//! ```

use crate::domain::{AuthCredential, AuthUser, Message, SignInMethod, SocialProvider};
use crate::errors::{AuthErrorCode, ACCOUNT_EXISTS_WITH_DIFFERENT_CREDENTIAL};
use crate::ports::{
    AuthStateListener, CollectionQuery, Document, DocumentStore, IdentityService, Listener,
    ListenerRegistration, MessageStore, PortError, PortResult, ProviderError, SocialSignIn,
};
use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};
use async_trait::async_trait;
use chrono::Utc;
use regex::Regex;
use serde_json::{json, Map, Value};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, Weak};
use uuid::Uuid;

pub const MESSAGES_COLLECTION: &str = "messages";
const MIN_PASSWORD_LENGTH: usize = 6;

fn is_valid_email(email: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
        })
        .is_match(email)
}

/// Operations that can be made to fail once with an injected provider code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateUser,
    SignInWithPassword,
    SignInWithProvider,
    SignOut,
    FetchSignInMethods,
    LinkCredential,
    SetDocument,
    UpdateDocument,
    AddDocument,
}

/// The identity a provider popup returns when the user completes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupIdentity {
    pub email: String,
    /// Provider-side subject; doubles as the credential's id token.
    pub subject: String,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

impl PopupIdentity {
    pub fn new(email: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            subject: subject.into(),
            display_name: None,
            photo_url: None,
        }
    }

    pub fn with_profile(mut self, display_name: &str, photo_url: &str) -> Self {
        self.display_name = Some(display_name.to_string());
        self.photo_url = Some(photo_url.to_string());
        self
    }
}

#[derive(Debug, Clone)]
struct Account {
    uid: String,
    email: String,
    password_hash: Option<String>,
    providers: BTreeSet<SocialProvider>,
    display_name: Option<String>,
    photo_url: Option<String>,
    disabled: bool,
}

impl Account {
    fn to_user(&self) -> AuthUser {
        AuthUser {
            uid: self.uid.clone(),
            email: Some(self.email.clone()),
            display_name: self.display_name.clone(),
            photo_url: self.photo_url.clone(),
        }
    }

    fn methods(&self) -> Vec<SignInMethod> {
        let password = self.password_hash.as_ref().map(|_| SignInMethod::Password);
        password
            .into_iter()
            .chain(self.providers.iter().map(|p| SignInMethod::from(*p)))
            .collect()
    }
}

#[derive(Debug, Clone)]
struct StoredDocument {
    fields: Value,
    seq: u64,
}

#[derive(Default)]
struct State {
    // --- Identity ---
    accounts: HashMap<String, Account>,
    uid_by_email: HashMap<String, String>,
    uid_by_subject: HashMap<(SocialProvider, String), String>,
    popups: HashMap<SocialProvider, PopupIdentity>,
    current: Option<String>,
    enumeration_protection: bool,
    unrecoverable_collisions: bool,
    failures: HashMap<Operation, String>,
    auth_listeners: HashMap<u64, AuthStateListener>,

    // --- Documents ---
    documents: BTreeMap<String, StoredDocument>,
    next_seq: u64,
    denied_prefixes: Vec<String>,
    document_listeners: HashMap<u64, (String, Listener<Option<Document>>)>,
    collection_listeners: HashMap<u64, (CollectionQuery, Listener<Vec<Document>>)>,
    next_listener: u64,
}

/// Deliveries computed under the lock and invoked after it is released.
#[derive(Default)]
struct Outbox {
    auth: Vec<(AuthStateListener, Option<AuthUser>)>,
    documents: Vec<(Listener<Option<Document>>, Option<Document>)>,
    collections: Vec<(Listener<Vec<Document>>, Vec<Document>)>,
}

impl Outbox {
    fn deliver(self) {
        for (listener, user) in self.auth {
            listener(user);
        }
        for (listener, document) in self.documents {
            listener(Ok(document));
        }
        for (listener, documents) in self.collections {
            listener(Ok(documents));
        }
    }
}

struct Inner {
    state: Mutex<State>,
    hasher: Argon2<'static>,
}

/// Shared handle; clones see the same accounts and documents.
#[derive(Clone)]
pub struct MemoryBackend {
    inner: Arc<Inner>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn provider_error(code: AuthErrorCode, message: &str) -> PortError {
    PortError::provider(code.as_str(), message)
}

fn email_in_use() -> PortError {
    provider_error(
        AuthErrorCode::EmailAlreadyInUse,
        "The email address is already in use by another account.",
    )
}

fn account_disabled() -> PortError {
    provider_error(
        AuthErrorCode::UserDisabled,
        "The user account has been disabled by an administrator.",
    )
}

fn permission_denied() -> PortError {
    PortError::provider("permission-denied", "Missing or insufficient permissions.")
}

fn split_path(path: &str) -> PortResult<(&str, &str)> {
    path.rsplit_once('/')
        .filter(|(collection, id)| !collection.is_empty() && !id.is_empty())
        .ok_or_else(|| PortError::Unexpected(format!("Invalid document path: {}", path)))
}

fn compare_fields(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        _ => Ordering::Equal,
    }
}

impl State {
    fn is_denied(&self, path: &str) -> bool {
        self.denied_prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
    }

    fn take_failure(&mut self, operation: Operation) -> PortResult<()> {
        match self.failures.remove(&operation) {
            Some(code) => Err(PortError::provider(
                code,
                format!("Injected failure for {:?}", operation),
            )),
            None => Ok(()),
        }
    }

    fn current_user(&self) -> Option<AuthUser> {
        self.current
            .as_ref()
            .and_then(|uid| self.accounts.get(uid))
            .map(Account::to_user)
    }

    fn set_current(&mut self, uid: Option<String>, outbox: &mut Outbox) {
        if self.current == uid {
            return;
        }
        self.current = uid;
        let user = self.current_user();
        outbox
            .auth
            .extend(self.auth_listeners.values().map(|l| (l.clone(), user.clone())));
    }

    fn next_listener_id(&mut self) -> u64 {
        self.next_listener += 1;
        self.next_listener
    }

    fn snapshot(&self, path: &str) -> Option<Document> {
        let (_, id) = split_path(path).ok()?;
        self.documents.get(path).map(|stored| Document {
            id: id.to_string(),
            fields: stored.fields.clone(),
        })
    }

    fn query(&self, query: &CollectionQuery) -> Vec<Document> {
        let mut matches: Vec<(&String, &StoredDocument)> = self
            .documents
            .iter()
            .filter(|(path, _)| {
                matches!(split_path(path), Ok((parent, _)) if parent == query.path)
            })
            .collect();
        matches.sort_by_key(|(_, stored)| stored.seq);

        if let Some(field) = &query.order_by {
            matches.retain(|(_, stored)| stored.fields.get(field).is_some());
            matches.sort_by(|(_, a), (_, b)| {
                compare_fields(a.fields.get(field), b.fields.get(field))
            });
        }

        matches
            .into_iter()
            .filter_map(|(path, stored)| {
                split_path(path).ok().map(|(_, id)| Document {
                    id: id.to_string(),
                    fields: stored.fields.clone(),
                })
            })
            .collect()
    }

    /// Stores `fields` at `path` and queues notifications if anything changed.
    fn write(
        &mut self,
        path: &str,
        fields: Value,
        merge: bool,
        outbox: &mut Outbox,
    ) -> PortResult<()> {
        let (parent, _) = split_path(path)?;
        let Value::Object(incoming) = fields else {
            return Err(PortError::Unexpected("Document fields must be an object".to_string()));
        };

        let existing = self.documents.get(path);
        let merged = match (merge, existing) {
            (true, Some(stored)) => {
                let mut base: Map<String, Value> =
                    stored.fields.as_object().cloned().unwrap_or_default();
                base.extend(incoming);
                Value::Object(base)
            }
            _ => Value::Object(incoming),
        };

        if existing.is_some_and(|stored| stored.fields == merged) {
            return Ok(());
        }

        let seq = match existing {
            Some(stored) => stored.seq,
            None => {
                self.next_seq += 1;
                self.next_seq
            }
        };
        self.documents
            .insert(path.to_string(), StoredDocument { fields: merged, seq });
        self.notify_path(path, parent, outbox);
        Ok(())
    }

    fn notify_path(&self, path: &str, parent: &str, outbox: &mut Outbox) {
        let snapshot = self.snapshot(path);
        outbox.documents.extend(
            self.document_listeners
                .values()
                .filter(|(watched, _)| watched == path)
                .map(|(_, listener)| (listener.clone(), snapshot.clone())),
        );
        outbox.collections.extend(
            self.collection_listeners
                .values()
                .filter(|(query, _)| query.path == parent)
                .map(|(query, listener)| (listener.clone(), self.query(query))),
        );
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        // Minimum cost parameters: this backend never holds real passwords.
        let params = Params::new(
            Params::MIN_M_COST,
            Params::MIN_T_COST,
            Params::MIN_P_COST,
            None,
        )
        .unwrap_or_default();
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State::default()),
                hasher: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn registration(&self, remove: fn(&mut State, u64), id: u64) -> ListenerRegistration {
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        ListenerRegistration::new(move || {
            if let Some(inner) = weak.upgrade() {
                let mut state = inner.state.lock().unwrap_or_else(PoisonError::into_inner);
                remove(&mut state, id);
            }
        })
    }

    //=====================================================================================
    // Scripting
    //=====================================================================================

    /// Sets the identity returned by the next popups for `provider`. Without one, the
    /// popup behaves as if the user closed it.
    pub fn set_popup_identity(&self, provider: SocialProvider, identity: PopupIdentity) {
        self.lock().popups.insert(provider, identity);
    }

    pub fn clear_popup_identity(&self, provider: SocialProvider) {
        self.lock().popups.remove(&provider);
    }

    /// When enabled, method lookups return an empty list for every email.
    pub fn set_email_enumeration_protection(&self, enabled: bool) {
        self.lock().enumeration_protection = enabled;
    }

    /// When enabled, collision errors carry no credential.
    pub fn set_unrecoverable_collisions(&self, enabled: bool) {
        self.lock().unrecoverable_collisions = enabled;
    }

    /// Makes the next call of `operation` fail with `code`.
    pub fn fail_next(&self, operation: Operation, code: &str) {
        self.lock().failures.insert(operation, code.to_string());
    }

    pub fn disable_account(&self, email: &str) {
        let mut state = self.lock();
        let uid = state.uid_by_email.get(&email.to_lowercase()).cloned();
        if let Some(account) = uid.and_then(|uid| state.accounts.get_mut(&uid)) {
            account.disabled = true;
        }
    }

    /// Makes reads under `prefix` fail with `permission-denied`.
    pub fn deny_reads(&self, prefix: &str) {
        self.lock().denied_prefixes.push(prefix.to_string());
    }

    /// Writes a document directly, notifying listeners.
    pub fn put_document(&self, path: &str, fields: Value) -> PortResult<()> {
        let mut outbox = Outbox::default();
        self.lock().write(path, fields, false, &mut outbox)?;
        outbox.deliver();
        Ok(())
    }

    pub fn delete_document(&self, path: &str) {
        let mut outbox = Outbox::default();
        {
            let mut state = self.lock();
            if state.documents.remove(path).is_some() {
                if let Ok((parent, _)) = split_path(path) {
                    state.notify_path(path, parent, &mut outbox);
                }
            }
        }
        outbox.deliver();
    }

    pub fn document(&self, path: &str) -> Option<Value> {
        self.lock().documents.get(path).map(|stored| stored.fields.clone())
    }

    pub fn sign_in_methods(&self, email: &str) -> Vec<SignInMethod> {
        let state = self.lock();
        state
            .uid_by_email
            .get(&email.to_lowercase())
            .and_then(|uid| state.accounts.get(uid))
            .map(Account::methods)
            .unwrap_or_default()
    }

    pub fn auth_listener_count(&self) -> usize {
        self.lock().auth_listeners.len()
    }

    pub fn document_listener_count(&self) -> usize {
        self.lock().document_listeners.len()
    }

    pub fn collection_listener_count(&self) -> usize {
        self.lock().collection_listeners.len()
    }

    fn hash_password(&self, password: &str) -> PortResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.inner
            .hasher
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PortError::Unexpected(format!("Failed to hash password: {}", e)))
    }

    fn verify_password(&self, password: &str, hash: &str) -> bool {
        PasswordHash::new(hash)
            .map(|parsed| {
                self.inner
                    .hasher
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    }
}

//=========================================================================================
// `IdentityService` Trait Implementation
//=========================================================================================

#[async_trait]
impl IdentityService for MemoryBackend {
    async fn create_user_with_email(&self, email: &str, password: &str) -> PortResult<AuthUser> {
        self.lock().take_failure(Operation::CreateUser)?;
        if !is_valid_email(email) {
            return Err(provider_error(
                AuthErrorCode::InvalidEmail,
                "The email address is badly formatted.",
            ));
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(provider_error(
                AuthErrorCode::WeakPassword,
                "Password should be at least 6 characters.",
            ));
        }
        let key = email.to_lowercase();
        if self.lock().uid_by_email.contains_key(&key) {
            return Err(email_in_use());
        }

        let password_hash = self.hash_password(password)?;
        let mut outbox = Outbox::default();
        let user = {
            let mut state = self.lock();
            // Re-checked under the lock: hashing happened outside it.
            if state.uid_by_email.contains_key(&key) {
                return Err(email_in_use());
            }
            let account = Account {
                uid: Uuid::new_v4().simple().to_string(),
                email: key.clone(),
                password_hash: Some(password_hash),
                providers: BTreeSet::new(),
                display_name: None,
                photo_url: None,
                disabled: false,
            };
            let user = account.to_user();
            state.uid_by_email.insert(key, account.uid.clone());
            state.accounts.insert(account.uid.clone(), account);
            state.set_current(Some(user.uid.clone()), &mut outbox);
            user
        };
        outbox.deliver();
        Ok(user)
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> PortResult<AuthUser> {
        let account = {
            let mut state = self.lock();
            state.take_failure(Operation::SignInWithPassword)?;
            if !is_valid_email(email) {
                return Err(provider_error(
                    AuthErrorCode::InvalidEmail,
                    "The email address is badly formatted.",
                ));
            }
            state
                .uid_by_email
                .get(&email.to_lowercase())
                .and_then(|uid| state.accounts.get(uid))
                .cloned()
                .ok_or_else(|| {
                    provider_error(
                        AuthErrorCode::UserNotFound,
                        "There is no user record for this email.",
                    )
                })?
        };

        if account.disabled {
            return Err(account_disabled());
        }
        let verified = account
            .password_hash
            .as_deref()
            .is_some_and(|hash| self.verify_password(password, hash));
        if !verified {
            return Err(provider_error(AuthErrorCode::WrongPassword, "The password is invalid."));
        }

        let mut outbox = Outbox::default();
        self.lock().set_current(Some(account.uid.clone()), &mut outbox);
        outbox.deliver();
        Ok(account.to_user())
    }

    async fn sign_in_with_provider(&self, provider: SocialProvider) -> PortResult<SocialSignIn> {
        let mut outbox = Outbox::default();
        let result = {
            let mut state = self.lock();
            state.take_failure(Operation::SignInWithProvider)?;
            let identity = state.popups.get(&provider).cloned().ok_or_else(|| {
                provider_error(
                    AuthErrorCode::PopupClosedByUser,
                    "The popup has been closed by the user.",
                )
            })?;
            let credential = AuthCredential {
                provider,
                id_token: identity.subject.clone(),
                access_token: Some(format!("access-{}", identity.subject)),
            };
            let subject_key = (provider, identity.subject.clone());
            let email_key = identity.email.to_lowercase();

            let linked_uid = state.uid_by_subject.get(&subject_key).cloned();
            let email_uid = state.uid_by_email.get(&email_key).cloned();
            let (account, is_new_user) = match linked_uid {
                Some(uid) => {
                    let account = state
                        .accounts
                        .get(&uid)
                        .cloned()
                        .ok_or_else(|| PortError::NotFound(format!("Account {} not found", uid)))?;
                    (account, false)
                }
                None => match email_uid {
                    Some(uid) => {
                        let mut err = ProviderError::new(
                            ACCOUNT_EXISTS_WITH_DIFFERENT_CREDENTIAL,
                            "An account already exists with the same email address but different sign-in credentials.",
                        );
                        err.email = Some(identity.email.clone());
                        if !state.unrecoverable_collisions {
                            err.credential = Some(credential);
                        }
                        tracing::debug!(
                            "Popup for {} collides with account {}",
                            provider.provider_id(),
                            uid
                        );
                        return Err(PortError::Provider(err));
                    }
                    None => {
                        let account = Account {
                            uid: Uuid::new_v4().simple().to_string(),
                            email: email_key.clone(),
                            password_hash: None,
                            providers: BTreeSet::from([provider]),
                            display_name: identity.display_name.clone(),
                            photo_url: identity.photo_url.clone(),
                            disabled: false,
                        };
                        state.uid_by_email.insert(email_key, account.uid.clone());
                        state.uid_by_subject.insert(subject_key, account.uid.clone());
                        state.accounts.insert(account.uid.clone(), account.clone());
                        (account, true)
                    }
                },
            };

            if account.disabled {
                return Err(account_disabled());
            }
            state.set_current(Some(account.uid.clone()), &mut outbox);
            SocialSignIn {
                user: account.to_user(),
                credential,
                is_new_user,
            }
        };
        outbox.deliver();
        Ok(result)
    }

    async fn sign_out(&self) -> PortResult<()> {
        let mut outbox = Outbox::default();
        {
            let mut state = self.lock();
            state.take_failure(Operation::SignOut)?;
            state.set_current(None, &mut outbox);
        }
        outbox.deliver();
        Ok(())
    }

    async fn fetch_sign_in_methods(&self, email: &str) -> PortResult<Vec<SignInMethod>> {
        let protected = {
            let mut state = self.lock();
            state.take_failure(Operation::FetchSignInMethods)?;
            state.enumeration_protection
        };
        if protected {
            return Ok(Vec::new());
        }
        Ok(self.sign_in_methods(email))
    }

    async fn link_credential(
        &self,
        user: &AuthUser,
        credential: &AuthCredential,
    ) -> PortResult<AuthUser> {
        let mut state = self.lock();
        state.take_failure(Operation::LinkCredential)?;
        let subject_key = (credential.provider, credential.id_token.clone());
        if let Some(owner) = state.uid_by_subject.get(&subject_key) {
            if owner != &user.uid {
                return Err(provider_error(
                    AuthErrorCode::CredentialAlreadyInUse,
                    "This credential is already associated with a different user account.",
                ));
            }
        }

        let account = state
            .accounts
            .get_mut(&user.uid)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user.uid)))?;
        if !account.providers.insert(credential.provider) {
            return Err(provider_error(
                AuthErrorCode::ProviderAlreadyLinked,
                "User can only be linked to one identity for the given provider.",
            ));
        }
        let linked = account.to_user();
        state.uid_by_subject.insert(subject_key, user.uid.clone());
        Ok(linked)
    }

    fn current_user(&self) -> Option<AuthUser> {
        self.lock().current_user()
    }

    fn on_auth_state_changed(&self, listener: AuthStateListener) -> ListenerRegistration {
        let (id, user) = {
            let mut state = self.lock();
            let id = state.next_listener_id();
            state.auth_listeners.insert(id, listener.clone());
            (id, state.current_user())
        };
        listener(user);
        self.registration(
            |state, id| {
                state.auth_listeners.remove(&id);
            },
            id,
        )
    }
}

//=========================================================================================
// `DocumentStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl DocumentStore for MemoryBackend {
    fn listen_document(
        &self,
        path: &str,
        listener: Listener<Option<Document>>,
    ) -> ListenerRegistration {
        let (id, snapshot) = {
            let mut state = self.lock();
            if state.is_denied(path) {
                drop(state);
                listener(Err(permission_denied()));
                return ListenerRegistration::noop();
            }
            let id = state.next_listener_id();
            state
                .document_listeners
                .insert(id, (path.to_string(), listener.clone()));
            (id, state.snapshot(path))
        };
        listener(Ok(snapshot));
        self.registration(
            |state, id| {
                state.document_listeners.remove(&id);
            },
            id,
        )
    }

    fn listen_collection(
        &self,
        query: CollectionQuery,
        listener: Listener<Vec<Document>>,
    ) -> ListenerRegistration {
        let (id, snapshot) = {
            let mut state = self.lock();
            if state.is_denied(&query.path) {
                drop(state);
                listener(Err(permission_denied()));
                return ListenerRegistration::noop();
            }
            let id = state.next_listener_id();
            let snapshot = state.query(&query);
            state.collection_listeners.insert(id, (query, listener.clone()));
            (id, snapshot)
        };
        listener(Ok(snapshot));
        self.registration(
            |state, id| {
                state.collection_listeners.remove(&id);
            },
            id,
        )
    }

    async fn set_document(&self, path: &str, fields: Value, merge: bool) -> PortResult<()> {
        let mut outbox = Outbox::default();
        {
            let mut state = self.lock();
            state.take_failure(Operation::SetDocument)?;
            state.write(path, fields, merge, &mut outbox)?;
        }
        outbox.deliver();
        Ok(())
    }

    async fn update_document(&self, path: &str, fields: Value) -> PortResult<()> {
        let mut outbox = Outbox::default();
        {
            let mut state = self.lock();
            state.take_failure(Operation::UpdateDocument)?;
            if !state.documents.contains_key(path) {
                return Err(PortError::provider(
                    "not-found",
                    format!("No document to update: {}", path),
                ));
            }
            state.write(path, fields, true, &mut outbox)?;
        }
        outbox.deliver();
        Ok(())
    }

    async fn add_document(&self, collection: &str, fields: Value) -> PortResult<String> {
        let id = Uuid::new_v4().simple().to_string();
        let mut outbox = Outbox::default();
        {
            let mut state = self.lock();
            state.take_failure(Operation::AddDocument)?;
            state.write(&format!("{}/{}", collection, id), fields, false, &mut outbox)?;
        }
        outbox.deliver();
        Ok(id)
    }
}

//=========================================================================================
// `MessageStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl MessageStore for MemoryBackend {
    async fn add_message(&self, text: &str, author_id: &str) -> PortResult<Message> {
        let timestamp = Utc::now();
        let id = self
            .add_document(
                MESSAGES_COLLECTION,
                json!({ "text": text, "authorId": author_id, "timestamp": timestamp }),
            )
            .await?;
        Ok(Message {
            id,
            text: text.to_string(),
            author_id: author_id.to_string(),
            timestamp,
        })
    }
}
