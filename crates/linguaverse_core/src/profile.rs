//! crates/linguaverse_core/src/profile.rs
//!
//! Mirrors the signed-in user's profile document into local state and persists edits.

use crate::app::{App, StatusMessage};
use crate::domain::{AuthUser, Profile, ProfileUpdate};
use crate::errors::describe_port_error;
use crate::events::{profile_event, EventSink, ListenerId, Subscription};
use crate::ports::{Document, DocumentStore, PortError, PortResult};
use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{error, info};

pub const PROFILE_SAVED_MESSAGE: &str = "Profile saved.";

/// Path of the profile document for `uid`.
pub fn profile_path(uid: &str) -> String {
    format!("users/{}", uid)
}

/// Local mirror of the profile document plus the edit buffers bound to the form.
#[derive(Debug, Default)]
pub struct ProfileSynchronizer {
    subscription: Option<Subscription>,
    profile: Option<Profile>,
    display_name_input: String,
    native_language_input: String,
}

impl ProfileSynchronizer {
    pub fn attach(&mut self, store: &dyn DocumentStore, sink: &EventSink, uid: &str) {
        self.detach();
        let (id, listener) = sink.listener(profile_event);
        let registration = store.listen_document(&profile_path(uid), listener);
        self.subscription = Some(Subscription::new(id, registration));
    }

    pub fn detach(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.detach();
        }
    }

    pub fn clear(&mut self) {
        self.profile = None;
        self.display_name_input.clear();
        self.native_language_input.clear();
    }

    pub fn is_current(&self, listener: ListenerId) -> bool {
        crate::events::is_current(&self.subscription, listener)
    }

    /// Applies a remote snapshot.
    ///
    /// The edit buffers are overwritten on every snapshot, so a remote update arriving
    /// mid-edit replaces unsaved input.
    pub fn apply_snapshot(&mut self, document: Option<Document>) -> PortResult<()> {
        let Some(document) = document else {
            self.clear();
            return Ok(());
        };
        let profile: Profile = document.decode()?;
        self.display_name_input = profile.display_name.clone().unwrap_or_default();
        self.native_language_input = profile.native_language.clone();
        self.profile = Some(profile);
        Ok(())
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn display_name_input(&self) -> &str {
        &self.display_name_input
    }

    pub fn native_language_input(&self) -> &str {
        &self.native_language_input
    }

    pub fn set_display_name_input(&mut self, value: impl Into<String>) {
        self.display_name_input = value.into();
    }

    pub fn set_native_language_input(&mut self, value: impl Into<String>) {
        self.native_language_input = value.into();
    }
}

//=========================================================================================
// Profile Document Writes
//=========================================================================================

/// Full profile document for a freshly created password account.
pub(crate) async fn create_profile(
    store: &dyn DocumentStore,
    user: &AuthUser,
    now: DateTime<Utc>,
) -> PortResult<()> {
    let fields = serde_json::to_value(Profile::new_for(user, now))
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
    store.set_document(&profile_path(&user.uid), fields, false).await
}

/// Merges identity details from a social sign-in into the profile.
pub(crate) async fn merge_social_profile(
    store: &dyn DocumentStore,
    user: &AuthUser,
    now: DateTime<Utc>,
) -> PortResult<()> {
    let fields = json!({
        "email": user.email,
        "displayName": user.display_name,
        "photoURL": user.photo_url,
        "lastLogin": now,
    });
    store.set_document(&profile_path(&user.uid), fields, true).await
}

/// Refreshes the last-login timestamp.
pub(crate) async fn touch_last_login(
    store: &dyn DocumentStore,
    uid: &str,
    now: DateTime<Utc>,
) -> PortResult<()> {
    store
        .set_document(&profile_path(uid), json!({ "lastLogin": now }), true)
        .await
}

//=========================================================================================
// Controller Operations
//=========================================================================================

impl App {
    /// Persists the display name and native language for the signed-in user.
    pub async fn save_profile(&mut self, update: ProfileUpdate) {
        let Some(uid) = self.view.session().map(|s| s.uid.clone()) else {
            self.set_error("You must be signed in to edit your profile.");
            return;
        };

        let fields = match serde_json::to_value(&update) {
            Ok(fields) => fields,
            Err(e) => {
                error!("Failed to encode profile update: {}", e);
                self.set_error(describe_port_error(&PortError::Unexpected(e.to_string())));
                return;
            }
        };

        match self.store.update_document(&profile_path(&uid), fields).await {
            Ok(()) => {
                info!("Profile saved for user {}", uid);
                self.status = Some(StatusMessage::Info(PROFILE_SAVED_MESSAGE.to_string()));
            }
            Err(e) => {
                error!("Failed to save profile for {}: {}", uid, e);
                self.set_error(describe_port_error(&e));
            }
        }
    }

    /// Saves whatever is currently in the edit buffers.
    pub async fn save_profile_inputs(&mut self) {
        let update = ProfileUpdate {
            display_name: self.profile.display_name_input().to_string(),
            native_language: self.profile.native_language_input().to_string(),
        };
        self.save_profile(update).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(fields: serde_json::Value) -> Document {
        Document {
            id: "u1".into(),
            fields,
        }
    }

    #[test]
    fn snapshot_fills_edit_buffers() {
        let mut sync = ProfileSynchronizer::default();
        sync.apply_snapshot(Some(document(json!({
            "displayName": "Ana",
            "nativeLanguage": "es",
        }))))
        .unwrap();

        assert_eq!(sync.display_name_input(), "Ana");
        assert_eq!(sync.native_language_input(), "es");
        assert_eq!(sync.profile().unwrap().native_language, "es");
    }

    #[test]
    fn remote_snapshot_overwrites_unsaved_edits() {
        let mut sync = ProfileSynchronizer::default();
        sync.apply_snapshot(Some(document(json!({ "displayName": "Ana" }))))
            .unwrap();
        sync.set_display_name_input("Ana Maria");

        sync.apply_snapshot(Some(document(json!({ "displayName": "Ana", "totalXP": 10 }))))
            .unwrap();

        assert_eq!(sync.display_name_input(), "Ana");
    }

    #[test]
    fn missing_document_clears_local_copy() {
        let mut sync = ProfileSynchronizer::default();
        sync.apply_snapshot(Some(document(json!({ "displayName": "Ana" }))))
            .unwrap();
        sync.apply_snapshot(None).unwrap();

        assert!(sync.profile().is_none());
        assert_eq!(sync.display_name_input(), "");
    }

    #[test]
    fn malformed_document_is_an_error() {
        let mut sync = ProfileSynchronizer::default();
        let result = sync.apply_snapshot(Some(document(json!({ "currentStreak": "many" }))));
        assert!(result.is_err());
    }
}
