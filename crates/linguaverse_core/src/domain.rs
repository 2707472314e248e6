//! crates/linguaverse_core/src/domain.rs
//!
//! Defines the core data structures for the application. The remote service owns
//! every entity here; the application only ever holds transient, derived copies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Native language assigned to profiles that have never chosen one.
pub const DEFAULT_NATIVE_LANGUAGE: &str = "en";

/// The currently authenticated identity, as reported by the identity service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

/// Per-user profile document stored at `users/{uid}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(rename = "photoURL", default)]
    pub photo_url: Option<String>,
    #[serde(default = "default_native_language")]
    pub native_language: String,
    #[serde(default)]
    pub current_streak: u32,
    #[serde(rename = "totalXP", default)]
    pub total_xp: u64,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
}

fn default_native_language() -> String {
    DEFAULT_NATIVE_LANGUAGE.to_string()
}

impl Profile {
    /// The document written when an account is first created with email/password.
    pub fn new_for(user: &AuthUser, now: DateTime<Utc>) -> Self {
        Self {
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            photo_url: user.photo_url.clone(),
            native_language: default_native_language(),
            current_streak: 0,
            total_xp: 0,
            last_login: Some(now),
        }
    }
}

/// The editable subset of a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub display_name: String,
    pub native_language: String,
}

/// A story summary from the `stories` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    /// Document id; not part of the stored fields.
    #[serde(skip)]
    pub id: String,
    pub title: String,
    pub level: String,
    pub category: String,
    pub estimated_reading_time_minutes: u32,
}

/// A marked word in page text with an opaque lookup id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyToken {
    pub word: String,
    pub token: String,
}

/// One page of a story, from `stories/{story_id}/pages`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    #[serde(skip)]
    pub id: String,
    pub page_number: u32,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub audio_url: Option<String>,
    pub text_english: String,
    #[serde(default)]
    pub vocabulary_tokens: Vec<VocabularyToken>,
}

/// Social providers that sign in through a popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SocialProvider {
    Google,
    Facebook,
}

impl SocialProvider {
    pub fn provider_id(&self) -> &'static str {
        match self {
            SocialProvider::Google => "google.com",
            SocialProvider::Facebook => "facebook.com",
        }
    }
}

impl fmt::Display for SocialProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        SignInMethod::from(*self).fmt(f)
    }
}

/// A sign-in method identifier as reported by the identity service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SignInMethod {
    Password,
    Google,
    Facebook,
    /// Methods this application cannot drive (e.g. `emailLink`, `apple.com`).
    Other(String),
}

impl SignInMethod {
    /// The wire identifier (`password`, `google.com`, ...).
    pub fn as_str(&self) -> &str {
        match self {
            SignInMethod::Password => "password",
            SignInMethod::Google => "google.com",
            SignInMethod::Facebook => "facebook.com",
            SignInMethod::Other(id) => id,
        }
    }

    pub fn social_provider(&self) -> Option<SocialProvider> {
        match self {
            SignInMethod::Google => Some(SocialProvider::Google),
            SignInMethod::Facebook => Some(SocialProvider::Facebook),
            _ => None,
        }
    }
}

impl From<SocialProvider> for SignInMethod {
    fn from(provider: SocialProvider) -> Self {
        match provider {
            SocialProvider::Google => SignInMethod::Google,
            SocialProvider::Facebook => SignInMethod::Facebook,
        }
    }
}

impl FromStr for SignInMethod {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "password" => SignInMethod::Password,
            "google.com" => SignInMethod::Google,
            "facebook.com" => SignInMethod::Facebook,
            other => SignInMethod::Other(other.to_string()),
        })
    }
}

/// Human-readable provider names for display.
impl fmt::Display for SignInMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignInMethod::Password => write!(f, "Email/Password"),
            SignInMethod::Google => write!(f, "Google"),
            SignInMethod::Facebook => write!(f, "Facebook"),
            SignInMethod::Other(id) => write!(f, "{}", id),
        }
    }
}

/// A provider credential held while the user proves ownership of the existing account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCredential {
    pub provider: SocialProvider,
    pub id_token: String,
    pub access_token: Option<String>,
}

/// In-memory state of an account-linking attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkingRequest {
    pub email: String,
    pub pending_credential: AuthCredential,
    pub existing_methods: Vec<SignInMethod>,
}

/// A message submitted through the HTTP boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: String,
    pub text: String,
    pub author_id: String,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn profile_decodes_with_defaults_for_missing_fields() {
        let profile: Profile = serde_json::from_value(json!({
            "email": "ana@example.com",
            "displayName": "Ana",
        }))
        .unwrap();

        assert_eq!(profile.native_language, "en");
        assert_eq!(profile.current_streak, 0);
        assert_eq!(profile.total_xp, 0);
        assert!(profile.photo_url.is_none());
    }

    #[test]
    fn profile_uses_document_field_names() {
        let user = AuthUser {
            uid: "u1".into(),
            email: Some("ana@example.com".into()),
            display_name: None,
            photo_url: Some("https://img/ana.png".into()),
        };
        let value = serde_json::to_value(Profile::new_for(&user, Utc::now())).unwrap();

        assert_eq!(value["photoURL"], "https://img/ana.png");
        assert_eq!(value["nativeLanguage"], "en");
        assert_eq!(value["totalXP"], 0);
        assert!(value.get("lastLogin").is_some());
    }

    #[test]
    fn page_decodes_vocabulary_tokens() {
        let page: Page = serde_json::from_value(json!({
            "pageNumber": 2,
            "imageUrl": "img",
            "audioUrl": "audio",
            "textEnglish": "The cat sat.",
            "vocabularyTokens": [{ "word": "cat", "token": "t-1" }],
        }))
        .unwrap();

        assert_eq!(page.page_number, 2);
        assert_eq!(page.vocabulary_tokens[0].word, "cat");
    }

    #[test]
    fn sign_in_method_round_trips_wire_ids() {
        for id in ["password", "google.com", "facebook.com", "emailLink"] {
            let method: SignInMethod = id.parse().unwrap();
            assert_eq!(method.as_str(), id);
        }
        assert_eq!(SignInMethod::Password.to_string(), "Email/Password");
    }
}
