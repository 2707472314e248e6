//! crates/linguaverse_core/src/linking.rs
//!
//! Pure pieces of the account-linking flow: turning a provider collision into a
//! linking request and the fallback used when the identity service will not say
//! which methods an email already has.

use crate::domain::{AuthCredential, LinkingRequest, SignInMethod, SocialProvider};
use crate::errors::is_provider_collision;
use crate::ports::ProviderError;

pub const MISSING_CREDENTIAL_MESSAGE: &str =
    "Could not retrieve pending credential for linking. Please try again.";
pub const METHODS_LOOKUP_FAILED_MESSAGE: &str =
    "Failed to determine existing sign-in methods. Please try again.";
pub const NO_ACTIVE_LINKING_MESSAGE: &str = "No account linking process is active.";
pub const PASSWORD_REQUIRED_MESSAGE: &str =
    "Please enter your password to sign in for linking.";

/// Shown when entering the linking view.
pub fn linking_prompt(email: &str) -> String {
    format!(
        "An account with this email ({}) already exists. \
         Please sign in with one of your existing methods to link accounts.",
        email
    )
}

pub fn unsupported_method_message(method: &SignInMethod) -> String {
    format!("Unsupported linking method: {}", method.as_str())
}

/// What a social sign-in failure means for the linking flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Collision {
    /// Not a collision; handle as an ordinary sign-in failure.
    None,
    /// A collision whose credential could not be rebuilt from the error payload.
    Unrecoverable,
    Recoverable {
        email: String,
        credential: AuthCredential,
    },
}

/// Classifies a social sign-in failure for `provider`.
pub fn classify_collision(err: &ProviderError, provider: SocialProvider) -> Collision {
    if !is_provider_collision(&err.code) {
        return Collision::None;
    }
    match (&err.email, &err.credential) {
        (Some(email), Some(credential)) if credential.provider == provider => {
            Collision::Recoverable {
                email: email.clone(),
                credential: credential.clone(),
            }
        }
        _ => Collision::Unrecoverable,
    }
}

/// Fallback policy when the method lookup comes back empty.
///
/// This is a guess from the email domain, not a guarantee: Google-hosted addresses are
/// assumed to be Google-capable, everything else password or Facebook. The provider
/// that just failed is never offered.
pub fn infer_sign_in_methods(email: &str, failed: SocialProvider) -> Vec<SignInMethod> {
    let domain = email
        .rsplit_once('@')
        .map(|(_, domain)| domain.to_ascii_lowercase())
        .unwrap_or_default();

    let guessed = if domain == "gmail.com" || domain == "googlemail.com" {
        vec![SignInMethod::Google, SignInMethod::Password]
    } else {
        vec![SignInMethod::Password, SignInMethod::Facebook]
    };

    let failed = SignInMethod::from(failed);
    guessed.into_iter().filter(|m| *m != failed).collect()
}

/// Builds the request held while the user signs in with an existing method.
pub fn build_request(
    email: String,
    credential: AuthCredential,
    fetched: Vec<SignInMethod>,
) -> LinkingRequest {
    let existing_methods = if fetched.is_empty() {
        tracing::warn!(
            "No sign-in methods reported for conflicting email {}. Inferring from its domain.",
            email
        );
        infer_sign_in_methods(&email, credential.provider)
    } else {
        fetched
    };

    LinkingRequest {
        email,
        pending_credential: credential,
        existing_methods,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential(provider: SocialProvider) -> AuthCredential {
        AuthCredential {
            provider,
            id_token: "tok".into(),
            access_token: None,
        }
    }

    #[test]
    fn gmail_collision_on_google_leaves_password() {
        let methods = infer_sign_in_methods("user@gmail.com", SocialProvider::Google);
        assert_eq!(methods, vec![SignInMethod::Password]);
    }

    #[test]
    fn googlemail_domain_is_case_insensitive() {
        let methods = infer_sign_in_methods("User@GoogleMail.com", SocialProvider::Facebook);
        assert_eq!(methods, vec![SignInMethod::Google, SignInMethod::Password]);
    }

    #[test]
    fn other_domains_exclude_failed_facebook() {
        let methods = infer_sign_in_methods("ana@example.com", SocialProvider::Facebook);
        assert_eq!(methods, vec![SignInMethod::Password]);

        let methods = infer_sign_in_methods("ana@example.com", SocialProvider::Google);
        assert_eq!(methods, vec![SignInMethod::Password, SignInMethod::Facebook]);
    }

    #[test]
    fn fetched_methods_win_over_inference() {
        let request = build_request(
            "user@gmail.com".into(),
            credential(SocialProvider::Google),
            vec![SignInMethod::Facebook],
        );
        assert_eq!(request.existing_methods, vec![SignInMethod::Facebook]);
    }

    #[test]
    fn collision_without_credential_is_unrecoverable() {
        let mut err = ProviderError::new("auth/account-exists-with-different-credential", "exists");
        err.email = Some("ana@example.com".into());
        assert_eq!(
            classify_collision(&err, SocialProvider::Google),
            Collision::Unrecoverable
        );

        err.credential = Some(credential(SocialProvider::Google));
        assert!(matches!(
            classify_collision(&err, SocialProvider::Google),
            Collision::Recoverable { .. }
        ));
    }

    #[test]
    fn other_codes_are_not_collisions() {
        let err = ProviderError::new("popup-closed-by-user", "closed");
        assert_eq!(classify_collision(&err, SocialProvider::Google), Collision::None);
    }
}
