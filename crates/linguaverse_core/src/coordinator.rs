//! crates/linguaverse_core/src/coordinator.rs
//!
//! Social sign-in and the account-linking flow.
//!
//! A social sign-in that collides with an account registered through another method
//! moves the view to `LinkingPending`. From there the user signs in with one of the
//! existing methods and the held credential is linked onto that account. Failures keep
//! the request so the user can retry with another method.

use crate::app::{App, StatusMessage};
use crate::domain::{SignInMethod, SocialProvider};
use crate::errors::{describe_port_error, friendly_message, AuthErrorCode};
use crate::linking::{
    build_request, classify_collision, linking_prompt, unsupported_method_message, Collision,
    METHODS_LOOKUP_FAILED_MESSAGE, MISSING_CREDENTIAL_MESSAGE, NO_ACTIVE_LINKING_MESSAGE,
    PASSWORD_REQUIRED_MESSAGE,
};
use crate::ports::PortError;
use crate::profile::merge_social_profile;
use crate::view::{reduce, ViewAction};
use chrono::Utc;
use tracing::{error, info, warn};

/// Message for a failed sign-in or link while linking with `method`.
pub fn linking_failure_message(err: &PortError, method: &SignInMethod) -> String {
    match err.code().and_then(AuthErrorCode::parse) {
        Some(AuthErrorCode::ProviderAlreadyLinked) => format!(
            "The selected provider ({}) is already linked to your account.",
            method
        ),
        Some(code) => code.friendly_message().to_string(),
        None => describe_port_error(err).to_string(),
    }
}

impl App {
    pub async fn sign_in_with_provider(&mut self, provider: SocialProvider) {
        self.begin_attempt();

        let err = match self.identity.sign_in_with_provider(provider).await {
            Ok(result) => {
                info!("Signed in with {}: {:?}", provider.provider_id(), result.user.email);
                self.process_pending_events();
                let merged =
                    merge_social_profile(self.store.as_ref(), &result.user, Utc::now()).await;
                if let Err(e) = merged {
                    error!("Failed to update profile for {}: {}", result.user.uid, e);
                    self.set_error(describe_port_error(&e));
                }
                return;
            }
            Err(PortError::Provider(err)) => err,
            Err(e) => {
                error!("Unexpected error during {} sign-in: {}", provider.provider_id(), e);
                self.set_error(describe_port_error(&e));
                return;
            }
        };

        match classify_collision(&err, provider) {
            Collision::None => {
                warn!("{} sign-in failed: {}", provider.provider_id(), err);
                self.set_error(friendly_message(&err.code));
            }
            Collision::Unrecoverable => {
                error!("Collision without a recoverable credential: {}", err);
                self.set_error(MISSING_CREDENTIAL_MESSAGE);
            }
            Collision::Recoverable { email, credential } => {
                warn!("Account exists conflict detected for {}. Initiating linking flow.", email);
                let methods = match self.identity.fetch_sign_in_methods(&email).await {
                    Ok(methods) => methods,
                    Err(e) => {
                        error!("Error fetching sign-in methods for {}: {}", email, e);
                        self.set_error(METHODS_LOOKUP_FAILED_MESSAGE);
                        return;
                    }
                };
                info!("Existing sign-in methods for {}: {:?}", email, methods);

                let prompt = linking_prompt(&email);
                let request = build_request(email, credential, methods);
                let view = std::mem::take(&mut self.view);
                self.view = reduce(view, ViewAction::LinkingRequired(request));
                self.status = Some(StatusMessage::Info(prompt));
            }
        }
    }

    /// Signs in with an existing method of the conflicting account, then links the
    /// held credential onto it.
    pub async fn sign_in_for_linking(&mut self, method: &SignInMethod, password: Option<&str>) {
        let Some(request) = self.view.linking_request().cloned() else {
            self.set_error(NO_ACTIVE_LINKING_MESSAGE);
            return;
        };
        self.status = None;

        if !request.existing_methods.contains(method) {
            self.set_error(unsupported_method_message(method));
            return;
        }

        let signed_in = match method {
            SignInMethod::Password => {
                let Some(password) = password.filter(|p| !p.is_empty()) else {
                    self.set_error(PASSWORD_REQUIRED_MESSAGE);
                    return;
                };
                self.identity
                    .sign_in_with_password(&request.email, password)
                    .await
            }
            SignInMethod::Google | SignInMethod::Facebook => {
                let Some(provider) = method.social_provider() else {
                    return;
                };
                self.identity
                    .sign_in_with_provider(provider)
                    .await
                    .map(|result| result.user)
            }
            SignInMethod::Other(_) => {
                self.set_error(unsupported_method_message(method));
                return;
            }
        };

        let user = match signed_in {
            Ok(user) => user,
            Err(e) => {
                error!("Error during linking sign-in with {}: {}", method.as_str(), e);
                self.set_error(linking_failure_message(&e, method));
                return;
            }
        };
        self.process_pending_events();

        info!("Attempting to link new credential to current user: {:?}", user.email);
        match self
            .identity
            .link_credential(&user, &request.pending_credential)
            .await
        {
            Ok(_) => {
                info!("Accounts successfully linked!");
                let view = std::mem::take(&mut self.view);
                self.view = reduce(view, ViewAction::LinkingCompleted);
                self.status = None;
            }
            Err(e) => {
                error!("Linking failed: {}", e);
                let view = std::mem::take(&mut self.view);
                self.view = reduce(view, ViewAction::LinkingRequired(request));
                self.set_error(linking_failure_message(&e, method));
            }
        }
    }

    /// Discards the pending request and any message.
    pub fn cancel_linking(&mut self) {
        if !self.view.is_linking() {
            return;
        }
        info!("Account linking cancelled by the user.");
        let view = std::mem::take(&mut self.view);
        self.view = reduce(view, ViewAction::LinkingCancelled);
        self.status = None;
    }
}
