//! crates/linguaverse_core/src/session.rs
//!
//! Session transitions and the email/password entry points.

use crate::app::App;
use crate::domain::AuthUser;
use crate::errors::describe_port_error;
use crate::profile::{create_profile, touch_last_login};
use crate::view::{reduce, ViewAction};
use chrono::Utc;
use tracing::{error, info, warn};

impl App {
    /// Reacts to an authentication-state notification.
    ///
    /// Every notification tears down all derived state and listeners before anything
    /// is rebuilt, so no snapshot from a previous session can be applied afterwards.
    pub(crate) fn handle_session_change(&mut self, session: Option<AuthUser>) {
        match &session {
            Some(user) => info!(
                "Session changed: {} ({})",
                user.email.as_deref().unwrap_or("-"),
                user.uid
            ),
            None => info!("No user signed in."),
        }

        self.profile.detach();
        self.stories.detach_all();
        self.profile.clear();
        self.stories.clear();
        self.status = None;

        if let Some(user) = &session {
            self.profile.attach(self.store.as_ref(), &self.sink, &user.uid);
            self.stories.attach_stories(self.store.as_ref(), &self.sink);
        }

        let view = std::mem::take(&mut self.view);
        self.view = reduce(view, ViewAction::SessionChanged(session));
    }

    /// Clears linking and status before any new top-level attempt.
    ///
    /// Identity calls that change the session are followed by `process_pending_events`
    /// so the session transition is observed before the call's own follow-up work.
    pub(crate) fn begin_attempt(&mut self) {
        self.status = None;
        let view = std::mem::take(&mut self.view);
        self.view = reduce(view, ViewAction::AttemptStarted);
    }

    pub async fn sign_up(&mut self, email: &str, password: &str) {
        self.begin_attempt();
        let user = match self.identity.create_user_with_email(email, password).await {
            Ok(user) => user,
            Err(e) => {
                error!("Error signing up: {}", e);
                self.set_error(describe_port_error(&e));
                return;
            }
        };
        info!("User signed up successfully: {}", email);
        self.process_pending_events();

        if let Err(e) = create_profile(self.store.as_ref(), &user, Utc::now()).await {
            error!("Failed to create profile for {}: {}", user.uid, e);
            self.set_error(describe_port_error(&e));
        }
    }

    pub async fn sign_in(&mut self, email: &str, password: &str) {
        self.begin_attempt();
        let user = match self.identity.sign_in_with_password(email, password).await {
            Ok(user) => user,
            Err(e) => {
                error!("Error signing in: {}", e);
                self.set_error(describe_port_error(&e));
                return;
            }
        };
        info!("User signed in successfully: {}", email);
        self.process_pending_events();

        if let Err(e) = touch_last_login(self.store.as_ref(), &user.uid, Utc::now()).await {
            warn!("Failed to refresh last login for {}: {}", user.uid, e);
        }
    }

    pub async fn sign_out(&mut self) {
        self.begin_attempt();
        match self.identity.sign_out().await {
            Ok(()) => {
                info!("User signed out successfully.");
                self.process_pending_events();
            }
            Err(e) => {
                error!("Error signing out: {}", e);
                self.set_error(describe_port_error(&e));
            }
        }
    }
}
