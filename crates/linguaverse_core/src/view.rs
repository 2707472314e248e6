//! crates/linguaverse_core/src/view.rs
//!
//! The top-level view state of the client as an explicit tagged union, driven by a
//! pure reducer. Session and linking state can never disagree because they live in
//! one value.

use crate::domain::{AuthUser, LinkingRequest};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewState {
    #[default]
    Unauthenticated,
    Authenticated {
        session: AuthUser,
    },
    /// The user must prove ownership of an existing account. They may already hold a
    /// session from a prior method; the linking view takes precedence until resolved.
    LinkingPending {
        request: LinkingRequest,
        session: Option<AuthUser>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewAction {
    /// The identity service reported a new session (or its absence).
    SessionChanged(Option<AuthUser>),
    /// A new top-level sign-in, sign-up, social or sign-out attempt began.
    AttemptStarted,
    LinkingRequired(LinkingRequest),
    LinkingCancelled,
    LinkingCompleted,
}

impl ViewState {
    fn from_session(session: Option<AuthUser>) -> Self {
        match session {
            Some(session) => ViewState::Authenticated { session },
            None => ViewState::Unauthenticated,
        }
    }

    pub fn session(&self) -> Option<&AuthUser> {
        match self {
            ViewState::Unauthenticated => None,
            ViewState::Authenticated { session } => Some(session),
            ViewState::LinkingPending { session, .. } => session.as_ref(),
        }
    }

    pub fn linking_request(&self) -> Option<&LinkingRequest> {
        match self {
            ViewState::LinkingPending { request, .. } => Some(request),
            _ => None,
        }
    }

    pub fn is_linking(&self) -> bool {
        matches!(self, ViewState::LinkingPending { .. })
    }

    fn into_session(self) -> Option<AuthUser> {
        match self {
            ViewState::Unauthenticated => None,
            ViewState::Authenticated { session } => Some(session),
            ViewState::LinkingPending { session, .. } => session,
        }
    }
}

/// Computes the next view state.
pub fn reduce(state: ViewState, action: ViewAction) -> ViewState {
    match action {
        ViewAction::SessionChanged(session) => ViewState::from_session(session),
        ViewAction::AttemptStarted
        | ViewAction::LinkingCancelled
        | ViewAction::LinkingCompleted => ViewState::from_session(state.into_session()),
        ViewAction::LinkingRequired(request) => ViewState::LinkingPending {
            request,
            session: state.into_session(),
        },
    }
}
