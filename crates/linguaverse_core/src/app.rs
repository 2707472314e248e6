//! crates/linguaverse_core/src/app.rs
//!
//! The client-side application controller. It owns the injected service handles,
//! the event channel fed by remote listeners, and every piece of derived UI state.
//! All work runs on one task: commands and notifications are applied one at a time.

use crate::domain::{ProfileUpdate, SignInMethod, SocialProvider};
use crate::events::{AppEvent, EventSink};
use crate::ports::{DocumentStore, IdentityService, ListenerRegistration, PortError};
use crate::profile::ProfileSynchronizer;
use crate::stories::StoryBrowser;
use crate::view::ViewState;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};

/// A transient message shown beneath the forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusMessage {
    Info(String),
    Error(String),
}

/// User intents delivered by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SignUp { email: String, password: String },
    SignIn { email: String, password: String },
    SignInWithProvider(SocialProvider),
    SignOut,
    SignInForLinking {
        method: SignInMethod,
        password: Option<String>,
    },
    CancelLinking,
    EditDisplayName(String),
    EditNativeLanguage(String),
    SaveProfile(ProfileUpdate),
    SaveProfileInputs,
    SelectStory(String),
    DeselectStory,
    NextPage,
    PreviousPage,
    ClickToken(String),
    ClosePopup,
}

pub struct App {
    pub(crate) identity: Arc<dyn IdentityService>,
    pub(crate) store: Arc<dyn DocumentStore>,
    pub(crate) sink: EventSink,
    events: mpsc::UnboundedReceiver<AppEvent>,
    auth_registration: Option<ListenerRegistration>,
    pub(crate) view: ViewState,
    pub(crate) status: Option<StatusMessage>,
    pub(crate) profile: ProfileSynchronizer,
    pub(crate) stories: StoryBrowser,
}

impl App {
    /// Creates the controller around explicitly constructed service clients.
    pub fn new(identity: Arc<dyn IdentityService>, store: Arc<dyn DocumentStore>) -> Self {
        let (sink, events) = EventSink::channel();
        Self {
            identity,
            store,
            sink,
            events,
            auth_registration: None,
            view: ViewState::Unauthenticated,
            status: None,
            profile: ProfileSynchronizer::default(),
            stories: StoryBrowser::default(),
        }
    }

    /// Subscribes to authentication-state changes for the lifetime of the controller.
    /// Calling it again has no effect.
    pub fn start(&mut self) {
        if self.auth_registration.is_some() {
            return;
        }
        info!("Subscribing to authentication state changes.");
        let registration = self.identity.on_auth_state_changed(self.sink.auth_listener());
        self.auth_registration = Some(registration);
        self.process_pending_events();
    }

    /// Runs the controller until the command channel closes.
    pub async fn run(mut self, mut commands: mpsc::Receiver<Command>) -> Self {
        self.start();
        loop {
            tokio::select! {
                biased;
                Some(event) = self.events.recv() => self.handle_event(event),
                command = commands.recv() => match command {
                    Some(command) => {
                        self.execute(command).await;
                        self.process_pending_events();
                    }
                    None => break,
                },
            }
        }
        info!("Command channel closed. Shutting down controller.");
        self.shutdown();
        self
    }

    /// Applies a single user intent.
    pub async fn execute(&mut self, command: Command) {
        match command {
            Command::SignUp { email, password } => self.sign_up(&email, &password).await,
            Command::SignIn { email, password } => self.sign_in(&email, &password).await,
            Command::SignInWithProvider(provider) => self.sign_in_with_provider(provider).await,
            Command::SignOut => self.sign_out().await,
            Command::SignInForLinking { method, password } => {
                self.sign_in_for_linking(&method, password.as_deref()).await
            }
            Command::CancelLinking => self.cancel_linking(),
            Command::EditDisplayName(value) => self.profile.set_display_name_input(value),
            Command::EditNativeLanguage(value) => self.profile.set_native_language_input(value),
            Command::SaveProfile(update) => self.save_profile(update).await,
            Command::SaveProfileInputs => self.save_profile_inputs().await,
            Command::SelectStory(id) => self.select_story(&id),
            Command::DeselectStory => self.deselect_story(),
            Command::NextPage => {
                self.next_page();
            }
            Command::PreviousPage => {
                self.previous_page();
            }
            Command::ClickToken(token) => {
                self.click_token(&token);
            }
            Command::ClosePopup => self.close_popup(),
        }
    }

    /// Applies every notification that has already been queued, in arrival order.
    pub fn process_pending_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events.try_recv() {
            self.handle_event(event);
            applied += 1;
        }
        applied
    }

    fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::AuthStateChanged(session) => self.handle_session_change(session),
            AppEvent::ProfileSnapshot { listener, result } => {
                if !self.profile.is_current(listener) {
                    return;
                }
                if let Err(e) = result.and_then(|doc| self.profile.apply_snapshot(doc)) {
                    self.listener_failed("profile", e);
                }
            }
            AppEvent::StoriesSnapshot { listener, result } => {
                if !self.stories.is_stories_listener(listener) {
                    return;
                }
                if let Err(e) = result.and_then(|docs| self.stories.apply_stories(docs)) {
                    self.listener_failed("stories", e);
                }
            }
            AppEvent::PagesSnapshot { listener, result } => {
                if !self.stories.is_pages_listener(listener) {
                    return;
                }
                if let Err(e) = result.and_then(|docs| self.stories.apply_pages(docs)) {
                    self.listener_failed("pages", e);
                }
            }
        }
    }

    fn listener_failed(&mut self, what: &str, err: PortError) {
        error!("Listener for {} failed: {}", what, err);
        self.set_error(format!("Failed to load {}: {}", what, listener_error_detail(&err)));
    }

    /// Detaches every listener, including the authentication subscription.
    pub fn shutdown(&mut self) {
        self.profile.detach();
        self.stories.detach_all();
        if let Some(registration) = self.auth_registration.take() {
            registration.detach();
        }
    }

    pub(crate) fn set_error(&mut self, message: impl Into<String>) {
        self.status = Some(StatusMessage::Error(message.into()));
    }

    //=====================================================================================
    // Read Accessors for the Presentation Layer
    //=====================================================================================

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            Some(StatusMessage::Error(message)) => Some(message),
            _ => None,
        }
    }

    pub fn profile(&self) -> &ProfileSynchronizer {
        &self.profile
    }

    pub fn stories(&self) -> &StoryBrowser {
        &self.stories
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn listener_error_detail(err: &PortError) -> String {
    match err {
        PortError::Provider(provider) => provider.message.clone(),
        other => other.to_string(),
    }
}
