pub mod app;
pub mod coordinator;
pub mod domain;
pub mod errors;
pub mod events;
pub mod linking;
pub mod memory;
pub mod ports;
pub mod profile;
pub mod session;
pub mod stories;
pub mod view;

pub use app::{App, Command, StatusMessage};
pub use domain::{
    AuthCredential, AuthUser, LinkingRequest, Message, Page, Profile, ProfileUpdate,
    SignInMethod, SocialProvider, Story, VocabularyToken,
};
pub use errors::{friendly_message, AuthErrorCode, GENERIC_ERROR_MESSAGE};
pub use memory::{MemoryBackend, Operation, PopupIdentity};
pub use ports::{
    CollectionQuery, Document, DocumentStore, IdentityService, ListenerRegistration,
    MessageStore, PortError, PortResult, ProviderError,
};
pub use view::{ViewAction, ViewState};
