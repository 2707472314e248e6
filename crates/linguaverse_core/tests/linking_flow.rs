use linguaverse_core::linking::{
    linking_prompt, METHODS_LOOKUP_FAILED_MESSAGE, MISSING_CREDENTIAL_MESSAGE,
    NO_ACTIVE_LINKING_MESSAGE, PASSWORD_REQUIRED_MESSAGE,
};
use linguaverse_core::{
    App, AuthCredential, IdentityService, MemoryBackend, Operation, PopupIdentity, SignInMethod,
    SocialProvider, StatusMessage, ViewState,
};
use std::sync::Arc;

const PASSWORD: &str = "secret1";

/// A backend holding a signed-out password account for `email`.
async fn backend_with_password_account(email: &str) -> MemoryBackend {
    let backend = MemoryBackend::new();
    backend.create_user_with_email(email, PASSWORD).await.unwrap();
    backend.sign_out().await.unwrap();
    backend
}

fn started_app(backend: &MemoryBackend) -> App {
    let mut app = App::new(Arc::new(backend.clone()), Arc::new(backend.clone()));
    app.start();
    app
}

/// Drives a social sign-in into the linking view.
async fn collide(backend: &MemoryBackend, app: &mut App, provider: SocialProvider, email: &str) {
    backend.set_popup_identity(provider, PopupIdentity::new(email, format!("{}-subject", provider)));
    app.sign_in_with_provider(provider).await;
    assert!(app.view().is_linking(), "expected linking, got {:?}", app.view());
}

#[tokio::test]
async fn gmail_collision_with_hidden_methods_offers_password() {
    let backend = backend_with_password_account("user@gmail.com").await;
    backend.set_email_enumeration_protection(true);
    let mut app = started_app(&backend);

    collide(&backend, &mut app, SocialProvider::Google, "user@gmail.com").await;

    let request = app.view().linking_request().unwrap();
    assert_eq!(request.email, "user@gmail.com");
    assert_eq!(request.existing_methods, vec![SignInMethod::Password]);
    assert_eq!(request.pending_credential.provider, SocialProvider::Google);
    assert_eq!(
        app.status(),
        Some(&StatusMessage::Info(linking_prompt("user@gmail.com")))
    );
    assert!(app.view().session().is_none());
}

#[tokio::test]
async fn password_sign_in_links_the_pending_credential() {
    let backend = backend_with_password_account("ana@example.com").await;
    let mut app = started_app(&backend);
    collide(&backend, &mut app, SocialProvider::Facebook, "ana@example.com").await;
    assert_eq!(
        app.view().linking_request().unwrap().existing_methods,
        vec![SignInMethod::Password]
    );

    app.sign_in_for_linking(&SignInMethod::Password, Some(PASSWORD)).await;

    let ViewState::Authenticated { session } = app.view() else {
        panic!("expected authenticated view, got {:?}", app.view());
    };
    assert_eq!(session.email.as_deref(), Some("ana@example.com"));
    assert!(app.status().is_none());
    assert_eq!(
        backend.sign_in_methods("ana@example.com"),
        vec![SignInMethod::Password, SignInMethod::Facebook]
    );

    // The linked provider now signs straight into the same account.
    let uid = session.uid.clone();
    app.sign_out().await;
    app.sign_in_with_provider(SocialProvider::Facebook).await;
    assert_eq!(app.view().session().map(|s| s.uid.as_str()), Some(uid.as_str()));
}

#[tokio::test]
async fn provider_popup_sign_in_links_the_pending_credential() {
    let backend = MemoryBackend::new();
    let user = backend.create_user_with_email("ana@example.com", PASSWORD).await.unwrap();
    let google = AuthCredential {
        provider: SocialProvider::Google,
        id_token: "g-ana".into(),
        access_token: None,
    };
    backend.link_credential(&user, &google).await.unwrap();
    backend.sign_out().await.unwrap();
    let mut app = started_app(&backend);

    collide(&backend, &mut app, SocialProvider::Facebook, "ana@example.com").await;
    assert_eq!(
        app.view().linking_request().unwrap().existing_methods,
        vec![SignInMethod::Password, SignInMethod::Google]
    );

    backend.set_popup_identity(SocialProvider::Google, PopupIdentity::new("ana@example.com", "g-ana"));
    app.sign_in_for_linking(&SignInMethod::Google, None).await;

    let ViewState::Authenticated { session } = app.view() else {
        panic!("expected authenticated view, got {:?}", app.view());
    };
    assert_eq!(session.uid, user.uid);
    assert!(app.status().is_none());
    assert_eq!(
        backend.sign_in_methods("ana@example.com"),
        vec![
            SignInMethod::Password,
            SignInMethod::Google,
            SignInMethod::Facebook
        ]
    );
}

#[tokio::test]
async fn credential_already_in_use_keeps_linking_pending() {
    let backend = backend_with_password_account("ana@example.com").await;
    let mut app = started_app(&backend);
    collide(&backend, &mut app, SocialProvider::Facebook, "ana@example.com").await;

    backend.fail_next(Operation::LinkCredential, "auth/credential-already-in-use");
    app.sign_in_for_linking(&SignInMethod::Password, Some(PASSWORD)).await;

    let ViewState::LinkingPending { request, session } = app.view() else {
        panic!("expected linking view, got {:?}", app.view());
    };
    assert_eq!(request.email, "ana@example.com");
    assert!(session.is_some());
    assert_eq!(
        app.error_message(),
        Some("This account is already linked to another user.")
    );
}

#[tokio::test]
async fn failed_linking_sign_in_keeps_the_request() {
    let backend = backend_with_password_account("ana@example.com").await;
    let mut app = started_app(&backend);
    collide(&backend, &mut app, SocialProvider::Google, "ana@example.com").await;

    app.sign_in_for_linking(&SignInMethod::Password, Some("")).await;
    assert!(app.view().is_linking());
    assert_eq!(app.error_message(), Some(PASSWORD_REQUIRED_MESSAGE));

    app.sign_in_for_linking(&SignInMethod::Password, Some("wrong-password")).await;
    assert!(app.view().is_linking());
    assert_eq!(app.error_message(), Some("Invalid email or password."));

    app.sign_in_for_linking(&SignInMethod::Facebook, None).await;
    assert!(app.view().is_linking());
    assert_eq!(
        app.error_message(),
        Some("Unsupported linking method: facebook.com")
    );
}

#[tokio::test]
async fn unrecoverable_collision_reports_missing_credential() {
    let backend = backend_with_password_account("ana@example.com").await;
    backend.set_unrecoverable_collisions(true);
    backend.set_popup_identity(SocialProvider::Google, PopupIdentity::new("ana@example.com", "g-ana"));
    let mut app = started_app(&backend);

    app.sign_in_with_provider(SocialProvider::Google).await;

    assert_eq!(app.view(), &ViewState::Unauthenticated);
    assert_eq!(app.error_message(), Some(MISSING_CREDENTIAL_MESSAGE));
}

#[tokio::test]
async fn failed_method_lookup_does_not_enter_linking() {
    let backend = backend_with_password_account("ana@example.com").await;
    backend.set_popup_identity(SocialProvider::Google, PopupIdentity::new("ana@example.com", "g-ana"));
    backend.fail_next(Operation::FetchSignInMethods, "network-request-failed");
    let mut app = started_app(&backend);

    app.sign_in_with_provider(SocialProvider::Google).await;

    assert!(!app.view().is_linking());
    assert_eq!(app.error_message(), Some(METHODS_LOOKUP_FAILED_MESSAGE));
}

#[tokio::test]
async fn cancel_and_new_attempts_leave_linking() {
    let backend = backend_with_password_account("ana@example.com").await;
    let mut app = started_app(&backend);

    collide(&backend, &mut app, SocialProvider::Google, "ana@example.com").await;
    app.cancel_linking();
    assert_eq!(app.view(), &ViewState::Unauthenticated);
    assert!(app.status().is_none());

    collide(&backend, &mut app, SocialProvider::Google, "ana@example.com").await;
    app.sign_in("someone@example.com", PASSWORD).await;
    assert_eq!(app.view(), &ViewState::Unauthenticated);
    assert_eq!(app.error_message(), Some("Invalid email or password."));

    app.sign_in_for_linking(&SignInMethod::Password, Some(PASSWORD)).await;
    assert_eq!(app.error_message(), Some(NO_ACTIVE_LINKING_MESSAGE));
}

#[tokio::test]
async fn closed_popup_is_an_ordinary_failure() {
    let backend = MemoryBackend::new();
    let mut app = started_app(&backend);

    app.sign_in_with_provider(SocialProvider::Facebook).await;

    assert_eq!(app.view(), &ViewState::Unauthenticated);
    assert_eq!(app.error_message(), Some("Sign-in was canceled by the user."));
}
