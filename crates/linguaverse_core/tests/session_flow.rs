use linguaverse_core::profile::PROFILE_SAVED_MESSAGE;
use linguaverse_core::{
    App, Command, IdentityService, MemoryBackend, Operation, PopupIdentity, ProfileUpdate,
    SocialProvider, StatusMessage, ViewState,
};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc;

fn app_for(backend: &MemoryBackend) -> App {
    let mut app = App::new(Arc::new(backend.clone()), Arc::new(backend.clone()));
    app.start();
    app
}

#[tokio::test]
async fn sign_up_creates_a_default_profile() {
    let backend = MemoryBackend::new();
    let mut app = app_for(&backend);

    app.sign_up("ana@example.com", "secret1").await;
    app.process_pending_events();

    let ViewState::Authenticated { session } = app.view() else {
        panic!("expected authenticated view, got {:?}", app.view());
    };
    let stored = backend.document(&format!("users/{}", session.uid)).unwrap();
    assert_eq!(stored["nativeLanguage"], "en");
    assert_eq!(stored["totalXP"], 0);

    let profile = app.profile().profile().unwrap();
    assert_eq!(profile.email.as_deref(), Some("ana@example.com"));
    assert_eq!(profile.current_streak, 0);
    assert_eq!(app.profile().native_language_input(), "en");
    assert!(app.status().is_none());
}

#[tokio::test]
async fn sign_up_failures_use_friendly_messages() {
    let backend = MemoryBackend::new();
    let mut app = app_for(&backend);

    app.sign_up("ana@example.com", "123").await;
    assert_eq!(
        app.error_message(),
        Some("Password should be at least 6 characters.")
    );

    app.sign_up("ana@example.com", "secret1").await;
    app.sign_out().await;
    app.sign_up("ana@example.com", "secret1").await;
    assert_eq!(
        app.error_message(),
        Some("An account with this email already exists.")
    );
    assert_eq!(app.view(), &ViewState::Unauthenticated);
}

#[tokio::test]
async fn sign_in_refreshes_last_login_only() {
    let backend = MemoryBackend::new();
    let user = backend.create_user_with_email("ana@example.com", "secret1").await.unwrap();
    backend.sign_out().await.unwrap();
    let path = format!("users/{}", user.uid);
    backend
        .put_document(&path, json!({ "displayName": "Ana", "totalXP": 40 }))
        .unwrap();
    let mut app = app_for(&backend);

    app.sign_in("ana@example.com", "secret1").await;

    let stored = backend.document(&path).unwrap();
    assert_eq!(stored["displayName"], "Ana");
    assert_eq!(stored["totalXP"], 40);
    assert!(stored.get("lastLogin").is_some());
}

#[tokio::test]
async fn disabled_accounts_cannot_sign_in() {
    let backend = MemoryBackend::new();
    backend.create_user_with_email("ana@example.com", "secret1").await.unwrap();
    backend.sign_out().await.unwrap();
    backend.disable_account("ana@example.com");
    let mut app = app_for(&backend);

    app.sign_in("ana@example.com", "secret1").await;

    assert_eq!(app.view(), &ViewState::Unauthenticated);
    assert_eq!(app.error_message(), Some("This account has been disabled."));
}

#[tokio::test]
async fn social_sign_in_merges_identity_into_the_profile() {
    let backend = MemoryBackend::new();
    backend.set_popup_identity(
        SocialProvider::Google,
        PopupIdentity::new("bea@gmail.com", "g-bea")
            .with_profile("Bea", "https://example.com/bea.png"),
    );
    let mut app = app_for(&backend);

    app.sign_in_with_provider(SocialProvider::Google).await;
    app.process_pending_events();

    let uid = app.view().session().unwrap().uid.clone();
    let stored = backend.document(&format!("users/{}", uid)).unwrap();
    assert_eq!(stored["email"], "bea@gmail.com");
    assert_eq!(stored["displayName"], "Bea");
    assert_eq!(stored["photoURL"], "https://example.com/bea.png");
    assert_eq!(app.profile().display_name_input(), "Bea");
}

#[tokio::test]
async fn session_change_detaches_every_listener() {
    let backend = MemoryBackend::new();
    let mut app = app_for(&backend);
    assert_eq!(backend.auth_listener_count(), 1);

    app.sign_up("ana@example.com", "secret1").await;
    app.process_pending_events();
    assert_eq!(backend.document_listener_count(), 1);
    assert_eq!(backend.collection_listener_count(), 1);

    app.sign_out().await;
    assert_eq!(app.view(), &ViewState::Unauthenticated);
    assert!(app.profile().profile().is_none());
    assert_eq!(backend.document_listener_count(), 0);
    assert_eq!(backend.collection_listener_count(), 0);

    drop(app);
    assert_eq!(backend.auth_listener_count(), 0);
}

#[tokio::test]
async fn failed_sign_out_keeps_the_session() {
    let backend = MemoryBackend::new();
    let mut app = app_for(&backend);
    app.sign_up("ana@example.com", "secret1").await;

    backend.fail_next(Operation::SignOut, "network-request-failed");
    app.sign_out().await;

    assert!(app.view().session().is_some());
    assert_eq!(
        app.error_message(),
        Some("Network error. Please check your connection and try again.")
    );
}

#[tokio::test]
async fn saving_the_profile_reports_success_and_is_idempotent() {
    let backend = MemoryBackend::new();
    let mut app = app_for(&backend);
    app.sign_up("ana@example.com", "secret1").await;
    app.process_pending_events();

    let update = ProfileUpdate {
        display_name: "Ana".into(),
        native_language: "es".into(),
    };
    app.save_profile(update.clone()).await;
    assert_eq!(
        app.status(),
        Some(&StatusMessage::Info(PROFILE_SAVED_MESSAGE.to_string()))
    );
    assert_eq!(app.process_pending_events(), 1);
    assert_eq!(app.profile().display_name_input(), "Ana");
    assert_eq!(app.profile().native_language_input(), "es");

    let uid = app.view().session().unwrap().uid.clone();
    let before = backend.document(&format!("users/{}", uid));
    app.save_profile(update).await;
    assert_eq!(app.process_pending_events(), 0);
    assert_eq!(backend.document(&format!("users/{}", uid)), before);
    assert_eq!(
        app.status(),
        Some(&StatusMessage::Info(PROFILE_SAVED_MESSAGE.to_string()))
    );
}

#[tokio::test]
async fn saving_requires_a_session() {
    let backend = MemoryBackend::new();
    let mut app = app_for(&backend);

    app.save_profile_inputs().await;

    assert_eq!(
        app.error_message(),
        Some("You must be signed in to edit your profile.")
    );
}

#[tokio::test]
async fn remote_profile_update_replaces_unsaved_edits() {
    let backend = MemoryBackend::new();
    let mut app = app_for(&backend);
    app.sign_up("ana@example.com", "secret1").await;
    app.process_pending_events();
    let uid = app.view().session().unwrap().uid.clone();

    app.execute(Command::EditDisplayName("Draft".into())).await;
    backend
        .put_document(&format!("users/{}", uid), json!({ "displayName": "Remote" }))
        .unwrap();
    app.process_pending_events();

    assert_eq!(app.profile().display_name_input(), "Remote");
}

#[tokio::test]
async fn listener_errors_surface_as_messages() {
    let backend = MemoryBackend::new();
    backend.deny_reads("stories");
    let mut app = app_for(&backend);

    app.sign_up("ana@example.com", "secret1").await;

    assert_eq!(
        app.error_message(),
        Some("Failed to load stories: Missing or insufficient permissions.")
    );
}

#[tokio::test]
async fn run_applies_commands_in_order() {
    let backend = MemoryBackend::new();
    let app = App::new(Arc::new(backend.clone()), Arc::new(backend.clone()));
    let (tx, rx) = mpsc::channel(8);

    let commands = vec![
        Command::SignUp {
            email: "ana@example.com".into(),
            password: "secret1".into(),
        },
        Command::EditDisplayName("Ana".into()),
        Command::EditNativeLanguage("pt".into()),
        Command::SaveProfileInputs,
    ];
    for command in commands {
        tx.send(command).await.unwrap();
    }
    drop(tx);

    let app = app.run(rx).await;

    assert!(app.view().session().is_some());
    assert_eq!(app.profile().profile().unwrap().native_language, "pt");
    assert_eq!(
        app.status(),
        Some(&StatusMessage::Info(PROFILE_SAVED_MESSAGE.to_string()))
    );
    assert_eq!(backend.auth_listener_count(), 0);
}
