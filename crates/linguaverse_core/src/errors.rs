//! crates/linguaverse_core/src/errors.rs
//!
//! Maps provider error codes onto the fixed user-facing messages shown by the client.

use crate::ports::PortError;

/// Shown for any code without a dedicated message.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// Code reported when a social sign-in collides with an account using another provider.
pub const ACCOUNT_EXISTS_WITH_DIFFERENT_CREDENTIAL: &str =
    "account-exists-with-different-credential";

/// Provider error codes with a dedicated user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorCode {
    InvalidEmail,
    UserDisabled,
    UserNotFound,
    WrongPassword,
    InvalidCredential,
    EmailAlreadyInUse,
    WeakPassword,
    NetworkRequestFailed,
    TooManyRequests,
    OperationNotAllowed,
    PopupClosedByUser,
    CancelledPopupRequest,
    CredentialAlreadyInUse,
    ProviderAlreadyLinked,
}

impl AuthErrorCode {
    /// Parses a provider code, accepting both `auth/invalid-email` and `invalid-email`.
    pub fn parse(code: &str) -> Option<Self> {
        let code = code.strip_prefix("auth/").unwrap_or(code);
        Some(match code {
            "invalid-email" => Self::InvalidEmail,
            "user-disabled" => Self::UserDisabled,
            "user-not-found" => Self::UserNotFound,
            "wrong-password" => Self::WrongPassword,
            "invalid-credential" => Self::InvalidCredential,
            "email-already-in-use" => Self::EmailAlreadyInUse,
            "weak-password" => Self::WeakPassword,
            "network-request-failed" => Self::NetworkRequestFailed,
            "too-many-requests" => Self::TooManyRequests,
            "operation-not-allowed" => Self::OperationNotAllowed,
            "popup-closed-by-user" => Self::PopupClosedByUser,
            "cancelled-popup-request" => Self::CancelledPopupRequest,
            "credential-already-in-use" => Self::CredentialAlreadyInUse,
            "provider-already-linked" => Self::ProviderAlreadyLinked,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidEmail => "invalid-email",
            Self::UserDisabled => "user-disabled",
            Self::UserNotFound => "user-not-found",
            Self::WrongPassword => "wrong-password",
            Self::InvalidCredential => "invalid-credential",
            Self::EmailAlreadyInUse => "email-already-in-use",
            Self::WeakPassword => "weak-password",
            Self::NetworkRequestFailed => "network-request-failed",
            Self::TooManyRequests => "too-many-requests",
            Self::OperationNotAllowed => "operation-not-allowed",
            Self::PopupClosedByUser => "popup-closed-by-user",
            Self::CancelledPopupRequest => "cancelled-popup-request",
            Self::CredentialAlreadyInUse => "credential-already-in-use",
            Self::ProviderAlreadyLinked => "provider-already-linked",
        }
    }

    pub fn friendly_message(&self) -> &'static str {
        match self {
            Self::InvalidEmail => "The email address is not valid.",
            Self::UserDisabled => "This account has been disabled.",
            Self::UserNotFound | Self::WrongPassword | Self::InvalidCredential => {
                "Invalid email or password."
            }
            Self::EmailAlreadyInUse => "An account with this email already exists.",
            Self::WeakPassword => "Password should be at least 6 characters.",
            Self::NetworkRequestFailed => {
                "Network error. Please check your connection and try again."
            }
            Self::TooManyRequests => "Too many attempts. Please try again later.",
            Self::OperationNotAllowed => "This sign-in method is not enabled.",
            Self::PopupClosedByUser => "Sign-in was canceled by the user.",
            Self::CancelledPopupRequest => {
                "Sign-in cancelled. Perhaps a popup was already open or blocked."
            }
            Self::CredentialAlreadyInUse => "This account is already linked to another user.",
            Self::ProviderAlreadyLinked => "This provider is already linked to your account.",
        }
    }
}

/// Friendly message for a raw provider code; unknown codes get the generic fallback.
pub fn friendly_message(code: &str) -> &'static str {
    AuthErrorCode::parse(code)
        .map(|c| c.friendly_message())
        .unwrap_or(GENERIC_ERROR_MESSAGE)
}

/// Friendly message for any port failure.
pub fn describe_port_error(err: &PortError) -> &'static str {
    match err.code() {
        Some(code) => friendly_message(code),
        None => GENERIC_ERROR_MESSAGE,
    }
}

/// Whether a code is the provider-collision code.
pub fn is_provider_collision(code: &str) -> bool {
    code.strip_prefix("auth/").unwrap_or(code) == ACCOUNT_EXISTS_WITH_DIFFERENT_CREDENTIAL
}
