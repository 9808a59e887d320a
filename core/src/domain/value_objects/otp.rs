//! OTP send and confirmation value objects.

use chrono::{DateTime, Utc};
use civic_shared::phone::user_id_from_phone;
use serde::{Deserialize, Serialize};

/// Proof that a code was dispatched; required to confirm it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationHandle {
    /// Provider-issued verification session identifier
    pub verification_id: String,

    /// Destination the code was sent to (E.164)
    pub destination: String,

    /// When the provider accepted the send
    pub sent_at: DateTime<Utc>,
}

impl ConfirmationHandle {
    pub fn new(verification_id: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            verification_id: verification_id.into(),
            destination: destination.into(),
            sent_at: Utc::now(),
        }
    }
}

/// Outcome of a rate-limit check for one send attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The attempt may call the provider; `attempt` is the count in the window
    Allowed { attempt: u32 },
    /// The attempt is refused for at least `wait`
    Rejected { wait: std::time::Duration },
}

impl Admission {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    /// Whole seconds to wait, rounded up; zero when allowed
    pub fn wait_seconds(&self) -> u64 {
        match self {
            Self::Allowed { .. } => 0,
            Self::Rejected { wait } => {
                let millis = wait.as_millis();
                ((millis + 999) / 1000) as u64
            }
        }
    }
}

/// Result of a successful code confirmation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    /// Provider user id
    pub uid: String,

    /// Verified phone number
    pub phone_number: String,

    /// Digits-only form of the phone number, used as the profile key
    pub user_id: String,

    /// Provider identity token, when the provider issues one
    pub id_token: Option<String>,

    /// Whether the provider created the account during this sign-in
    pub is_new_user: bool,
}

impl AuthSession {
    pub fn new(uid: impl Into<String>, phone_number: impl Into<String>) -> Self {
        let phone_number = phone_number.into();
        let user_id = user_id_from_phone(&phone_number).unwrap_or_default();
        Self {
            uid: uid.into(),
            phone_number,
            user_id,
            id_token: None,
            is_new_user: false,
        }
    }

    pub fn with_id_token(mut self, token: impl Into<String>) -> Self {
        self.id_token = Some(token.into());
        self
    }

    pub fn with_new_user(mut self, is_new_user: bool) -> Self {
        self.is_new_user = is_new_user;
        self
    }
}
