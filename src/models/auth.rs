use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Profile of the signed-in user as returned by the backend.
///
/// Kept as the raw JSON object so fields the backend adds later survive a
/// persist/restore cycle; typed accessors cover the fields the app reads.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserProfile(Map<String, Value>);

impl UserProfile {
    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn full_name(&self) -> Option<&str> {
        self.0.get("fullName").and_then(Value::as_str)
    }

    pub fn email(&self) -> Option<&str> {
        self.0.get("email").and_then(Value::as_str)
    }

    /// Backend identifier, `id` or the legacy `_id`.
    pub fn id(&self) -> Option<String> {
        ["id", "_id"].iter().find_map(|key| match self.0.get(*key)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }

    pub fn display_name(&self) -> &str {
        self.full_name()
            .filter(|name| !name.is_empty())
            .or_else(|| self.email())
            .unwrap_or("")
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResendOtpRequest {
    pub email: String,
}

/// Acknowledgement returned by endpoints that do not issue a credential.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Response fields that carry the credential, never part of the profile.
const CREDENTIAL_FIELDS: [&str; 2] = ["accessToken", "tokenType"];

/// Canonical shape of a sign-in or OTP-verification response.
#[derive(Clone, Debug, PartialEq)]
pub enum AuthResponse {
    /// The backend issued a credential.
    Authenticated { token: String, user: UserProfile },
    /// No usable credential in the body (e.g. a plain "verified" acknowledgement).
    Pending,
}

impl AuthResponse {
    /// Normalises an OTP-verification body.
    ///
    /// The credential is read from `accessToken`, falling back to `token`; empty
    /// strings do not count. The profile is every top-level field except
    /// `accessToken` and `tokenType`.
    pub fn from_body(body: &Map<String, Value>) -> Self {
        let Some(token) = credential(body) else {
            return AuthResponse::Pending;
        };
        AuthResponse::Authenticated {
            token: token.to_string(),
            user: UserProfile::from_map(without_credential_fields(body)),
        }
    }

    /// Normalises a sign-in body. The backend nests the profile under `user`
    /// there; without that object it falls back to the `from_body` shape.
    pub fn from_sign_in(body: &Map<String, Value>) -> Self {
        let Some(token) = credential(body) else {
            return AuthResponse::Pending;
        };
        let user = match body.get("user") {
            Some(Value::Object(nested)) => nested.clone(),
            _ => without_credential_fields(body),
        };
        AuthResponse::Authenticated {
            token: token.to_string(),
            user: UserProfile::from_map(user),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthResponse::Authenticated { .. })
    }
}

fn credential(body: &Map<String, Value>) -> Option<&str> {
    ["accessToken", "token"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str).filter(|t| !t.is_empty()))
}

fn without_credential_fields(body: &Map<String, Value>) -> Map<String, Value> {
    body.iter()
        .filter(|(key, _)| !CREDENTIAL_FIELDS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
