//! Typed client for sign-in, registration and password reset.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | POST   | `/app/login` | Exchange email + password for a bearer token |
//! | POST   | `/app/clients/register` | Create a client account |
//! | POST   | `/app/clients/forgot-password` | Send a password reset email |

use serde_json::{json, Value};

use crate::candidates;
use crate::config::BearerToken;
use crate::error::ServiceDeskError;
use crate::fields::{Envelope, Field, Step};
use crate::resolver::{CandidateRequest, EndpointResolver};

const TOKEN: Field = Field::truthy(&[
    &[Step::Key("token")],
    &[Step::Key("access_token")],
    &[Step::Key("data"), Step::Key("token")],
]);

const LOGIN_NAME: Field = Field::truthy(&[
    &[Step::Key("user"), Step::Key("name")],
    &[Step::Key("data"), Step::Key("user"), Step::Key("name")],
    &[Step::Key("name")],
]);

const REGISTER_NAME: Field = Field::truthy(&[
    &[Step::Key("user"), Step::Key("name")],
    &[Step::Key("name")],
]);

/// Confirmation shown when the reset endpoint returns no message.
pub const RESET_SENT: &str = "ელ. ფოსტა წარმატებით გაიგზავნა. გადაამოწმეთ საფოსტო ყუთი.";

/// An authenticated session.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: BearerToken,
    pub email: String,
    pub name: Option<String>,
}

/// Request to create a client account.
#[derive(Clone)]
pub struct RegistrationRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Company identification code; also sent as `identification_code` so it
    /// shows on the profile.
    pub company_code: String,
}

impl std::fmt::Debug for RegistrationRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("company_code", &self.company_code)
            .finish()
    }
}

impl RegistrationRequest {
    fn body(&self) -> Value {
        json!({
            "name": self.name,
            "email": self.email,
            "password": self.password,
            "password_confirmation": self.password,
            "companyCode": self.company_code,
            "identification_code": self.company_code,
        })
    }
}

/// Result of a registration. Some deployments sign the new client in
/// immediately, others require a separate login.
#[derive(Debug, Clone)]
pub enum Registration {
    SignedIn(Session),
    Created { email: String },
}

/// Client for the authentication routes.
#[derive(Debug, Clone)]
pub struct AuthClient {
    resolver: EndpointResolver,
    base: String,
}

impl AuthClient {
    pub(crate) fn new(resolver: EndpointResolver, base: String) -> Self {
        Self { resolver, base }
    }

    /// Sign in with email and password.
    ///
    /// Calls `POST {base}/app/login`.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, ServiceDeskError> {
        let request = candidates::login(&self.base)
            .with_json(json!({ "email": email, "password": password }));
        let body = self.post("login", request).await?;

        let token = TOKEN.text(&body).ok_or_else(|| ServiceDeskError::MissingToken {
            endpoint: "POST /app/login".into(),
        })?;
        tracing::info!(%email, "signed in");
        Ok(Session {
            token: BearerToken::new(token),
            email: email.to_string(),
            name: LOGIN_NAME.text(&body),
        })
    }

    /// Create a client account.
    ///
    /// Calls `POST {base}/app/clients/register`.
    pub async fn register(&self, req: &RegistrationRequest) -> Result<Registration, ServiceDeskError> {
        let request = candidates::register(&self.base).with_json(req.body());
        let body = self.post("registration", request).await?;

        Ok(match TOKEN.text(&body) {
            Some(token) => Registration::SignedIn(Session {
                token: BearerToken::new(token),
                email: req.email.clone(),
                name: REGISTER_NAME.text(&body).or_else(|| Some(req.name.clone())),
            }),
            None => Registration::Created {
                email: req.email.clone(),
            },
        })
    }

    /// Request a password reset email. Returns the server's confirmation.
    ///
    /// Calls `POST {base}/app/clients/forgot-password`.
    pub async fn forgot_password(&self, email: &str) -> Result<String, ServiceDeskError> {
        let request = candidates::forgot_password(&self.base).with_json(json!({ "email": email }));
        let body = self.post("password reset", request).await?;
        Ok(body
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .unwrap_or(RESET_SENT)
            .to_string())
    }

    async fn post(&self, resource: &str, request: CandidateRequest) -> Result<Value, ServiceDeskError> {
        self.resolver
            .resolve(resource, std::slice::from_ref(&request), None, Envelope::RAW)
            .await
    }
}
