//! services/client/src/adapters/auth.rs
//!
//! The HTTP adapter for the auth service. It implements the `AuthService`
//! port from the `core` crate. The session itself lives in an HTTP-only
//! cookie held by the dispatcher's cookie store.

use async_trait::async_trait;
use quiz_core::domain::{Identity, Registration};
use quiz_core::ports::{AuthService, PortError, PortResult};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

use crate::adapters::http::{HttpDispatcher, RequestOptions, Service};
use crate::adapters::wire::{decode, pick, LoginResponse, UserRecord};

/// An adapter that implements the `AuthService` port over HTTP.
#[derive(Clone)]
pub struct HttpAuthAdapter {
    http: Arc<HttpDispatcher>,
}

impl HttpAuthAdapter {
    pub fn new(http: Arc<HttpDispatcher>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl AuthService for HttpAuthAdapter {
    async fn login(&self, account_id: &str, password: &str) -> PortResult<Identity> {
        let response = self
            .http
            .dispatch(
                Service::Auth,
                "/login",
                RequestOptions::post().json(json!({
                    "accountId": account_id,
                    "password": password,
                })),
            )
            .await?;

        let parsed = response
            .data
            .map(serde_json::from_value::<LoginResponse>)
            .transpose()
            .map_err(|e| PortError::Decode(e.to_string()))?;

        match parsed {
            Some(LoginResponse { success: false, message, .. }) => Err(PortError::Http {
                status: response.status,
                message: message.unwrap_or_else(|| "login rejected".to_string()),
            }),
            Some(LoginResponse { data: Some(data), .. }) => Ok(data.into_user().to_domain()),
            // Logged in but no user in the body: ask the session who we are.
            _ => {
                debug!("Login response carried no user; fetching the current session.");
                self.current_user().await
            }
        }
    }

    async fn join(&self, registration: &Registration) -> PortResult<()> {
        self.http
            .dispatch(
                Service::Auth,
                "/auth/join",
                RequestOptions::post().json(json!({
                    "username": registration.name,
                    "accountId": registration.account_id,
                    "password": registration.password,
                })),
            )
            .await?;
        Ok(())
    }

    async fn logout(&self) -> PortResult<()> {
        self.http
            .dispatch(Service::Auth, "/auth/logout", RequestOptions::post())
            .await?;
        Ok(())
    }

    async fn current_user(&self) -> PortResult<Identity> {
        let response = self
            .http
            .dispatch(Service::Auth, "/auth/me", RequestOptions::get())
            .await?;
        let data = response.data.ok_or(PortError::Unauthorized)?;
        Ok(decode::<UserRecord>(data)?.to_domain())
    }

    async fn validate_session(&self) -> PortResult<bool> {
        match self
            .http
            .dispatch(Service::Auth, "/auth/validate", RequestOptions::get())
            .await
        {
            Ok(response) => match response.data {
                None => Ok(true),
                Some(Value::Object(map)) if map.get("success") == Some(&Value::Bool(false)) => {
                    Ok(false)
                }
                Some(data) => Ok(decode::<Value>(data)?.as_bool() != Some(false)),
            },
            Err(PortError::Unauthorized) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// A bare boolean body means "is a duplicate"; objects may say either way.
    async fn is_account_available(&self, account_id: &str) -> PortResult<bool> {
        let response = self
            .http
            .dispatch(
                Service::Auth,
                "/auth/duplicate",
                RequestOptions::get().query("accountId", account_id),
            )
            .await?;

        let data = response
            .data
            .ok_or_else(|| PortError::Decode("duplicate check returned no body".to_string()))?;
        let value = decode::<Value>(data)?;
        match &value {
            Value::Bool(duplicate) => Ok(!duplicate),
            Value::Object(map) => {
                let available = pick(map, &["available", "isAvailable"]).and_then(Value::as_bool);
                if let Some(available) = available {
                    Ok(available)
                } else if let Some(duplicate) =
                    pick(map, &["duplicate", "isDuplicate", "exists"]).and_then(Value::as_bool)
                {
                    Ok(!duplicate)
                } else {
                    Err(PortError::Decode(format!(
                        "unrecognized duplicate check body: {}",
                        value
                    )))
                }
            }
            other => Err(PortError::Decode(format!(
                "unrecognized duplicate check body: {}",
                other
            ))),
        }
    }
}
