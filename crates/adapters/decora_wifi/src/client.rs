//! myLeviton HTTP client.
//!
//! Wraps `reqwest::Client` with myLeviton URL construction, session-token
//! handling and error mapping. Every call is a single request: no retry,
//! no backoff.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::api::{
    DecoraApi, IotSwitch, Permission, Person, PersonId, Residence, ResidenceId,
    ResidentialAccountId, SwitchId, SwitchUpdate,
};
use crate::error::DecoraError;

/// Public myLeviton API root.
pub const DEFAULT_BASE_URL: &str = "https://my.leviton.com/api";

const CLIENT_ID: &str = "levdb-echo-proto";
const REGISTERED_VIA: &str = "myLeviton";

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    /// Session token.
    id: String,
    user_id: PersonId,
}

/// HTTP implementation of [`DecoraApi`].
pub struct LevitonClient {
    http: reqwest::Client,
    base_url: Url,
    token: Mutex<Option<SecretString>>,
}

impl LevitonClient {
    /// Build a client for `base_url` with the given request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, DecoraError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("minihub/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Self::with_client(http, base_url)
    }

    /// Build a client around a pre-configured `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: &str) -> Result<Self, DecoraError> {
        // A trailing slash makes `Url::join` append instead of replacing the last segment.
        let base_url = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))?;
        Ok(Self {
            http,
            base_url,
            token: Mutex::new(None),
        })
    }

    /// Whether a session token is currently held.
    pub fn is_logged_in(&self) -> bool {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn url(&self, path: &str) -> Result<Url, DecoraError> {
        Ok(self.base_url.join(path)?)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder, DecoraError> {
        let token = self.token.lock().unwrap_or_else(PoisonError::into_inner);
        let token = token.as_ref().ok_or(DecoraError::NotLoggedIn)?;
        Ok(request.header(reqwest::header::AUTHORIZATION, token.expose_secret()))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, DecoraError> {
        let url = self.url(path)?;
        debug!("GET {url}");
        let resp = self.authorize(self.http.get(url))?.send().await?;
        parse_body(resp).await
    }

    async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, DecoraError> {
        let url = self.url(path)?;
        debug!("PUT {url}");
        let resp = self.authorize(self.http.put(url).json(body))?.send().await?;
        parse_body(resp).await
    }
}

/// Map non-success statuses to [`DecoraError::Api`] and decode the body.
async fn parse_body<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, DecoraError> {
    let status = resp.status();
    let body = resp.text().await?;

    if !status.is_success() {
        return Err(DecoraError::Api {
            status: status.as_u16(),
            message: api_error_message(&body).unwrap_or_else(|| status.to_string()),
        });
    }

    serde_json::from_str(&body).map_err(|err| DecoraError::Deserialization {
        message: err.to_string(),
        body,
    })
}

/// myLeviton errors look like `{"error": {"message": "..."}}`.
fn api_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .pointer("/error/message")
        .and_then(serde_json::Value::as_str)
        .map(str::to_string)
}

impl DecoraApi for LevitonClient {
    async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<Option<Person>, DecoraError> {
        let url = self.url("Person/login")?;
        debug!(email, "logging into myLeviton");

        let resp = self
            .http
            .post(url)
            .json(&json!({
                "email": email,
                "password": password.expose_secret(),
                "clientId": CLIENT_ID,
                "registeredVia": REGISTERED_VIA,
            }))
            .send()
            .await?;

        if matches!(
            resp.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            return Ok(None);
        }

        let login: LoginResponse = parse_body(resp).await?;
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) =
            Some(SecretString::from(login.id));
        Ok(Some(Person { id: login.user_id }))
    }

    async fn logout(&self) -> Result<(), DecoraError> {
        let url = self.url("Person/logout")?;
        debug!("POST {url}");
        let resp = self.authorize(self.http.post(url))?.send().await?;
        let status = resp.status();
        // The session is gone server-side or unusable either way.
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if status.is_success() {
            Ok(())
        } else {
            Err(DecoraError::Api {
                status: status.as_u16(),
                message: status.to_string(),
            })
        }
    }

    async fn residential_permissions(
        &self,
        person: PersonId,
    ) -> Result<Vec<Permission>, DecoraError> {
        self.get(&format!("Person/{person}/residentialPermissions"))
            .await
    }

    async fn residences(
        &self,
        account: ResidentialAccountId,
    ) -> Result<Vec<Residence>, DecoraError> {
        self.get(&format!("ResidentialAccounts/{account}/residences"))
            .await
    }

    async fn iot_switches(&self, residence: ResidenceId) -> Result<Vec<IotSwitch>, DecoraError> {
        self.get(&format!("Residences/{residence}/iotSwitches")).await
    }

    async fn update_switch(
        &self,
        id: SwitchId,
        update: &SwitchUpdate,
    ) -> Result<IotSwitch, DecoraError> {
        self.put(&format!("IotSwitches/{id}"), update).await
    }

    async fn fetch_switch(&self, id: SwitchId) -> Result<IotSwitch, DecoraError> {
        self.get(&format!("IotSwitches/{id}")).await
    }
}
