//! Azure Resource Manager REST client.
//!
//! Base URL: `https://management.azure.com` (overridable for tests)
//! Auth: bearer token from [`ArmCredential`]

use super::cli::parse_json;
use super::credential::ArmCredential;
use crate::config;
use crate::error::DeployError;
use crate::models::Provisioned;
use colored::Colorize;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ── Error response shape from ARM ────────────────────────────────────

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// How long-running operations are awaited.
#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        PollSettings {
            interval: Duration::from_millis(config::POLL_MSEC),
            max_attempts: config::MAX_POLL_ATTEMPTS,
        }
    }
}

pub struct ArmClient {
    http: reqwest::Client,
    base_url: String,
    credential: ArmCredential,
    poll: PollSettings,
}

impl ArmClient {
    pub fn new(base_url: &str, credential: ArmCredential) -> Result<ArmClient, DeployError> {
        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(DeployError::MissingConfig {
                key: config::ENV_ARM_ENDPOINT.to_string(),
            });
        }
        let http = reqwest::Client::builder()
            .user_agent(concat!("ghes-azure-deploy/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(ArmClient {
            http,
            base_url: base_url.to_string(),
            credential,
            poll: PollSettings::default(),
        })
    }

    pub fn with_poll_settings(mut self, poll: PollSettings) -> ArmClient {
        self.poll = poll;
        self
    }

    pub fn subscription_id(&self) -> &str {
        &self.credential.subscription_id
    }

    // ── Paths ────────────────────────────────────────────────────────

    pub fn resource_group_path(&self, resource_group_name: &str) -> String {
        format!(
            "/subscriptions/{}/resourcegroups/{resource_group_name}",
            self.subscription_id()
        )
    }

    /// Path of a resource inside a group, e.g. `Microsoft.Network/virtualNetworks`.
    pub fn resource_path(&self, resource_group_name: &str, resource_type: &str, name: &str) -> String {
        format!(
            "/subscriptions/{}/resourceGroups/{resource_group_name}/providers/{resource_type}/{name}",
            self.subscription_id()
        )
    }

    fn url(&self, path: &str, api_version: &str) -> String {
        format!("{}{path}?api-version={api_version}", self.base_url)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub async fn get<T: DeserializeOwned>(&self, path: &str, api_version: &str) -> Result<T, DeployError> {
        let url = self.url(path, api_version);
        log::debug!("GET {url}");

        let resp = self
            .http
            .get(url)
            .bearer_auth(&self.credential.token)
            .send()
            .await?;
        handle_response(resp).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        api_version: &str,
        body: &B,
    ) -> Result<T, DeployError> {
        let url = self.url(path, api_version);
        log::debug!("PUT {url}");

        let resp = self
            .http
            .put(url)
            .bearer_auth(&self.credential.token)
            .json(body)
            .send()
            .await?;
        handle_response(resp).await
    }

    /// `false` on 404.
    pub async fn exists(&self, path: &str, api_version: &str) -> Result<bool, DeployError> {
        let url = self.url(path, api_version);
        log::debug!("GET {url}");

        let resp = self
            .http
            .get(url)
            .bearer_auth(&self.credential.token)
            .send()
            .await?;
        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            Ok(false)
        } else if status.is_success() {
            Ok(true)
        } else {
            Err(parse_error(status, resp).await)
        }
    }

    async fn delete(&self, path: &str, api_version: &str) -> Result<(), DeployError> {
        let url = self.url(path, api_version);
        log::debug!("DELETE {url}");

        let resp = self
            .http
            .delete(url)
            .bearer_auth(&self.credential.token)
            .send()
            .await?;
        let status = resp.status();
        if status.is_success() || status == reqwest::StatusCode::NOT_FOUND {
            Ok(())
        } else {
            Err(parse_error(status, resp).await)
        }
    }

    // ── Long-running operations ──────────────────────────────────────

    /// PUT, then poll GET until `provisioningState` is terminal.
    pub async fn put_and_wait<T, B>(
        &self,
        kind: &str,
        name: &str,
        path: &str,
        api_version: &str,
        body: &B,
    ) -> Result<T, DeployError>
    where
        T: DeserializeOwned + Provisioned,
        B: Serialize + Sync,
    {
        log::info!("Applying {kind} {}", name.green());
        let mut resource: T = self.put(path, api_version, body).await?;
        let mut attempts = 0;

        loop {
            let state = resource.provisioning_state().map(str::to_string);
            match state.as_deref() {
                None | Some("Succeeded") => {
                    log::info!("{kind} {} {}", name.green(), "Succeeded".green());
                    return Ok(resource);
                }
                Some(state @ ("Failed" | "Canceled")) => {
                    log::error!("{kind} {} {}", name.red(), state.on_red());
                    return Err(DeployError::ProvisioningFailed {
                        kind: kind.to_string(),
                        resource: name.to_string(),
                        state: state.to_string(),
                    });
                }
                Some(state) => {
                    if attempts >= self.poll.max_attempts {
                        return Err(DeployError::ProvisioningTimeout {
                            kind: kind.to_string(),
                            resource: name.to_string(),
                            attempts,
                        });
                    }
                    attempts += 1;
                    log::trace!("poll #{attempts} {name} state={state}");
                    tokio::time::sleep(self.poll.interval).await;
                    resource = self.get(path, api_version).await?;
                }
            }
        }
    }

    /// DELETE, then poll until the resource is gone.
    pub async fn delete_and_wait(
        &self,
        kind: &str,
        name: &str,
        path: &str,
        api_version: &str,
    ) -> Result<(), DeployError> {
        log::warn!("Deleting {kind} {}", name.red());
        self.delete(path, api_version).await?;

        let mut attempts = 0;
        while self.exists(path, api_version).await? {
            if attempts >= self.poll.max_attempts {
                return Err(DeployError::ProvisioningTimeout {
                    kind: kind.to_string(),
                    resource: name.to_string(),
                    attempts,
                });
            }
            attempts += 1;
            log::trace!("poll #{attempts} waiting for {name} deletion");
            tokio::time::sleep(self.poll.interval).await;
        }
        log::info!("Deleted {kind} {name}");
        Ok(())
    }
}

// ── Response handling ────────────────────────────────────────────────

async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, DeployError> {
    let status = resp.status();
    if status.is_success() {
        let body = resp.text().await?;
        parse_json(&body).inspect_err(|_| {
            log::error!("BODY START:\n\n{}\n\nBODY END\n", body);
        })
    } else {
        Err(parse_error(status, resp).await)
    }
}

async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> DeployError {
    let raw = resp.text().await.unwrap_or_default();

    let (code, message) = match serde_json::from_str::<ErrorResponse>(&raw) {
        Ok(err) => (
            err.error.code.unwrap_or_else(|| status.to_string()),
            err.error.message.unwrap_or_default(),
        ),
        Err(_) => (status.to_string(), raw),
    };
    log::warn!("{} HTTP {} {code}: {message}", "failed".on_red(), status.as_u16());
    DeployError::from_provider_status(status.as_u16(), code, message)
}
