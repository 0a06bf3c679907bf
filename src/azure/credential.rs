//! Bearer token and subscription for Azure Resource Manager.

use super::cli;
use crate::error::DeployError;
use serde::Deserialize;
use std::fmt;

/// Output of `az account get-access-token`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccessTokenResponse {
    access_token: String,
    subscription: String,
    #[serde(default)]
    tenant: Option<String>,
    /// Epoch seconds; only printed by recent CLI versions.
    #[serde(default, rename = "expires_on")]
    expires_on: Option<i64>,
}

/// Token plus the subscription every request is scoped to.
#[derive(Clone)]
pub struct ArmCredential {
    pub(crate) token: String,
    pub subscription_id: String,
    pub tenant_id: Option<String>,
}

impl ArmCredential {
    pub fn new(token: &str, subscription_id: &str) -> ArmCredential {
        ArmCredential {
            token: token.to_string(),
            subscription_id: subscription_id.to_string(),
            tenant_id: None,
        }
    }

    /// Ask the logged-in Azure CLI for a token scoped to `endpoint`.
    ///
    /// `subscription` overrides the CLI's default subscription.
    pub fn from_az_cli(endpoint: &str, subscription: Option<&str>) -> Result<ArmCredential, DeployError> {
        let response: AccessTokenResponse = cli::run_json(&token_command(endpoint, subscription))?;
        Self::from_response(response)
    }

    fn from_response(response: AccessTokenResponse) -> Result<ArmCredential, DeployError> {
        if response.access_token.is_empty() {
            return Err(DeployError::Cli("az returned an empty access token".to_string()));
        }
        if let Some(expires_on) = response.expires_on {
            match chrono::DateTime::from_timestamp(expires_on, 0) {
                Some(expires) => {
                    let left = expires - chrono::Utc::now();
                    log::info!(
                        "Got ARM token for subscription {} (expires {}, {} min left)",
                        response.subscription,
                        expires.format("%Y-%m-%d %H:%M:%S UTC"),
                        left.num_minutes()
                    );
                }
                None => log::warn!("Token expiry {expires_on} out of range"),
            }
        } else {
            log::info!("Got ARM token for subscription {}", response.subscription);
        }
        Ok(ArmCredential {
            token: response.access_token,
            subscription_id: response.subscription,
            tenant_id: response.tenant,
        })
    }
}

fn token_command(endpoint: &str, subscription: Option<&str>) -> String {
    let mut cmd = format!(
        "az account get-access-token --resource {}/ --output json",
        endpoint.trim_end_matches('/')
    );
    if let Some(subscription) = subscription.filter(|s| !s.trim().is_empty()) {
        cmd.push_str(&format!(" --subscription '{}'", subscription.trim()));
    }
    cmd
}

impl fmt::Debug for ArmCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArmCredential")
            .field("token", &"<redacted>")
            .field("subscription_id", &self.subscription_id)
            .field("tenant_id", &self.tenant_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cli_output() {
        let response: AccessTokenResponse = cli::parse_json(
            r#"{
                "accessToken": "eyJ0eXAi",
                "expiresOn": "2030-01-01 00:00:00.000000",
                "expires_on": 1893456000,
                "subscription": "00000000-1111-2222-3333-444444444444",
                "tenant": "tenant-id",
                "tokenType": "Bearer"
            }"#,
        )
        .expect("parse");
        let credential = ArmCredential::from_response(response).expect("credential");
        assert_eq!(
            credential.subscription_id,
            "00000000-1111-2222-3333-444444444444"
        );
        assert_eq!(credential.tenant_id.as_deref(), Some("tenant-id"));
        assert!(!format!("{credential:?}").contains("eyJ0eXAi"));
    }

    #[test]
    fn test_token_command_uses_endpoint() {
        assert_eq!(
            token_command("https://management.usgovcloudapi.net/", None),
            "az account get-access-token --resource https://management.usgovcloudapi.net/ --output json"
        );
        assert_eq!(
            token_command("https://management.azure.com", Some("sub-1")),
            "az account get-access-token --resource https://management.azure.com/ --output json --subscription 'sub-1'"
        );
        assert!(!token_command("https://management.azure.com", Some("")).contains("--subscription"));
    }

    #[test]
    fn test_empty_token_rejected() {
        let response: AccessTokenResponse =
            cli::parse_json(r#"{"accessToken": "", "subscription": "sub"}"#).expect("parse");
        assert!(matches!(
            ArmCredential::from_response(response),
            Err(DeployError::Cli(_))
        ));
    }
}
