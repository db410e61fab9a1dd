//! Vault `AppRole` login, used to fetch short-lived `MongoDB` credentials
//! instead of keeping them in the connection string.

pub mod database;

use crate::APP_USER_AGENT;
use anyhow::{Result, anyhow};
use reqwest::Client;
use secrecy::SecretString;
use serde_json::{Value, json};
use tracing::{Instrument, debug, info_span};
use url::Url;

pub(crate) fn vault_error_message(json_response: &Value) -> &str {
    json_response
        .get("errors")
        .and_then(|v| v.get(0))
        .and_then(Value::as_str)
        .unwrap_or("")
}

pub(crate) fn client() -> Result<Client> {
    Ok(Client::builder().user_agent(APP_USER_AGENT).build()?)
}

/// Build `scheme://host:port{path}` from any URL on the Vault server.
///
/// # Errors
/// Returns an error if `url` cannot be parsed, has no host, or uses an unsupported scheme.
pub fn endpoint_url(url: &str, path: &str) -> Result<String> {
    let url = Url::parse(url)?;

    let scheme = url.scheme();

    let host = url
        .host()
        .ok_or_else(|| anyhow!("Error parsing URL: no host specified"))?
        .to_owned();

    let port = match url.port() {
        Some(p) => p,
        None => match scheme {
            "http" => 80,
            "https" => 443,
            _ => return Err(anyhow!("Error parsing URL: unsupported scheme {scheme}")),
        },
    };

    let endpoint_url = format!("{scheme}://{host}:{port}{path}");

    debug!("endpoint URL: {}", endpoint_url);

    Ok(endpoint_url)
}

/// Unwrap a response-wrapped secret id.
///
/// Create one with:
/// vault write -wrap-ttl=300s -f auth/approle/role/authdb/secret-id
///
/// # Errors
/// Returns an error if the request fails or the response has no `secret_id`.
pub async fn unwrap(url: &str, token: &str) -> Result<String> {
    let client = client()?;

    let unwrap_url = endpoint_url(url, "/v1/sys/wrapping/unwrap")?;

    let span = info_span!("vault.unwrap", http.method = "POST", url = %unwrap_url);
    let response = client
        .post(&unwrap_url)
        .header("X-Vault-Token", token)
        .send()
        .instrument(span)
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let json_response: Value = response.json().await?;

        return Err(anyhow!(
            "{} - {}, {}",
            unwrap_url,
            status,
            vault_error_message(&json_response)
        ));
    }

    let json_response: Value = response.json().await?;
    let sid = json_response
        .get("data")
        .and_then(|v| v.get("secret_id"))
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("Error parsing JSON response: no secret_id found"))?;

    Ok(sid.to_string())
}

/// Login with `AppRole`, `url` being the full login endpoint.
///
/// # Errors
/// Returns an error if the request fails or the response has no `client_token`.
pub async fn approle_login(url: &str, sid: &str, rid: &str) -> Result<(String, u64)> {
    let client = client()?;

    let login_payload = json!({
        "role_id": rid,
        "secret_id": sid
    });

    debug!("login URL: {}, role ID: {}", url, rid);

    let span = info_span!("vault.approle_login", http.method = "POST", url = %url);
    let response = client
        .post(url)
        .json(&login_payload)
        .send()
        .instrument(span)
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let json_response: Value = response.json().await?;

        return Err(anyhow!(
            "{} - {}, {}",
            url,
            status,
            vault_error_message(&json_response)
        ));
    }

    let json_response: Value = response.json().await?;
    let token = json_response
        .get("auth")
        .and_then(|v| v.get("client_token"))
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("Error parsing JSON response: no client_token found"))?;
    let lease_duration = json_response
        .get("auth")
        .and_then(|v| v.get("lease_duration"))
        .and_then(Value::as_u64)
        .unwrap_or(1800);

    Ok((token.to_string(), lease_duration))
}

/// Get a client token, unwrapping `wrapped_token` first when given.
///
/// # Errors
/// Returns an error if neither a secret id nor a wrapped token is available,
/// or if Vault rejects the login.
pub async fn login(
    url: &str,
    role_id: &str,
    secret_id: Option<&str>,
    wrapped_token: Option<&str>,
) -> Result<SecretString> {
    let secret_id = match (wrapped_token, secret_id) {
        (Some(wrapped), _) => unwrap(url, wrapped).await?,
        (None, Some(secret_id)) => secret_id.to_string(),
        (None, None) => return Err(anyhow!("Vault secret-id is required")),
    };

    let (token, lease_duration) = approle_login(url, &secret_id, role_id).await?;

    debug!("Vault token lease duration: {lease_duration}s");

    Ok(SecretString::from(token))
}
