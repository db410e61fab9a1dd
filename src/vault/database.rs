use crate::vault::{client, endpoint_url, vault_error_message};
use anyhow::{Result, anyhow};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{Instrument, info_span};

/// Default path of the database secrets engine role.
pub const DEFAULT_CREDS_PATH: &str = "/v1/database/creds/authdb";

/// Dynamic `MongoDB` credentials leased from Vault.
pub struct DatabaseCreds {
    pub lease_id: String,
    pub lease_duration: u64,
    pub username: String,
    pub password: SecretString,
}

impl std::fmt::Debug for DatabaseCreds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseCreds")
            .field("lease_id", &self.lease_id)
            .field("lease_duration", &self.lease_duration)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Get DB credentials from Vault
///
/// # Errors
/// Returns an error if the Vault request fails, Vault returns a non-success status, or the response is missing expected fields.
pub async fn database_creds(
    vault_url: &str,
    vault_token: &SecretString,
    db_path: &str,
) -> Result<DatabaseCreds> {
    let client = client()?;

    let db_creds = endpoint_url(vault_url, db_path)?;

    let span = info_span!("vault.database_creds", http.method = "GET", url = %db_creds);
    let response = client
        .get(&db_creds)
        .header("X-Vault-Token", vault_token.expose_secret())
        .send()
        .instrument(span)
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let json_response: Value = response.json().await?;

        return Err(anyhow!(
            "{} - {}, {}",
            db_creds,
            status,
            vault_error_message(&json_response)
        ));
    }

    let json_response: Value = response.json().await?;

    let lease_id = json_response
        .get("lease_id")
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("Error parsing JSON response: no lease_id found"))?;
    let lease_duration = json_response
        .get("lease_duration")
        .and_then(Value::as_u64)
        .ok_or_else(|| anyhow!("Error parsing JSON response: no lease_duration found"))?;
    let data = json_response
        .get("data")
        .ok_or_else(|| anyhow!("Error parsing JSON response: no data found"))?;
    let username = data
        .get("username")
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("Error parsing JSON response: no username found"))?;
    let password = data
        .get("password")
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("Error parsing JSON response: no password found"))?;

    Ok(DatabaseCreds {
        lease_id: lease_id.to_string(),
        lease_duration,
        username: username.to_string(),
        password: SecretString::from(password.to_string()),
    })
}
