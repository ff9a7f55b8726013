use crate::error::SourceError;
use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

const PLEX_TV_BASE_URL: &str = "https://plex.tv";
pub(crate) const CLIENT_IDENTIFIER: &str = "plexboxd";

/// Sign in to plex.tv with username and password, returning the account
/// auth token used for every subsequent request.
pub async fn sign_in(client: &Client, username: &str, password: &str) -> Result<String> {
    let url = format!("{}/users/sign_in.json", PLEX_TV_BASE_URL);
    let response = client
        .post(&url)
        .header("X-Plex-Client-Identifier", CLIENT_IDENTIFIER)
        .header("X-Plex-Product", "plexboxd")
        .header("X-Plex-Version", env!("CARGO_PKG_VERSION"))
        .header("Accept", "application/json")
        .form(&[("user[login]", username), ("user[password]", password)])
        .send()
        .await
        .context("Failed to reach plex.tv for sign-in")?;

    if !response.status().is_success() {
        return Err(SourceError::SignInFailed {
            status: response.status().as_u16(),
        }
        .into());
    }

    let json: Value = response
        .json()
        .await
        .context("Failed to parse sign-in response")?;

    let token = extract_auth_token(&json)
        .ok_or_else(|| anyhow::anyhow!("Sign-in response contained no auth token"))?;

    debug!("Plex sign-in successful for {}", username);
    Ok(token)
}

fn extract_auth_token(json: &Value) -> Option<String> {
    json.get("user")
        .and_then(|u| u.get("authToken"))
        .and_then(|t| t.as_str())
        .map(|t| t.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_auth_token() {
        let body = json!({
            "user": {
                "id": 1,
                "username": "someone",
                "authToken": "xyzzy-token"
            }
        });
        assert_eq!(extract_auth_token(&body), Some("xyzzy-token".to_string()));
    }

    #[test]
    fn test_extract_auth_token_missing() {
        let body = json!({ "error": "Invalid email, username, or password." });
        assert_eq!(extract_auth_token(&body), None);
    }
}
