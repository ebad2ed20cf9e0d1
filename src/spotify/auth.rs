use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::Client;

use crate::{error::ServiceError, info, management::AppCredentials, types::TokenResponse};

/// Exchanges a refresh token for a new access token.
///
/// Authenticates the client with HTTP Basic credentials
/// (`base64(client_id:client_secret)`), as required for applications that
/// own a client secret.
///
/// # Errors
///
/// - `ServiceError::Credentials` - the token endpoint rejected the refresh token
///   or the client credentials
/// - `ServiceError::Http` - network failure
/// - `ServiceError::Decode` - the response did not contain an access token
pub async fn refresh_token(
    http: &Client,
    app: &AppCredentials,
    refresh_token: &str,
) -> Result<TokenResponse, ServiceError> {
    info!("Refreshing Spotify authentication");

    let response = http
        .post(&app.token_url)
        .header("Authorization", basic_auth_header(app))
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ServiceError::Credentials(format!(
            "token endpoint answered {}: {}",
            status.as_u16(),
            body
        )));
    }

    response
        .json::<TokenResponse>()
        .await
        .map_err(|e| ServiceError::Decode(e.to_string()))
}

pub fn basic_auth_header(app: &AppCredentials) -> String {
    let credentials = format!("{}:{}", app.client_id, app.client_secret);
    format!("Basic {}", STANDARD.encode(credentials))
}
