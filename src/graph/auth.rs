//! OAuth2 client-credentials grant.

use crate::constants;
use crate::error::AuditError;
use crate::graph::{AccessToken, Authenticator, GraphClient};
use serde::Deserialize;

#[derive(Deserialize)]
struct TokenEndpointResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

impl Authenticator for GraphClient {
    fn authenticate(&self) -> Result<AccessToken, AuditError> {
        let form = vec![
            ("grant_type", "client_credentials"),
            ("client_id", self.settings.client_id.as_str()),
            ("client_secret", self.settings.client_secret.as_str()),
            ("scope", constants::GRAPH_DEFAULT_SCOPE),
        ];

        let response = self
            .http
            .post(self.token_url())
            .form(&form)
            .send()
            .map_err(|err| AuditError::Authentication(err.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(AuditError::Authentication(format!(
                "token endpoint returned {}: {}",
                status, body
            )));
        }

        let payload: TokenEndpointResponse = response
            .json()
            .map_err(|err| AuditError::Authentication(format!("invalid token response: {}", err)))?;

        tracing::info!(tenant = %self.settings.tenant_id, "authenticated against identity provider");
        let mut token = AccessToken::new(payload.access_token);
        token.expires_in = payload.expires_in;
        Ok(token)
    }
}
