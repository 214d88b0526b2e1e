//! Application registration listing with `@odata.nextLink` paging.

use crate::constants;
use crate::error::AuditError;
use crate::graph::wire::ApplicationPage;
use crate::graph::{AccessToken, DirectoryApplication, DirectoryClient, GraphClient};

impl DirectoryClient for GraphClient {
    fn list_applications(
        &self,
        token: &AccessToken,
    ) -> Result<Vec<DirectoryApplication>, AuditError> {
        let mut apps = Vec::new();
        let mut next = Some(format!(
            "{}?$select={}",
            self.graph_url("applications"),
            constants::APPLICATION_SELECT
        ));
        let mut pages = 0usize;

        while let Some(url) = next.take() {
            let response = self
                .http
                .get(&url)
                .bearer_auth(token.secret())
                .header("Accept", "application/json")
                .send()
                .map_err(|err| AuditError::DirectoryQuery(err.to_string()))?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().unwrap_or_default();
                return Err(AuditError::DirectoryQuery(format!(
                    "applications listing returned {}: {}",
                    status, body
                )));
            }

            let page: ApplicationPage = response.json().map_err(|err| {
                AuditError::DirectoryQuery(format!("invalid applications page: {}", err))
            })?;
            pages += 1;
            apps.extend(page.value);
            next = page.next_link;
        }

        tracing::info!(applications = apps.len(), pages, "listed application registrations");
        Ok(apps)
    }
}
