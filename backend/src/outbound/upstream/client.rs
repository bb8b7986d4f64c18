//! Reqwest client implementing the gateway ports.
//!
//! This adapter owns transport details only: bearer forwarding, timeout and
//! HTTP error mapping, and JSON decoding into domain types. Policy has
//! already been decided by the time a call lands here.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::dto::RequestPatchDto;
use crate::domain::ports::{
    AttestationsGateway, CatalogueGateway, DirectoryGateway, ExportDocument, RequestPatch,
    RequestsGateway, UpstreamError,
};
use crate::domain::{
    AccessToken, AccountId, AccountUpdate, Attestation, AttestationDraft, AttestationId,
    NewAccount, RequestForm, RequestId, RequestRecord, TypeCatalogEntry, TypeId, TypeLabel,
    UserAccount,
};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP adapter over the upstream records API.
pub struct UpstreamClient {
    client: Client,
    base: Url,
}

impl UpstreamClient {
    /// Build an adapter with the default request timeout.
    ///
    /// # Errors
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base: Url) -> Result<Self, reqwest::Error> {
        Self::with_timeout(base, DEFAULT_TIMEOUT)
    }

    /// Build an adapter with an explicit request timeout.
    ///
    /// # Errors
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_timeout(base: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base })
    }

    fn endpoint(&self, path: &str) -> Result<Url, UpstreamError> {
        self.base
            .join(path)
            .map_err(|err| UpstreamError::transport(format!("invalid endpoint {path}: {err}")))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        token: &AccessToken,
        path: &str,
    ) -> Result<T, UpstreamError> {
        let url = self.endpoint(path)?;
        debug!(%url, "upstream GET");
        let response = self
            .client
            .get(url)
            .bearer_auth(token.as_str())
            .send()
            .await
            .map_err(map_transport_error)?;
        decode_json(response).await
    }

    async fn send_json<B: serde::Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        token: &AccessToken,
        method: reqwest::Method,
        path: &str,
        body: &B,
    ) -> Result<T, UpstreamError> {
        let url = self.endpoint(path)?;
        debug!(%url, method = %method, "upstream call");
        let response = self
            .client
            .request(method, url)
            .bearer_auth(token.as_str())
            .json(body)
            .send()
            .await
            .map_err(map_transport_error)?;
        decode_json(response).await
    }

    async fn download(
        &self,
        token: &AccessToken,
        path: &str,
    ) -> Result<ExportDocument, UpstreamError> {
        let url = self.endpoint(path)?;
        debug!(%url, "upstream download");
        let response = self
            .client
            .get(url)
            .bearer_auth(token.as_str())
            .send()
            .await
            .map_err(map_transport_error)?;
        let response = expect_success(response).await?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_owned();
        let bytes = response.bytes().await.map_err(map_transport_error)?;
        Ok(ExportDocument {
            content_type,
            bytes: bytes.to_vec(),
        })
    }

    async fn delete_resource(
        &self,
        token: &AccessToken,
        path: &str,
    ) -> Result<(), UpstreamError> {
        let url = self.endpoint(path)?;
        debug!(%url, "upstream DELETE");
        let response = self
            .client
            .delete(url)
            .bearer_auth(token.as_str())
            .send()
            .await
            .map_err(map_transport_error)?;
        expect_success(response).await.map(|_| ())
    }
}

fn map_transport_error(error: reqwest::Error) -> UpstreamError {
    UpstreamError::transport(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> UpstreamError {
    match status {
        StatusCode::NOT_FOUND => UpstreamError::NotFound,
        StatusCode::CONFLICT => UpstreamError::DependentRecords,
        _ => UpstreamError::status(status.as_u16(), body_preview(body)),
    }
}

async fn expect_success(response: Response) -> Result<Response, UpstreamError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.bytes().await.map_err(map_transport_error)?;
    Err(map_status_error(status, body.as_ref()))
}

async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, UpstreamError> {
    let response = expect_success(response).await?;
    let body = response.bytes().await.map_err(map_transport_error)?;
    serde_json::from_slice(body.as_ref())
        .map_err(|err| UpstreamError::decode(format!("invalid upstream JSON payload: {err}")))
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[async_trait]
impl RequestsGateway for UpstreamClient {
    async fn track(&self, token: &AccessToken) -> Result<Vec<RequestRecord>, UpstreamError> {
        self.get_json(token, "requests/track").await
    }

    async fn fetch(
        &self,
        token: &AccessToken,
        id: RequestId,
    ) -> Result<RequestRecord, UpstreamError> {
        self.get_json(token, &format!("requests/{id}")).await
    }

    async fn create(
        &self,
        token: &AccessToken,
        form: &RequestForm,
    ) -> Result<RequestRecord, UpstreamError> {
        self.send_json(token, reqwest::Method::POST, "requests", form)
            .await
    }

    async fn update(
        &self,
        token: &AccessToken,
        id: RequestId,
        patch: &RequestPatch,
    ) -> Result<RequestRecord, UpstreamError> {
        let body = RequestPatchDto::from(patch);
        self.send_json(token, reqwest::Method::PUT, &format!("requests/{id}"), &body)
            .await
    }

    async fn export_excel(&self, token: &AccessToken) -> Result<ExportDocument, UpstreamError> {
        self.download(token, "requests/exportExcel").await
    }
}

#[async_trait]
impl AttestationsGateway for UpstreamClient {
    async fn track(&self, token: &AccessToken) -> Result<Vec<Attestation>, UpstreamError> {
        self.get_json(token, "attestations/track").await
    }

    async fn fetch(
        &self,
        token: &AccessToken,
        id: AttestationId,
    ) -> Result<Attestation, UpstreamError> {
        self.get_json(token, &format!("attestations/{id}")).await
    }

    async fn create(
        &self,
        token: &AccessToken,
        draft: &AttestationDraft,
    ) -> Result<Attestation, UpstreamError> {
        self.send_json(token, reqwest::Method::POST, "attestations", draft)
            .await
    }

    async fn deliver(
        &self,
        token: &AccessToken,
        id: AttestationId,
    ) -> Result<Attestation, UpstreamError> {
        self.send_json(
            token,
            reqwest::Method::PUT,
            &format!("attestations/{id}/deliver"),
            &serde_json::json!({}),
        )
        .await
    }

    async fn receipt(
        &self,
        token: &AccessToken,
        id: AttestationId,
    ) -> Result<ExportDocument, UpstreamError> {
        self.download(token, &format!("attestations/{id}/receipt"))
            .await
    }

    async fn export_excel(&self, token: &AccessToken) -> Result<ExportDocument, UpstreamError> {
        self.download(token, "attestations/exportExcel").await
    }
}

#[async_trait]
impl CatalogueGateway for UpstreamClient {
    async fn list(&self, token: &AccessToken) -> Result<Vec<TypeCatalogEntry>, UpstreamError> {
        self.get_json(token, "type-attestations").await
    }

    async fn create(
        &self,
        token: &AccessToken,
        label: &TypeLabel,
    ) -> Result<TypeCatalogEntry, UpstreamError> {
        self.send_json(
            token,
            reqwest::Method::POST,
            "type-attestations",
            &serde_json::json!({ "label": label.as_str() }),
        )
        .await
    }

    async fn update(
        &self,
        token: &AccessToken,
        id: TypeId,
        label: &TypeLabel,
    ) -> Result<TypeCatalogEntry, UpstreamError> {
        self.send_json(
            token,
            reqwest::Method::PUT,
            &format!("type-attestations/{id}"),
            &serde_json::json!({ "label": label.as_str() }),
        )
        .await
    }

    async fn delete(&self, token: &AccessToken, id: TypeId) -> Result<(), UpstreamError> {
        self.delete_resource(token, &format!("type-attestations/{id}"))
            .await
    }
}

#[async_trait]
impl DirectoryGateway for UpstreamClient {
    async fn list(&self, token: &AccessToken) -> Result<Vec<UserAccount>, UpstreamError> {
        self.get_json(token, "users").await
    }

    async fn create(
        &self,
        token: &AccessToken,
        account: &NewAccount,
    ) -> Result<UserAccount, UpstreamError> {
        self.send_json(token, reqwest::Method::POST, "users", account)
            .await
    }

    async fn update(
        &self,
        token: &AccessToken,
        id: AccountId,
        update: &AccountUpdate,
    ) -> Result<UserAccount, UpstreamError> {
        self.send_json(token, reqwest::Method::PUT, &format!("users/{id}"), update)
            .await
    }

    async fn delete(&self, token: &AccessToken, id: AccountId) -> Result<(), UpstreamError> {
        self.delete_resource(token, &format!("users/{id}")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(StatusCode::NOT_FOUND, UpstreamError::NotFound)]
    #[case(StatusCode::CONFLICT, UpstreamError::DependentRecords)]
    #[case(
        StatusCode::BAD_GATEWAY,
        UpstreamError::status(502, "backend unavailable")
    )]
    fn maps_http_statuses_to_domain_errors(
        #[case] status: StatusCode,
        #[case] expected: UpstreamError,
    ) {
        assert_eq!(map_status_error(status, b"backend unavailable"), expected);
    }

    #[rstest]
    fn long_bodies_are_truncated_in_previews() {
        let body = "x".repeat(400);
        let preview = body_preview(body.as_bytes());
        assert!(preview.ends_with("..."));
        assert!(preview.chars().count() <= 163);
    }

    #[rstest]
    fn endpoints_resolve_against_the_base() {
        let client = UpstreamClient::new(Url::parse("http://records.test/api/").expect("base url"))
            .expect("client builds");
        let url = client.endpoint("requests/track").expect("endpoint");
        assert_eq!(url.as_str(), "http://records.test/api/requests/track");
    }
}
