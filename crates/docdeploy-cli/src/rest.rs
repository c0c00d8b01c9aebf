use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use docdeploy_client::{
    AccountRef, AccountResource, ClientError, CollectionResource, CollectionSpec, DatabaseResource,
    DatabaseSpec, ResourceClient, StoredProcedureResource, StoredProcedureSpec, collection_path,
    database_path, stored_procedure_path,
};

const THROUGHPUT_HEADER: &str = "x-ms-offer-throughput";

/// Resource client speaking the account's REST API.
///
/// Resources live under
/// `{endpoint}/resourceGroups/{group}/accounts/{account}/dbs/...`. Every
/// name is sent as a single percent-encoded path segment.
pub struct RestClient {
    http: reqwest::Client,
    account_url: Url,
    account: AccountRef,
    auth_token: Option<String>,
}

impl RestClient {
    pub fn new(
        endpoint: &str,
        account: AccountRef,
        auth_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::internal(format!("Failed to build HTTP client: {e}")))?;
        let mut account_url = Url::parse(endpoint)
            .map_err(|e| ClientError::internal(format!("Invalid endpoint {endpoint}: {e}")))?;
        account_url
            .path_segments_mut()
            .map_err(|_| ClientError::internal(format!("Endpoint {endpoint} cannot be a base URL")))?
            .pop_if_empty()
            .extend([
                "resourceGroups",
                account.resource_group.as_str(),
                "accounts",
                account.name.as_str(),
            ]);
        Ok(Self {
            http,
            account_url,
            account,
            auth_token,
        })
    }

    /// Appends `segments` below the account URL, encoding each one.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.account_url.clone();
        // `new` rejected endpoints that cannot carry path segments.
        if let Ok(mut path) = url.path_segments_mut() {
            path.extend(segments);
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let mut req = self.http.request(method, url);
        if let Some(token) = &self.auth_token {
            req = req.header("Authorization", token);
        }
        req.header("Accept", "application/json")
    }

    /// GET that maps 404 to `None`; every other failure is an error.
    async fn get_optional<T: DeserializeOwned>(
        &self,
        url: Url,
        path: &str,
    ) -> Result<Option<T>, ClientError> {
        debug!(%url, "GET");
        let resp = self
            .request(Method::GET, url)
            .send()
            .await
            .map_err(transport_error)?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        handle_response(resp, path).await.map(Some)
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
        body: &B,
        path: &str,
    ) -> Result<T, ClientError> {
        let resp = req
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;
        handle_response(resp, path).await
    }
}

fn transport_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        ClientError::connection(format!("Request timed out: {err}"))
    } else {
        ClientError::connection(format!("Failed to connect to account: {err}"))
    }
}

async fn handle_response<T: DeserializeOwned>(resp: Response, path: &str) -> Result<T, ClientError> {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();

    if !status.is_success() {
        return Err(status_error(status, &body, path));
    }

    serde_json::from_str(&body)
        .map_err(|e| ClientError::internal(format!("Failed to parse response for {path}: {e}")))
}

fn status_error(status: StatusCode, body: &str, path: &str) -> ClientError {
    let message = error_message(body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ClientError::unauthorized(message),
        StatusCode::NOT_FOUND => ClientError::not_found(path),
        StatusCode::CONFLICT => ClientError::already_exists(path),
        StatusCode::BAD_REQUEST => ClientError::invalid_resource(path, message),
        _ => ClientError::remote(status.as_u16(), message),
    }
}

/// Pulls `message` out of an error document, falling back to the raw body.
fn error_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body)
        && let Some(message) = json.get("message").and_then(|v| v.as_str())
    {
        return message.to_string();
    }
    body.to_string()
}

#[async_trait]
impl ResourceClient for RestClient {
    async fn account(&self) -> Result<Option<AccountResource>, ClientError> {
        let path = self.account.to_string();
        self.get_optional(self.account_url.clone(), &path).await
    }

    async fn get_database(&self, database: &str) -> Result<Option<DatabaseResource>, ClientError> {
        let path = database_path(database);
        self.get_optional(self.url(&["dbs", database]), &path).await
    }

    async fn create_database(&self, spec: &DatabaseSpec) -> Result<DatabaseResource, ClientError> {
        let path = database_path(&spec.id);
        let req = self.request(Method::POST, self.url(&["dbs"]));
        self.send_json(req, spec, &path).await
    }

    async fn get_collection(
        &self,
        database: &str,
        collection: &str,
    ) -> Result<Option<CollectionResource>, ClientError> {
        let path = collection_path(database, collection);
        let url = self.url(&["dbs", database, "colls", collection]);
        self.get_optional(url, &path).await
    }

    async fn create_collection(
        &self,
        database: &str,
        spec: &CollectionSpec,
    ) -> Result<CollectionResource, ClientError> {
        let path = collection_path(database, &spec.id);
        let url = self.url(&["dbs", database, "colls"]);
        let req = self
            .request(Method::POST, url)
            .header(THROUGHPUT_HEADER, spec.offer_throughput.to_string());
        self.send_json(req, spec, &path).await
    }

    async fn get_stored_procedure(
        &self,
        database: &str,
        collection: &str,
        procedure: &str,
    ) -> Result<Option<StoredProcedureResource>, ClientError> {
        let path = stored_procedure_path(database, collection, procedure);
        let url = self.url(&["dbs", database, "colls", collection, "sprocs", procedure]);
        self.get_optional(url, &path).await
    }

    async fn create_stored_procedure(
        &self,
        database: &str,
        collection: &str,
        spec: &StoredProcedureSpec,
    ) -> Result<StoredProcedureResource, ClientError> {
        let path = stored_procedure_path(database, collection, &spec.id);
        let url = self.url(&["dbs", database, "colls", collection, "sprocs"]);
        let req = self.request(Method::POST, url);
        self.send_json(req, spec, &path).await
    }

    async fn update_stored_procedure(
        &self,
        database: &str,
        collection: &str,
        spec: &StoredProcedureSpec,
    ) -> Result<StoredProcedureResource, ClientError> {
        let path = stored_procedure_path(database, collection, &spec.id);
        let url = self.url(&["dbs", database, "colls", collection, "sprocs", &spec.id]);
        let req = self.request(Method::PUT, url);
        self.send_json(req, spec, &path).await
    }

    fn account_ref(&self) -> &AccountRef {
        &self.account
    }

    fn backend_name(&self) -> &'static str {
        "rest"
    }
}
