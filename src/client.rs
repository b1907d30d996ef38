//! Resend async client implementation.

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use reqwest::Method;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use url::Url;
use uuid::Uuid;

use crate::models::{
    ApiKey, ApiKeyCreateRequest, ApiKeyData, Audience, AudienceAddRequest, Contact, ContactData,
    DeliveryRegion, Domain, DomainAddRequest, DomainUpdateData, EmailMessage, EmailReceipt,
    ListOf, ObjectId, Permission, Webhook,
};
use crate::transport::{ApiRequest, ApiResponse, ReqwestTransport, Transport};
use crate::{Error, Response, Result};

const DEFAULT_API_URL: &str = "https://api.resend.com";
const API_TOKEN_ENV: &str = "RESEND_APITOKEN";

/// Async client for the Resend email API.
///
/// Every method performs one independent request and accepts a
/// [`CancellationToken`]; cancelling it aborts the in-flight request and the
/// method returns [`Error::Cancelled`].
///
/// Failures (non-2xx statuses and unusable response bodies) are returned as
/// `Err` by default. Build with [`ClientBuilder::throw_errors`]`(false)` to get
/// them back as [`Response::Failure`] instead. Cheap to clone; clones share
/// the connection pool.
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
    throw_errors: bool,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("throw_errors", &self.throw_errors)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Create a builder for configuring the client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a client for the production API with default settings.
    ///
    /// # Examples
    /// ```no_run
    /// # use resend_client::Client;
    /// let client = Client::new("re_123456789")?;
    /// # Ok::<(), resend_client::Error>(())
    /// ```
    pub fn new(api_token: impl Into<String>) -> Result<Self> {
        ClientBuilder::new().api_token(api_token).build()
    }

    /// Whether failures are returned as `Err` rather than [`Response::Failure`].
    pub fn throws_errors(&self) -> bool {
        self.throw_errors
    }

    /// Send a single email.
    ///
    /// # Returns
    /// The identifier Resend assigned to the email.
    ///
    /// # Examples
    /// ```no_run
    /// # use resend_client::{Client, EmailMessage};
    /// # use resend_client::CancellationToken;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), resend_client::Error> {
    /// let client = Client::new("re_123456789")?;
    /// let message = EmailMessage::new("onboarding@acme.dev", ["delivered@resend.dev"], "Hello")
    ///     .html("<strong>It works!</strong>");
    /// let id = client.send_email(&message, &CancellationToken::new()).await?;
    /// println!("{:?}", id.content());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn send_email(
        &self,
        message: &EmailMessage,
        cancel: &CancellationToken,
    ) -> Result<Response<Uuid>> {
        let request = ApiRequest::new(Method::POST, ["emails"]).json(message)?;
        let response = self.dispatch(request, cancel).await?;
        self.handle(response, ObjectId::into_id)
    }

    /// Fetch a previously sent email.
    pub async fn retrieve_email(
        &self,
        email_id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<Response<EmailReceipt>> {
        let request = ApiRequest::new(Method::GET, ["emails".to_string(), email_id.to_string()]);
        let response = self.dispatch(request, cancel).await?;
        self.handle_value(response)
    }

    /// Send several emails in one request.
    ///
    /// # Returns
    /// The assigned identifiers, in the same order as `messages`.
    pub async fn send_email_batch(
        &self,
        messages: &[EmailMessage],
        cancel: &CancellationToken,
    ) -> Result<Response<Vec<Uuid>>> {
        let request = ApiRequest::new(Method::POST, ["emails", "batch"]).json(messages)?;
        let response = self.dispatch(request, cancel).await?;
        self.handle(response, |ids: Vec<ObjectId>| {
            ids.into_iter().map(ObjectId::into_id).collect()
        })
    }

    /// Register a sending domain. The region defaults server-side when `None`.
    ///
    /// # Returns
    /// The new domain, including the DNS records to publish.
    pub async fn add_domain(
        &self,
        name: &str,
        region: Option<DeliveryRegion>,
        cancel: &CancellationToken,
    ) -> Result<Response<Domain>> {
        let body = DomainAddRequest { name, region };
        let request = ApiRequest::new(Method::POST, ["domains"]).json(&body)?;
        let response = self.dispatch(request, cancel).await?;
        self.handle_value(response)
    }

    /// Fetch a domain, including its DNS records.
    pub async fn retrieve_domain(
        &self,
        domain_id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<Response<Domain>> {
        let request =
            ApiRequest::new(Method::GET, ["domains".to_string(), domain_id.to_string()]);
        let response = self.dispatch(request, cancel).await?;
        self.handle_value(response)
    }

    /// Change tracking and TLS settings of a domain.
    pub async fn update_domain(
        &self,
        domain_id: Uuid,
        data: &DomainUpdateData,
        cancel: &CancellationToken,
    ) -> Result<Response<()>> {
        let request =
            ApiRequest::new(Method::PATCH, ["domains".to_string(), domain_id.to_string()])
                .json(data)?;
        let response = self.dispatch(request, cancel).await?;
        self.handle_empty(response)
    }

    /// Ask Resend to re-check the domain's DNS records.
    pub async fn verify_domain(
        &self,
        domain_id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<Response<()>> {
        let request = ApiRequest::new(
            Method::POST,
            ["domains".to_string(), domain_id.to_string(), "verify".to_string()],
        );
        let response = self.dispatch(request, cancel).await?;
        self.handle_empty(response)
    }

    /// List all domains of the account.
    pub async fn list_domains(&self, cancel: &CancellationToken) -> Result<Response<Vec<Domain>>> {
        let request = ApiRequest::new(Method::GET, ["domains"]);
        let response = self.dispatch(request, cancel).await?;
        self.handle(response, ListOf::<Domain>::into_data)
    }

    /// Remove a domain.
    pub async fn delete_domain(
        &self,
        domain_id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<Response<()>> {
        let request =
            ApiRequest::new(Method::DELETE, ["domains".to_string(), domain_id.to_string()]);
        let response = self.dispatch(request, cancel).await?;
        self.handle_empty(response)
    }

    /// Create an API key.
    ///
    /// # Arguments
    /// * `name` - Display name of the key
    /// * `permission` - Scope; Resend grants full access when `None`
    /// * `domain_id` - Restrict a sending key to one domain
    ///
    /// # Returns
    /// The key identifier and its secret token. The token is not retrievable later.
    pub async fn create_api_key(
        &self,
        name: &str,
        permission: Option<Permission>,
        domain_id: Option<Uuid>,
        cancel: &CancellationToken,
    ) -> Result<Response<ApiKeyData>> {
        let body = ApiKeyCreateRequest {
            name,
            permission,
            domain_id,
        };
        let request = ApiRequest::new(Method::POST, ["api-keys"]).json(&body)?;
        let response = self.dispatch(request, cancel).await?;
        self.handle_value(response)
    }

    /// List API key metadata. Secrets are not included.
    pub async fn list_api_keys(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Response<Vec<ApiKey>>> {
        let request = ApiRequest::new(Method::GET, ["api-keys"]);
        let response = self.dispatch(request, cancel).await?;
        self.handle(response, ListOf::<ApiKey>::into_data)
    }

    /// Revoke an API key.
    pub async fn delete_api_key(
        &self,
        api_key_id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<Response<()>> {
        let request =
            ApiRequest::new(Method::DELETE, ["api-keys".to_string(), api_key_id.to_string()]);
        let response = self.dispatch(request, cancel).await?;
        self.handle_empty(response)
    }

    /// List registered webhook endpoints.
    pub async fn list_webhooks(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Response<Vec<Webhook>>> {
        let request = ApiRequest::new(Method::GET, ["webhooks"]);
        let response = self.dispatch(request, cancel).await?;
        self.handle(response, ListOf::<Webhook>::into_data)
    }

    /// Create an audience and return its identifier.
    pub async fn add_audience(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<Response<Uuid>> {
        let request =
            ApiRequest::new(Method::POST, ["audiences"]).json(&AudienceAddRequest { name })?;
        let response = self.dispatch(request, cancel).await?;
        self.handle(response, ObjectId::into_id)
    }

    /// Fetch an audience.
    pub async fn retrieve_audience(
        &self,
        audience_id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<Response<Audience>> {
        let request =
            ApiRequest::new(Method::GET, ["audiences".to_string(), audience_id.to_string()]);
        let response = self.dispatch(request, cancel).await?;
        self.handle_value(response)
    }

    /// List all audiences of the account.
    pub async fn list_audiences(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Response<Vec<Audience>>> {
        let request = ApiRequest::new(Method::GET, ["audiences"]);
        let response = self.dispatch(request, cancel).await?;
        self.handle(response, ListOf::<Audience>::into_data)
    }

    /// Remove an audience and its contacts.
    pub async fn delete_audience(
        &self,
        audience_id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<Response<()>> {
        let request =
            ApiRequest::new(Method::DELETE, ["audiences".to_string(), audience_id.to_string()]);
        let response = self.dispatch(request, cancel).await?;
        self.handle_empty(response)
    }

    /// Add a contact to an audience.
    ///
    /// # Errors
    /// [`Error::Validation`] when `data.email` is missing or blank. This is
    /// checked before any request is sent, whatever the error mode.
    pub async fn add_contact(
        &self,
        audience_id: Uuid,
        data: &ContactData,
        cancel: &CancellationToken,
    ) -> Result<Response<Uuid>> {
        match data.email.as_deref() {
            Some(email) if !email.trim().is_empty() => {}
            _ => {
                return Err(Error::Validation {
                    field: "email",
                    reason: "must be set when adding a contact".to_string(),
                });
            }
        }

        let request = ApiRequest::new(Method::POST, contacts_path(audience_id)).json(data)?;
        let response = self.dispatch(request, cancel).await?;
        self.handle(response, ObjectId::into_id)
    }

    /// Fetch a contact of an audience.
    pub async fn retrieve_contact(
        &self,
        audience_id: Uuid,
        contact_id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<Response<Contact>> {
        let request = ApiRequest::new(Method::GET, contact_path(audience_id, contact_id));
        let response = self.dispatch(request, cancel).await?;
        self.handle_value(response)
    }

    /// Update a contact. Fields left `None` in `data` are not changed.
    ///
    /// # Arguments
    /// * `audience_id` - Audience the contact belongs to
    /// * `contact_id` - Contact to change
    /// * `data` - New field values
    pub async fn update_contact(
        &self,
        audience_id: Uuid,
        contact_id: Uuid,
        data: &ContactData,
        cancel: &CancellationToken,
    ) -> Result<Response<()>> {
        let request =
            ApiRequest::new(Method::PATCH, contact_path(audience_id, contact_id)).json(data)?;
        let response = self.dispatch(request, cancel).await?;
        self.handle_empty(response)
    }

    /// Remove a contact from an audience.
    pub async fn delete_contact(
        &self,
        audience_id: Uuid,
        contact_id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<Response<()>> {
        let request = ApiRequest::new(Method::DELETE, contact_path(audience_id, contact_id));
        let response = self.dispatch(request, cancel).await?;
        self.handle_empty(response)
    }

    /// Delete a contact addressed by its email instead of its identifier.
    ///
    /// # Arguments
    /// * `audience_id` - Audience the contact belongs to
    /// * `email` - Address of the contact, sent as a single path segment
    ///
    /// # Errors
    /// [`Error::Validation`] when `email` is blank, `.` or `..`. Such a value
    /// would resolve to the contact collection instead of one contact, so no
    /// request is sent.
    pub async fn delete_contact_by_email(
        &self,
        audience_id: Uuid,
        email: &str,
        cancel: &CancellationToken,
    ) -> Result<Response<()>> {
        if matches!(email.trim(), "" | "." | "..") {
            return Err(Error::Validation {
                field: "email",
                reason: "must name a single contact".to_string(),
            });
        }

        let mut segments = contacts_path(audience_id);
        segments.push(email.to_string());
        let request = ApiRequest::new(Method::DELETE, segments);
        let response = self.dispatch(request, cancel).await?;
        self.handle_empty(response)
    }

    /// List the contacts of an audience.
    pub async fn list_contacts(
        &self,
        audience_id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<Response<Vec<Contact>>> {
        let request = ApiRequest::new(Method::GET, contacts_path(audience_id));
        let response = self.dispatch(request, cancel).await?;
        self.handle(response, ListOf::<Contact>::into_data)
    }

    /// Send `request`, racing it against `cancel`.
    async fn dispatch(
        &self,
        request: ApiRequest,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        tracing::debug!(method = %request.method, path = %request.path(), "Resend request");

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!("Resend request cancelled");
                return Err(Error::Cancelled);
            }
            response = self.transport.execute(request) => response?,
        };

        tracing::debug!(status = %response.status, "Resend response");
        Ok(response)
    }

    /// Turn `error` into the configured failure outcome.
    fn fail<T>(&self, error: Error) -> Result<Response<T>> {
        tracing::warn!(
            status = ?error.status(),
            code = ?error.code(),
            "Resend call failed: {error}"
        );

        if self.throw_errors {
            Err(error)
        } else {
            Ok(Response::Failure(error))
        }
    }

    /// Handle a response for an operation without a payload.
    fn handle_empty(&self, response: ApiResponse) -> Result<Response<()>> {
        if !response.status.is_success() {
            return self.fail(status_error(&response));
        }
        Ok(Response::Empty)
    }

    fn handle_value<T: DeserializeOwned>(&self, response: ApiResponse) -> Result<Response<T>> {
        self.handle(response, Ok::<T, String>)
    }

    /// Handle a response carrying a `T1` body that `map` turns into the returned `T2`.
    fn handle<T1, T2>(
        &self,
        response: ApiResponse,
        map: impl FnOnce(T1) -> std::result::Result<T2, String>,
    ) -> Result<Response<T2>>
    where
        T1: DeserializeOwned,
    {
        if !response.status.is_success() {
            return self.fail(status_error(&response));
        }

        let value: serde_json::Value = match serde_json::from_slice(&response.body) {
            Ok(value) => value,
            Err(err) => return self.fail(Error::Deserialize(err)),
        };

        if is_null_payload(&value) {
            return self.fail(Error::NullPayload);
        }

        let parsed: T1 = match serde_json::from_value(value) {
            Ok(parsed) => parsed,
            Err(err) => return self.fail(Error::Deserialize(err)),
        };

        match map(parsed) {
            Ok(mapped) => Ok(Response::Content(mapped)),
            Err(reason) => self.fail(Error::Mapping {
                from: type_name::<T1>(),
                to: type_name::<T2>(),
                reason,
            }),
        }
    }
}

/// Error body Resend sends with 4xx/5xx answers.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

fn status_error(response: &ApiResponse) -> Error {
    let message = serde_json::from_slice::<ErrorBody>(&response.body)
        .ok()
        .and_then(|body| body.message)
        .or_else(|| response.status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| "unknown error".to_string());

    Error::Status {
        status: response.status,
        message,
    }
}

fn is_null_payload(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn contacts_path(audience_id: Uuid) -> Vec<String> {
    vec![
        "audiences".to_string(),
        audience_id.to_string(),
        "contacts".to_string(),
    ]
}

fn contact_path(audience_id: Uuid, contact_id: Uuid) -> Vec<String> {
    let mut segments = contacts_path(audience_id);
    segments.push(contact_id.to_string());
    segments
}

/// Builder for configuring a Resend client.
///
/// Start with [`Client::builder`] to override defaults. Building never
/// touches the network.
#[derive(Clone)]
pub struct ClientBuilder {
    api_token: Option<String>,
    api_url: String,
    throw_errors: bool,
    http: Option<reqwest::Client>,
    transport: Option<Arc<dyn Transport>>,
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("api_url", &self.api_url)
            .field("throw_errors", &self.throw_errors)
            .field("custom_transport", &self.transport.is_some())
            .finish()
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientBuilder {
    /// Create a new builder with default settings.
    ///
    /// Defaults:
    /// - No API token
    /// - `https://api.resend.com` as the API url
    /// - `throw_errors = true`
    /// - A fresh `reqwest` connection pool
    pub fn new() -> Self {
        Self {
            api_token: None,
            api_url: DEFAULT_API_URL.to_string(),
            throw_errors: true,
            http: None,
            transport: None,
        }
    }

    /// Create a builder with the token taken from `RESEND_APITOKEN`, if set.
    pub fn from_env() -> Self {
        let mut builder = Self::new();
        builder.api_token = std::env::var(API_TOKEN_ENV).ok();
        builder
    }

    /// Set the bearer token sent with every request.
    pub fn api_token(mut self, api_token: impl Into<String>) -> Self {
        self.api_token = Some(api_token.into());
        self
    }

    /// Override the API base url.
    ///
    /// Useful for testing or when routing through a proxy.
    pub fn api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Return failures as `Err` (default `true`) or as [`Response::Failure`].
    pub fn throw_errors(mut self, value: bool) -> Self {
        self.throw_errors = value;
        self
    }

    /// Reuse an existing `reqwest` client and its connection pool.
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Send requests through a custom [`Transport`].
    ///
    /// The transport is then responsible for authentication; the token, url
    /// and http client settings are ignored.
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Build the client.
    ///
    /// # Errors
    /// [`Error::MissingToken`] without a token, [`Error::Url`] for an
    /// unusable url, [`Error::Header`] for a token that is not a valid
    /// header value.
    pub fn build(self) -> Result<Client> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => {
                let api_token = self
                    .api_token
                    .filter(|token| !token.trim().is_empty())
                    .ok_or(Error::MissingToken)?;
                let base_url = Url::parse(&self.api_url)?;
                let http = match self.http {
                    Some(http) => http,
                    None => reqwest::Client::builder().build()?,
                };
                Arc::new(ReqwestTransport::new(http, base_url, &api_token)?)
            }
        };

        Ok(Client {
            transport,
            throw_errors: self.throw_errors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorCode;
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Replies with a canned response and records every request.
    struct CannedTransport {
        reply: ApiResponse,
        requests: Mutex<Vec<ApiRequest>>,
    }

    impl CannedTransport {
        fn new(status: u16, body: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: ApiResponse::new(StatusCode::from_u16(status).unwrap(), body.as_bytes()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        fn last(&self) -> ApiRequest {
            self.requests.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl Transport for Arc<CannedTransport> {
        async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
            self.requests.lock().unwrap().push(request);
            Ok(self.reply.clone())
        }
    }

    /// Never answers.
    struct HangingTransport;

    #[async_trait]
    impl Transport for HangingTransport {
        async fn execute(&self, _request: ApiRequest) -> Result<ApiResponse> {
            std::future::pending().await
        }
    }

    fn client(transport: &Arc<CannedTransport>, throw_errors: bool) -> Client {
        Client::builder()
            .transport(Arc::clone(transport))
            .throw_errors(throw_errors)
            .build()
            .unwrap()
    }

    fn token() -> CancellationToken {
        CancellationToken::new()
    }

    #[tokio::test]
    async fn add_contact_without_email_sends_nothing() {
        let transport =
            CannedTransport::new(200, r#"{"id":"479e3145-dd38-476b-932c-529ceb705947"}"#);
        for throw_errors in [true, false] {
            let client = client(&transport, throw_errors);
            let err = client
                .add_contact(Uuid::new_v4(), &ContactData::default(), &token())
                .await
                .unwrap_err();
            assert!(matches!(err, Error::Validation { field: "email", .. }));

            let blank = ContactData::with_email("  ");
            let err = client.add_contact(Uuid::new_v4(), &blank, &token()).await.unwrap_err();
            assert!(matches!(err, Error::Validation { .. }));
        }
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn add_contact_posts_to_audience() {
        let body = r#"{"object":"contact","id":"479e3145-dd38-476b-932c-529ceb705947"}"#;
        let transport = CannedTransport::new(201, body);
        let client = client(&transport, true);
        let audience = Uuid::new_v4();

        let id = client
            .add_contact(audience, &ContactData::with_email("steve@acme.dev"), &token())
            .await
            .unwrap();
        assert_eq!(id.into_content().unwrap().to_string(), "479e3145-dd38-476b-932c-529ceb705947");

        let request = transport.last();
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.path(), format!("/audiences/{audience}/contacts"));
        assert_eq!(request.body.as_deref(), Some(br#"{"email":"steve@acme.dev"}"#.as_slice()));
    }

    #[tokio::test]
    async fn cancelled_token_skips_transport() {
        let transport = CannedTransport::new(200, "{}");
        let client = client(&transport, false);
        let cancel = token();
        cancel.cancel();

        let err = client.list_domains(&cancel).await.unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn cancelling_aborts_in_flight_request() {
        let client = Client::builder().transport(HangingTransport).build().unwrap();
        let cancel = token();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let err = client.delete_domain(Uuid::new_v4(), &cancel).await.unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }

    #[tokio::test]
    async fn status_failure_follows_mode() {
        let body = r#"{"statusCode":404,"message":"Domain not found","name":"not_found"}"#;
        let transport = CannedTransport::new(404, body);

        let err = client(&transport, true)
            .retrieve_domain(Uuid::new_v4(), &token())
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert!(err.to_string().contains("Domain not found"));

        let resp = client(&transport, false)
            .retrieve_domain(Uuid::new_v4(), &token())
            .await
            .unwrap();
        assert!(!resp.is_success());
        assert!(resp.content().is_none());
        assert_eq!(resp.status(), Some(StatusCode::NOT_FOUND));

        let resp = client(&transport, false)
            .verify_domain(Uuid::new_v4(), &token())
            .await
            .unwrap();
        assert_eq!(resp.status(), Some(StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn status_failure_without_body_uses_reason() {
        let transport = CannedTransport::new(503, "");
        let err = client(&transport, true).list_api_keys(&token()).await.unwrap_err();
        match err {
            Error::Status { status, message } => {
                assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
                assert_eq!(message, "Service Unavailable");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_rc001() {
        let transport = CannedTransport::new(200, "<html>oops</html>");

        let resp = client(&transport, false).list_audiences(&token()).await.unwrap();
        assert_eq!(resp.code(), Some(ErrorCode::Deserialize));
        assert!(resp.content().is_none());

        let err = client(&transport, true).list_audiences(&token()).await.unwrap_err();
        assert!(matches!(err, Error::Deserialize(_)));
    }

    #[tokio::test]
    async fn wrong_shape_is_rc001() {
        let transport = CannedTransport::new(200, r#"{"id":"not-a-uuid"}"#);
        let resp = client(&transport, false)
            .add_audience("Registered Users", &token())
            .await
            .unwrap();
        assert_eq!(resp.code(), Some(ErrorCode::Deserialize));
    }

    #[tokio::test]
    async fn null_body_is_rc002() {
        for body in ["null", "{}"] {
            let transport = CannedTransport::new(200, body);

            let resp = client(&transport, false)
                .retrieve_audience(Uuid::new_v4(), &token())
                .await
                .unwrap();
            assert_eq!(resp.code(), Some(ErrorCode::NullPayload));

            let err = client(&transport, true)
                .send_email(&EmailMessage::new("a@acme.dev", ["b@acme.dev"], "x"), &token())
                .await
                .unwrap_err();
            assert!(matches!(err, Error::NullPayload));
        }
    }

    #[tokio::test]
    async fn missing_list_envelope_is_rc003() {
        let transport = CannedTransport::new(200, r#"{"object":"list"}"#);

        let resp = client(&transport, false).list_webhooks(&token()).await.unwrap();
        assert_eq!(resp.code(), Some(ErrorCode::Mapping));

        let err = client(&transport, true).list_webhooks(&token()).await.unwrap_err();
        assert!(err.to_string().starts_with("RC003"));
    }

    #[tokio::test]
    async fn empty_success() {
        let transport = CannedTransport::new(200, "");
        let resp = client(&transport, true)
            .delete_api_key(Uuid::new_v4(), &token())
            .await
            .unwrap();
        assert!(matches!(resp, Response::Empty));
    }

    #[tokio::test]
    async fn delete_by_email_keeps_address_as_one_segment() {
        let transport = CannedTransport::new(200, "");
        let audience = Uuid::new_v4();
        let _ = client(&transport, true)
            .delete_contact_by_email(audience, "steve+news@acme.dev", &token())
            .await
            .unwrap();

        let request = transport.last();
        assert_eq!(request.method, Method::DELETE);
        assert_eq!(request.segments.last().map(String::as_str), Some("steve+news@acme.dev"));
        assert_eq!(request.segments.len(), 4);
    }

    #[tokio::test]
    async fn delete_by_email_rejects_path_like_addresses() {
        let transport = CannedTransport::new(200, "");
        for throw_errors in [true, false] {
            let client = client(&transport, throw_errors);
            for email in ["", "  ", ".", ".."] {
                let err = client
                    .delete_contact_by_email(Uuid::new_v4(), email, &token())
                    .await
                    .unwrap_err();
                assert!(matches!(err, Error::Validation { field: "email", .. }), "{email:?}");
            }
        }
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn unknown_region_is_not_sent() {
        let transport = CannedTransport::new(200, "{}");
        for throw_errors in [true, false] {
            let err = client(&transport, throw_errors)
                .add_domain("acme.dev", Some(DeliveryRegion::Unknown), &token())
                .await
                .unwrap_err();
            assert!(matches!(err, Error::Encode(_)));
        }
        assert_eq!(transport.calls(), 0);
    }

    #[test]
    fn build_requires_token() {
        assert!(matches!(Client::builder().build(), Err(Error::MissingToken)));
        assert!(matches!(
            Client::builder().api_token("   ").build(),
            Err(Error::MissingToken)
        ));
    }

    #[test]
    fn build_rejects_bad_url() {
        let err = Client::builder()
            .api_token("re_123")
            .api_url("not a url")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Url(_)));
    }

    #[test]
    fn build_defaults_to_throwing() {
        let client = Client::new("re_123").unwrap();
        assert!(client.throws_errors());

        let client = Client::builder()
            .api_token("re_123")
            .throw_errors(false)
            .build()
            .unwrap();
        assert!(!client.throws_errors());
    }

    #[test]
    fn from_env_reads_token() {
        temp_env::with_var(API_TOKEN_ENV, Some("re_env"), || {
            let builder = ClientBuilder::from_env();
            assert_eq!(builder.api_token.as_deref(), Some("re_env"));
            assert!(builder.build().is_ok());
        });

        temp_env::with_var_unset(API_TOKEN_ENV, || {
            let err = ClientBuilder::from_env().build().unwrap_err();
            assert!(matches!(err, Error::MissingToken));
        });
    }

    #[test]
    fn builder_debug_hides_token() {
        let builder = Client::builder().api_token("re_secret");
        assert!(!format!("{builder:?}").contains("re_secret"));
    }
}
