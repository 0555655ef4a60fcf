//! Typed HTTP client for the gateway/registry API.
//!
//! [`Client::execute`] is the single place requests are built: URL joining,
//! query encoding, bearer-token injection and JSON body marshaling. It hands
//! back the raw status and body; each operation decides what those mean,
//! because "not found" is a valid outcome for reads and deletes.
//!
//! Each entity kind lives in its own submodule and implements [`Entity`];
//! the generic CRUD operations and the typed [`Collection`] groups are built
//! on top of that descriptor.

pub mod gateways;
pub mod health;
pub mod prompts;
pub mod resources;
pub mod roots;
pub mod servers;
pub mod tools;

use std::marker::PhantomData;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::ResolvedConfig;
use crate::error::ProviderError;

pub use gateways::{Gateway, GatewayCreate, GatewayUpdate, HealthCheck};
pub use health::{HEALTH_PATH, Health};
pub use prompts::{Prompt, PromptArgument, PromptCreate, PromptFields, PromptUpdate};
pub use resources::{McpResource, ResourceCreate, ResourceFields, ResourceUpdate};
pub use roots::Root;
pub use servers::{Server, ServerCreate, ServerFields, ServerUpdate};
pub use tools::{Tool, ToolCreate, ToolFields, ToolUpdate};

/// Characters escaped when an identity is embedded as one path segment.
///
/// Everything outside RFC 3986 "unreserved" is escaped, so URIs used as
/// identities (`file:///workspace`) stay inside a single segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'!')
    .add(b'"')
    .add(b'#')
    .add(b'$')
    .add(b'%')
    .add(b'&')
    .add(b'\'')
    .add(b'(')
    .add(b')')
    .add(b'*')
    .add(b'+')
    .add(b',')
    .add(b'/')
    .add(b':')
    .add(b';')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'@')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Statuses accepted by create operations.
const CREATE_OK: &[u16] = &[200, 201];
/// Statuses accepted by delete operations; 404 means already gone.
const DELETE_OK: &[u16] = &[200, 204, 404];

/// Percent-escape an identity for use as a single path segment.
pub fn escape_segment(id: &str) -> String {
    utf8_percent_encode(id, PATH_SEGMENT).to_string()
}

/// How a single entity is read back by identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadPath {
    /// `GET {collection}/{id}`
    Item,
    /// `GET {collection}/{id}/info`
    Info,
    /// No item endpoint: list the collection and match on identity.
    Scan,
}

/// Uninhabited update body for kinds that can only be replaced.
#[derive(Debug, Clone, Copy)]
pub enum NoUpdate {}

impl Serialize for NoUpdate {
    fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
        match *self {}
    }
}

/// Per-kind wire descriptor: paths, body types and identity.
pub trait Entity: DeserializeOwned + Send + Sync {
    /// Human-readable kind, used in errors and logs.
    const KIND: &'static str;
    /// Collection path, e.g. `/tools`.
    const COLLECTION: &'static str;
    /// How `get` reads a single entity.
    const READ_PATH: ReadPath = ReadPath::Item;
    /// Whether the list endpoint takes `include_inactive`.
    const INACTIVE_FILTER: bool = true;

    /// Body sent by `POST {collection}`.
    type Create: Serialize + Send + Sync;
    /// Body sent by `PUT {collection}/{id}`.
    type Update: Serialize + Send + Sync;

    /// Identity assigned by the service (or, for roots, the URI).
    fn identity(&self) -> &str;

    /// Path of one entity.
    ///
    /// `.` and `..` are rejected: URL parsing resolves dot-segments, escaped
    /// or not, so they would address the collection or its parent.
    fn item_path(id: &str) -> crate::Result<String> {
        if id == "." || id == ".." {
            return Err(ProviderError::InvalidField(
                "id".to_string(),
                format!("'{}' cannot be used as a {} identity", id, Self::KIND),
            ));
        }
        Ok(format!("{}/{}", Self::COLLECTION, escape_segment(id)))
    }
}

/// Raw outcome of one HTTP round trip.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Body as text, lossily decoded, for diagnostics.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Whether a request carries the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Auth {
    Bearer,
    Anonymous,
}

/// HTTP client for the gateway API.
///
/// Holds only immutable configuration and a connection pool, so clones are
/// cheap and may be shared freely across concurrent reconcilers.
#[derive(Clone)]
pub struct Client {
    base_url: String,
    bearer_token: Option<String>,
    http: reqwest::Client,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.bearer_token.is_some())
            .finish()
    }
}

impl Client {
    /// Build a client from a resolved configuration.
    pub fn new(config: &ResolvedConfig) -> Self {
        Self::with_http_client(config, reqwest::Client::new())
    }

    /// Build a client around a caller-supplied `reqwest::Client`.
    pub fn with_http_client(config: &ResolvedConfig, http: reqwest::Client) -> Self {
        Self {
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            bearer_token: config.bearer_token.clone(),
            http,
        }
    }

    /// Base URL requests are joined onto, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue one authenticated request and return the raw outcome.
    ///
    /// Success/failure is not decided here; any status, including 4xx/5xx,
    /// comes back as `Ok`. Errors are transport-level only.
    pub async fn execute<B>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> crate::Result<RawResponse>
    where
        B: Serialize + ?Sized,
    {
        self.send(method, path, query, body, Auth::Bearer).await
    }

    pub(crate) async fn send<B>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
        auth: Auth,
    ) -> crate::Result<RawResponse>
    where
        B: Serialize + ?Sized,
    {
        let mut url = url::Url::parse(&format!("{}{}", self.base_url, path)).map_err(|source| {
            ProviderError::InvalidUrl {
                method: method.clone(),
                path: path.to_string(),
                source,
            }
        })?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }

        let mut request = self.http.request(method.clone(), url);

        if auth == Auth::Bearer {
            if let Some(token) = &self.bearer_token {
                request = request.bearer_auth(token);
            }
        }

        if let Some(body) = body {
            let encoded = serde_json::to_vec(body).map_err(|source| ProviderError::Encode {
                method: method.clone(),
                path: path.to_string(),
                source,
            })?;
            request = request
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(encoded);
        }

        tracing::debug!(method = %method, path = %path, "sending gateway API request");

        let response = request.send().await.map_err(|source| ProviderError::Request {
            method: method.clone(),
            path: path.to_string(),
            source,
        })?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|source| ProviderError::ReadBody {
                method: method.clone(),
                path: path.to_string(),
                status,
                source,
            })?
            .to_vec();

        tracing::debug!(method = %method, path = %path, status, "gateway API responded");

        Ok(RawResponse { status, body })
    }

    /// `GET {collection}`, optionally passing `include_inactive` through.
    pub async fn list<E: Entity>(&self, include_inactive: bool) -> crate::Result<Vec<E>> {
        let query = if E::INACTIVE_FILTER {
            vec![("include_inactive", include_inactive.to_string())]
        } else {
            Vec::new()
        };
        let response = self
            .execute(Method::GET, E::COLLECTION, &query, None::<&()>)
            .await?;
        let response = accept(response, Method::GET, E::COLLECTION, &[200])?;
        decode(&response, &format!("{} list", E::KIND))
    }

    /// `POST {collection}`; the created entity carries its new identity.
    pub async fn create<E: Entity>(&self, body: &E::Create) -> crate::Result<E> {
        let response = self
            .execute(Method::POST, E::COLLECTION, &[], Some(body))
            .await?;
        let response = accept(response, Method::POST, E::COLLECTION, CREATE_OK)?;
        decode(&response, E::KIND)
    }

    /// Read one entity by identity. `Ok(None)` means the service does not
    /// know it; that is not an error.
    pub async fn get<E: Entity>(&self, id: &str) -> crate::Result<Option<E>> {
        let path = match E::READ_PATH {
            ReadPath::Item => E::item_path(id)?,
            ReadPath::Info => format!("{}/info", E::item_path(id)?),
            ReadPath::Scan => {
                let all = self.list::<E>(true).await?;
                return Ok(all.into_iter().find(|e| e.identity() == id));
            }
        };
        let response = self.execute(Method::GET, &path, &[], None::<&()>).await?;
        if response.status == 404 {
            return Ok(None);
        }
        let response = accept(response, Method::GET, &path, &[200])?;
        decode(&response, E::KIND).map(Some)
    }

    /// `PUT {collection}/{id}` with the mutable fields.
    pub async fn update<E: Entity>(&self, id: &str, body: &E::Update) -> crate::Result<E> {
        let path = E::item_path(id)?;
        let response = self.execute(Method::PUT, &path, &[], Some(body)).await?;
        let response = accept(response, Method::PUT, &path, &[200])?;
        decode(&response, E::KIND)
    }

    /// `DELETE {collection}/{id}`. Deleting something already gone succeeds.
    pub async fn delete<E: Entity>(&self, id: &str) -> crate::Result<()> {
        let path = E::item_path(id)?;
        let response = self.execute(Method::DELETE, &path, &[], None::<&()>).await?;
        accept(response, Method::DELETE, &path, DELETE_OK)?;
        Ok(())
    }

    /// Typed method group for one entity kind.
    pub fn collection<E: Entity>(&self) -> Collection<'_, E> {
        Collection {
            client: self,
            _entity: PhantomData,
        }
    }

    pub fn gateways(&self) -> Collection<'_, Gateway> {
        self.collection()
    }

    pub fn servers(&self) -> Collection<'_, Server> {
        self.collection()
    }

    pub fn tools(&self) -> Collection<'_, Tool> {
        self.collection()
    }

    pub fn resources(&self) -> Collection<'_, McpResource> {
        self.collection()
    }

    pub fn prompts(&self) -> Collection<'_, Prompt> {
        self.collection()
    }

    pub fn roots(&self) -> Collection<'_, Root> {
        self.collection()
    }
}

/// CRUD method group bound to one entity kind.
///
/// For kinds whose update body is [`NoUpdate`] (roots), `update` exists but
/// cannot be called, since no body value can be constructed.
pub struct Collection<'a, E> {
    client: &'a Client,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Collection<'_, E> {
    pub async fn list(&self, include_inactive: bool) -> crate::Result<Vec<E>> {
        self.client.list::<E>(include_inactive).await
    }

    pub async fn create(&self, body: &E::Create) -> crate::Result<E> {
        self.client.create::<E>(body).await
    }

    pub async fn get(&self, id: &str) -> crate::Result<Option<E>> {
        self.client.get::<E>(id).await
    }

    pub async fn update(&self, id: &str, body: &E::Update) -> crate::Result<E> {
        self.client.update::<E>(id, body).await
    }

    pub async fn delete(&self, id: &str) -> crate::Result<()> {
        self.client.delete::<E>(id).await
    }
}

/// Pass the response through if its status is in `accepted`.
pub(crate) fn accept(
    response: RawResponse,
    method: Method,
    path: &str,
    accepted: &[u16],
) -> crate::Result<RawResponse> {
    if accepted.contains(&response.status) {
        Ok(response)
    } else {
        Err(ProviderError::UnexpectedStatus {
            method,
            path: path.to_string(),
            status: response.status,
            body: response.body_text(),
        })
    }
}

pub(crate) fn decode<T: DeserializeOwned>(response: &RawResponse, what: &str) -> crate::Result<T> {
    serde_json::from_slice(&response.body).map_err(|source| ProviderError::Decode {
        what: what.to_string(),
        source,
    })
}
