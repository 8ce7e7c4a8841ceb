use crate::errors::ApiError;
use crate::events::AppEvents;
use crate::routes::Route;
use crate::session::SessionStore;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Every backend call goes through here so the bearer token is attached and a
/// 401 tears the session down no matter which request saw it.
#[derive(Debug, Clone)]
pub struct Gateway {
    client: Client,
    base_url: String,
    session: SessionStore,
    events: AppEvents,
}

impl Gateway {
    pub fn new(base_url: impl Into<String>, session: SessionStore, events: AppEvents) -> Self {
        Self::with_client(Client::new(), base_url, session, events)
    }

    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        session: SessionStore,
        events: AppEvents,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
            events,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.url(path))
    }

    /// Sends `builder` with the session token attached and maps non-success
    /// statuses to errors.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let builder = match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status();
        debug!(%status, url = %response.url(), "backend responded");

        if status == StatusCode::UNAUTHORIZED {
            self.expire_session();
            return Err(ApiError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }

        Ok(response)
    }

    pub async fn get_value(&self, path: &str) -> Result<Value, ApiError> {
        let response = self.send(self.request(Method::GET, path)).await?;
        read_value(response).await
    }

    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<Value, ApiError> {
        let response = self.send(self.request(Method::POST, path).json(body)).await?;
        read_value(response).await
    }

    fn expire_session(&self) {
        warn!("backend rejected the session token, logging out");
        self.session.clear();
        self.events.navigate(Route::Login);
    }
}

/// Reads a JSON body. An empty body decodes as `null`.
async fn read_value(response: Response) -> Result<Value, ApiError> {
    let text = response.text().await?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&text)?)
}
