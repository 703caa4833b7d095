use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use delivery_auth::UserProfile;
use delivery_catalog::CatalogItem;
use delivery_confirmations::{Confirmation, ConfirmationWithDeliverer};
use delivery_core::CatalogItemId;

use crate::types::{
    ConfirmDeliveryInput, ErrorBody, HealthResponse, ItemUpdate, LoginBody, LoginResponse, NewItem, RegisterBody,
    RegisterResponse, Session,
};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("not signed in")]
    NotSignedIn,
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Client for the delivery backend's REST API.
#[derive(Debug, Clone)]
pub struct DeliveryClient {
    base_url: String,
    http: reqwest::Client,
    session: Option<Session>,
}

impl DeliveryClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http(base_url, reqwest::Client::new())
    }

    pub fn with_http(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
            session: None,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_admin(&self) -> bool {
        self.session.as_ref().is_some_and(Session::is_admin)
    }

    /// Forget the token and user. No request is made.
    pub fn logout(&mut self) {
        self.session = None;
    }

    /// `true` when the server reports itself healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let body: HealthResponse = self.send(self.request(Method::GET, "/health")).await?;
        Ok(body.status == "ok")
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<UserProfile, ClientError> {
        let req = self
            .request(Method::POST, "/api/auth/register")
            .json(&RegisterBody { name, email, password });
        let body: RegisterResponse = self.send(req).await?;
        Ok(body.user)
    }

    /// Sign in and keep the session for later calls.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<UserProfile, ClientError> {
        let req = self
            .request(Method::POST, "/api/auth/login")
            .json(&LoginBody { email, password });
        let body: LoginResponse = self.send(req).await?;

        tracing::debug!(user_id = %body.user.id, role = %body.user.role, "signed in");
        self.session = Some(Session {
            token: body.token,
            user: body.user.clone(),
        });
        Ok(body.user)
    }

    pub async fn menu(&self) -> Result<Vec<CatalogItem>, ClientError> {
        self.send(self.request(Method::GET, "/api/deliveries/menu")).await
    }

    /// Confirm a delivery as the signed-in user.
    pub async fn confirm_delivery(&self, input: &ConfirmDeliveryInput) -> Result<Confirmation, ClientError> {
        let session = self.session.as_ref().ok_or(ClientError::NotSignedIn)?;
        let req = self
            .request(Method::POST, "/api/deliveries/confirm")
            .bearer_auth(&session.token)
            .json(input);
        self.send(req).await
    }

    pub async fn admin_confirmations(&self) -> Result<Vec<ConfirmationWithDeliverer>, ClientError> {
        self.send(self.authed(Method::GET, "/api/admin/confirmations")).await
    }

    pub async fn admin_items(&self) -> Result<Vec<CatalogItem>, ClientError> {
        self.send(self.authed(Method::GET, "/api/admin/items")).await
    }

    pub async fn create_item(&self, item: &NewItem) -> Result<CatalogItem, ClientError> {
        self.send_json(Method::POST, "/api/admin/items", item).await
    }

    pub async fn update_item(&self, id: CatalogItemId, update: &ItemUpdate) -> Result<CatalogItem, ClientError> {
        self.send_json(Method::PUT, &format!("/api/admin/items/{id}"), update).await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{}", self.base_url, path))
    }

    /// Attach the session token when there is one; the server decides.
    fn authed(&self, method: Method, path: &str) -> RequestBuilder {
        let req = self.request(method, path);
        match &self.session {
            Some(session) => req.bearer_auth(&session.token),
            None => req,
        }
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.authed(method, path).json(body)).await
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ClientError> {
        let resp = req.send().await?;
        let resp = check_status(resp).await?;
        Ok(resp.json().await?)
    }
}

async fn check_status(resp: Response) -> Result<Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let text = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(|body| body.message)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}
