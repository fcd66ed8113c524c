use reqwest::{header::CONTENT_TYPE, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;
use crate::db::StorageError;
use crate::language::Language;
use crate::models::{
    Admin, ContactMessage, CreatePromotion, LoginCredentials, MenuItem, MenuItemPayload,
    Promotion, UpdatePromotion,
};
use crate::session::Session;
use crate::validation::ValidationError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{0}")]
    Backend(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Please log in to continue")]
    NotAuthenticated,

    #[error("Unexpected response from server: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Authenticated,
    Public,
}

#[derive(Deserialize)]
struct LoginData {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    admin: Option<Admin>,
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<Session>,
}

impl ApiClient {
    pub fn new(config: &Config, session: Arc<Session>) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_base_url.clone(),
            session,
        })
    }

    /// Inline `data:` images and absolute URLs pass through; relative paths
    /// are served by the backend.
    pub fn image_url(&self, image: &str) -> String {
        let image = image.trim();
        if image.is_empty()
            || image.starts_with("data:")
            || image.starts_with("http://")
            || image.starts_with("https://")
        {
            return image.to_string();
        }

        format!("{}/{}", self.base_url, image.trim_start_matches('/'))
    }

    fn require_session(&self) -> ApiResult<()> {
        if self.session.is_authenticated() {
            Ok(())
        } else {
            Err(ApiError::NotAuthenticated)
        }
    }

    async fn send(
        &self,
        mode: Mode,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
    ) -> ApiResult<Value> {
        let mut request = self
            .http
            .request(method.clone(), format!("{}{}", self.base_url, endpoint))
            .header(CONTENT_TYPE, "application/json");

        if mode == Mode::Authenticated {
            if let Some(token) = self.session.token() {
                request = request.bearer_auth(token);
            }
        }

        if let Some(body) = body {
            request = request.json(&body);
        }

        debug!("{method} {endpoint}");
        let response = request.send().await?;
        let status = response.status();
        debug!("{method} {endpoint} -> {status}");

        if status == StatusCode::UNAUTHORIZED && mode == Mode::Authenticated {
            self.session.handle_unauthorized();
            return Err(ApiError::Unauthorized);
        }

        let text = response.text().await?;
        let envelope = match serde_json::from_str::<Value>(&text) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(ApiError::Backend(format!(
                    "Request failed with status {status}"
                )));
            }
            Err(e) => return Err(ApiError::Decode(e)),
        };

        check_envelope(status, envelope)
    }

    async fn authenticated(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
    ) -> ApiResult<Value> {
        self.send(Mode::Authenticated, method, endpoint, body).await
    }

    async fn public(&self, method: Method, endpoint: &str, body: Option<Value>) -> ApiResult<Value> {
        self.send(Mode::Public, method, endpoint, body).await
    }

    // Auth

    pub async fn login(&self, credentials: &LoginCredentials) -> ApiResult<Admin> {
        let envelope = self
            .public(
                Method::POST,
                "/api/auth/login",
                Some(serde_json::to_value(credentials)?),
            )
            .await?;

        let data: LoginData = serde_json::from_value(envelope)?;
        let token = data
            .token
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| ApiError::Backend("Login failed".to_string()))?;

        Ok(self.session.establish(&token, data.admin)?)
    }

    pub fn logout(&self) -> ApiResult<()> {
        Ok(self.session.logout()?)
    }

    // Menu

    pub async fn menu(&self, language: Language) -> ApiResult<Vec<MenuItem>> {
        let endpoint = format!("/api/menu?lang={language}");
        let envelope = self.authenticated(Method::GET, &endpoint, None).await?;
        field(envelope, "menu")
    }

    pub async fn public_menu(&self, language: Language) -> ApiResult<Vec<MenuItem>> {
        let endpoint = format!("/api/menu?lang={language}");
        let envelope = self.public(Method::GET, &endpoint, None).await?;
        field(envelope, "menu")
    }

    pub async fn menu_item(&self, id: i64, language: Language) -> ApiResult<MenuItem> {
        let endpoint = format!("/api/menu/{id}?lang={language}");
        let envelope = self.authenticated(Method::GET, &endpoint, None).await?;
        field(envelope, "menuItem")
    }

    pub async fn create_menu_item(&self, item: &MenuItemPayload) -> ApiResult<()> {
        self.require_session()?;
        self.authenticated(Method::POST, "/api/menu", Some(serde_json::to_value(item)?))
            .await?;
        Ok(())
    }

    pub async fn update_menu_item(&self, id: i64, item: &MenuItemPayload) -> ApiResult<()> {
        self.require_session()?;
        let endpoint = format!("/api/menu/{id}");
        self.authenticated(Method::PUT, &endpoint, Some(serde_json::to_value(item)?))
            .await?;
        Ok(())
    }

    pub async fn delete_menu_item(&self, id: i64) -> ApiResult<()> {
        self.require_session()?;
        let endpoint = format!("/api/menu/{id}");
        self.authenticated(Method::DELETE, &endpoint, None).await?;
        Ok(())
    }

    // Promotions

    pub async fn promotions(&self, language: Language) -> ApiResult<Vec<Promotion>> {
        let endpoint = format!("/api/promotions?lang={language}");
        let envelope = self.authenticated(Method::GET, &endpoint, None).await?;
        field(envelope, "promotions")
    }

    pub async fn public_promotions(&self, language: Language) -> ApiResult<Vec<Promotion>> {
        let endpoint = format!("/api/promotions?lang={language}");
        let envelope = self.public(Method::GET, &endpoint, None).await?;
        field(envelope, "promotions")
    }

    pub async fn create_promotion(&self, promotion: &CreatePromotion) -> ApiResult<()> {
        self.require_session()?;
        self.authenticated(
            Method::POST,
            "/api/promotions",
            Some(serde_json::to_value(promotion)?),
        )
        .await?;
        Ok(())
    }

    pub async fn update_promotion(
        &self,
        menu_id: i64,
        promotion: &UpdatePromotion,
    ) -> ApiResult<()> {
        self.require_session()?;
        let endpoint = format!("/api/promotions/{menu_id}");
        self.authenticated(Method::PUT, &endpoint, Some(serde_json::to_value(promotion)?))
            .await?;
        Ok(())
    }

    pub async fn delete_promotion(&self, menu_id: i64) -> ApiResult<()> {
        self.require_session()?;
        let endpoint = format!("/api/promotions/{menu_id}");
        self.authenticated(Method::DELETE, &endpoint, None).await?;
        Ok(())
    }

    // Contact messages

    pub async fn contact_messages(&self) -> ApiResult<Vec<ContactMessage>> {
        self.require_session()?;
        let envelope = self
            .authenticated(Method::GET, "/api/contact-messages", None)
            .await?;
        field(envelope, "messages")
    }

    pub async fn delete_contact_message(&self, id: i64) -> ApiResult<()> {
        self.require_session()?;
        let endpoint = format!("/api/contact-messages/{id}");
        self.authenticated(Method::DELETE, &endpoint, None).await?;
        Ok(())
    }
}

fn check_envelope(status: StatusCode, envelope: Value) -> ApiResult<Value> {
    let success = envelope.get("success").and_then(Value::as_bool);

    if success == Some(false) || !status.is_success() {
        let message = envelope
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Request failed with status {status}"));
        warn!("Backend rejected request: {message}");
        return Err(ApiError::Backend(message));
    }

    Ok(envelope)
}

fn field<T: DeserializeOwned>(mut envelope: Value, key: &str) -> ApiResult<T> {
    let data = envelope
        .get_mut(key)
        .map(Value::take)
        .unwrap_or(Value::Null);
    Ok(serde_json::from_value(data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use serde_json::json;

    fn client(base: &str) -> ApiClient {
        let session = Arc::new(Session::new(Arc::new(MemoryStore::new())));
        ApiClient::new(&Config::new(base), session).unwrap()
    }

    #[test]
    fn test_check_envelope_success() {
        let envelope = json!({ "success": true, "menu": [] });
        assert!(check_envelope(StatusCode::OK, envelope).is_ok());
    }

    #[test]
    fn test_check_envelope_surfaces_backend_message() {
        let envelope = json!({ "success": false, "message": "Menu item not found" });
        let err = check_envelope(StatusCode::OK, envelope).unwrap_err();
        assert_eq!(err.to_string(), "Menu item not found");

        let envelope = json!({ "success": false });
        let err = check_envelope(StatusCode::BAD_REQUEST, envelope).unwrap_err();
        assert_eq!(err.to_string(), "Request failed with status 400 Bad Request");
    }

    #[test]
    fn test_field_rejects_missing_data() {
        let envelope = json!({ "success": true });
        let result: ApiResult<Vec<MenuItem>> = field(envelope, "menu");
        assert!(matches!(result, Err(ApiError::Decode(_))));
    }

    #[test]
    fn test_image_url_resolution() {
        let api = client("http://localhost:5000/");

        assert_eq!(
            api.image_url("/uploads/doro.jpg"),
            "http://localhost:5000/uploads/doro.jpg"
        );
        assert_eq!(
            api.image_url("https://cdn.example.com/a.png"),
            "https://cdn.example.com/a.png"
        );
        assert_eq!(
            api.image_url("data:image/png;base64,AAAA"),
            "data:image/png;base64,AAAA"
        );
        assert_eq!(api.image_url(""), "");
    }

    #[test]
    fn test_error_classification() {
        assert!(ApiError::Unauthorized.is_unauthorized());
        assert!(!ApiError::Backend("x".to_string()).is_unauthorized());
        assert_eq!(
            ApiError::from(ValidationError::InvalidPrice).to_string(),
            "Please enter a valid price"
        );
    }
}
