use reqwest::{Client, RequestBuilder, StatusCode};
use users_shared::{
    api::{DeleteUserResponse, ErrorResponse, HealthResponse, UserInput},
    User,
};

use super::auth::{AuthClient, AuthError};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Server error: {0}")]
    Server(String),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Client for the users API. Requests carry the session's id token when
/// signed in.
pub struct ApiClient {
    client: Client,
    base_url: String,
    auth: AuthClient,
}

impl ApiClient {
    pub fn new(base_url: &str, auth: AuthClient) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        }
    }

    pub fn auth(&self) -> &AuthClient {
        &self.auth
    }

    pub fn auth_mut(&mut self) -> &mut AuthClient {
        &mut self.auth
    }

    /// Build URL for endpoint
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn user_url(&self, id: &str) -> String {
        self.url(&format!("/users/{}", urlencoding::encode(id)))
    }

    /// Attach the bearer token (refreshing it if needed) and send.
    async fn send(&mut self, request: RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let request = match self.auth.id_token().await? {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        request.send().await.map_err(ApiError::Network)
    }

    /// Handle API response
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();

        if status.is_success() {
            return response.json().await.map_err(ApiError::Network);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&text)
            .map(|body| body.error)
            .unwrap_or(text);

        match status {
            StatusCode::NOT_FOUND => Err(ApiError::NotFound(message)),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                Err(ApiError::Validation(message))
            }
            _ => Err(ApiError::Server(format!("{}: {}", status, message))),
        }
    }

    // ============ Health ============

    pub async fn health(&mut self) -> Result<HealthResponse, ApiError> {
        let request = self.client.get(self.url("/health"));
        let response = self.send(request).await?;
        self.handle_response(response).await
    }

    // ============ Users ============

    pub async fn create_user(&mut self, input: &UserInput) -> Result<User, ApiError> {
        let request = self.client.post(self.url("/users")).json(input);
        let response = self.send(request).await?;
        self.handle_response(response).await
    }

    pub async fn list_users(&mut self) -> Result<Vec<User>, ApiError> {
        let request = self.client.get(self.url("/users"));
        let response = self.send(request).await?;
        self.handle_response(response).await
    }

    pub async fn get_user(&mut self, id: &str) -> Result<User, ApiError> {
        let request = self.client.get(self.user_url(id));
        let response = self.send(request).await?;
        self.handle_response(response).await
    }

    pub async fn update_user(&mut self, id: &str, input: &UserInput) -> Result<User, ApiError> {
        let request = self.client.put(self.user_url(id)).json(input);
        let response = self.send(request).await?;
        self.handle_response(response).await
    }

    pub async fn delete_user(&mut self, id: &str) -> Result<String, ApiError> {
        let request = self.client.delete(self.user_url(id));
        let response = self.send(request).await?;
        let body: DeleteUserResponse = self.handle_response(response).await?;
        Ok(body.message)
    }
}
