#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use account_service::config::LoginCredentials;
use account_service::domain::session::errors::CacheError;
use account_service::domain::session::ports::SessionCache;
use account_service::domain::session::service::SessionService;
use account_service::domain::user::models::BankInstitution;
use account_service::domain::user::models::EmailAddress;
use account_service::domain::user::models::NewUser;
use account_service::domain::user::models::StoredCredentials;
use account_service::domain::user::models::User;
use account_service::domain::user::models::UserChanges;
use account_service::domain::user::ports::UserRepository;
use account_service::domain::user::service::UserService;
use account_service::inbound::http::router::create_router;
use account_service::outbound::cache::InMemorySessionCache;
use account_service::user::errors::UserError;
use async_trait::async_trait;
use auth::PasswordHasher;
use auth::TokenIssuer;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::json;
use serde_json::Value;

const ACCESS_SECRET: &[u8] = b"test-access-secret-for-jwt-signing-32-bytes";
const REFRESH_SECRET: &[u8] = b"test-refresh-secret-for-jwt-signing-32-bytes";

pub const PASSWORD: &str = "secret123";

/// Test application that spawns a real server
///
/// Postgres and Redis are replaced by in-memory port implementations so the
/// suite runs without external services.
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub api_client: reqwest::Client,
    pub users: Arc<InMemoryUserRepository>,
    pub token_issuer: Arc<TokenIssuer>,
}

impl TestApp {
    /// Spawn the application with body credentials and an in-memory session cache
    pub async fn spawn() -> Self {
        Self::spawn_with(Arc::new(InMemorySessionCache::new()), LoginCredentials::Body).await
    }

    /// Spawn the application reading login credentials from the Basic header
    pub async fn spawn_with_basic_login() -> Self {
        Self::spawn_with(Arc::new(InMemorySessionCache::new()), LoginCredentials::Basic).await
    }

    /// Spawn the application against a session cache that is down
    pub async fn spawn_with_unavailable_cache() -> Self {
        Self::spawn_with(Arc::new(UnavailableSessionCache), LoginCredentials::Body).await
    }

    async fn spawn_with<C: SessionCache>(cache: Arc<C>, login_credentials: LoginCredentials) -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let users = Arc::new(InMemoryUserRepository::default());
        let token_issuer =
            Arc::new(TokenIssuer::new(ACCESS_SECRET, REFRESH_SECRET).expect("Invalid test secrets"));
        let password_hasher =
            PasswordHasher::with_cost(1024, 1, 1).expect("Invalid test hashing cost");

        let user_service = Arc::new(UserService::new(Arc::clone(&users), password_hasher));
        let session_service = Arc::new(SessionService::new(Arc::clone(&token_issuer), cache));

        let router = create_router(user_service, session_service, login_credentials);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            api_client: reqwest::Client::new(),
            users,
            token_issuer,
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make POST request with Bearer token
    pub fn post_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.post(path).bearer_auth(token)
    }

    /// Helper to make PATCH request with Bearer token
    pub fn patch_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client
            .patch(format!("{}{}", self.address, path))
            .bearer_auth(token)
    }

    /// Register a user with the default test password
    pub async fn register(&self, email: &str) -> reqwest::Response {
        self.post("/register")
            .json(&json!({
                "email": email,
                "name": "Alice",
                "password": PASSWORD
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Login with credentials in the JSON body
    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.post("/login")
            .json(&json!({
                "email": email,
                "password": password
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Login with a Basic Authorization header
    pub async fn login_basic(&self, email: &str, password: &str) -> reqwest::Response {
        let encoded = STANDARD.encode(format!("{}:{}", email, password));
        self.post("/login")
            .header(reqwest::header::AUTHORIZATION, format!("Basic {}", encoded))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Register and login, returning the `tokens` object of the login response
    pub async fn register_and_login(&self, email: &str) -> Tokens {
        self.register(email).await;
        let response = self.login(email, PASSWORD).await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: Value = response.json().await.expect("Failed to parse response");
        Tokens::from_json(&body["data"]["tokens"])
    }
}

#[derive(Debug, Clone)]
pub struct Tokens {
    pub access_token: String,
    pub refresh_token: String,
}

impl Tokens {
    pub fn from_json(value: &Value) -> Self {
        Self {
            access_token: value["access_token"].as_str().unwrap().to_string(),
            refresh_token: value["refresh_token"].as_str().unwrap().to_string(),
        }
    }
}

/// User store kept in memory, with the password hash stored alongside the user
/// the same way the database row holds it.
#[derive(Default)]
pub struct InMemoryUserRepository {
    rows: Mutex<HashMap<String, (User, String)>>,
}

impl InMemoryUserRepository {
    pub fn password_hash(&self, email: &str) -> Option<String> {
        self.rows
            .lock()
            .unwrap()
            .get(email)
            .map(|(_, hash)| hash.clone())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, new_user: NewUser) -> Result<User, UserError> {
        let mut rows = self.rows.lock().unwrap();
        let key = new_user.user.email.as_str().to_string();

        if rows.contains_key(&key) {
            return Err(UserError::DuplicateUser(key));
        }

        rows.insert(key, (new_user.user.clone(), new_user.password_hash));
        Ok(new_user.user)
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.get(email.as_str()).map(|(user, _)| user.clone()))
    }

    async fn find_credentials(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<StoredCredentials>, UserError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.get(email.as_str()).map(|(user, hash)| StoredCredentials {
            email: user.email.clone(),
            password_hash: hash.clone(),
        }))
    }

    async fn update_by_email(
        &self,
        email: &EmailAddress,
        changes: UserChanges,
    ) -> Result<User, UserError> {
        let mut rows = self.rows.lock().unwrap();
        let (user, _) = rows
            .get_mut(email.as_str())
            .ok_or_else(|| UserError::NotFound(email.to_string()))?;

        if let Some(name) = changes.name {
            user.name = name;
        }

        Ok(user.clone())
    }

    async fn complete_setup_by_email(
        &self,
        email: &EmailAddress,
        banks: Vec<BankInstitution>,
    ) -> Result<User, UserError> {
        let mut rows = self.rows.lock().unwrap();
        let (user, _) = rows
            .get_mut(email.as_str())
            .ok_or_else(|| UserError::NotFound(email.to_string()))?;

        if user.setup_complete {
            return Err(UserError::SetupAlreadyComplete(email.to_string()));
        }

        user.setup_complete = true;
        user.banks = banks;
        Ok(user.clone())
    }
}

/// Session cache whose every operation fails, as when Redis is unreachable.
pub struct UnavailableSessionCache;

#[async_trait]
impl SessionCache for UnavailableSessionCache {
    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }

    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }

    async fn delete(&self, _key: &str) -> Result<bool, CacheError> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }
}
