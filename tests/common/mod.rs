#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::Arc;

use chirpy::auth::MIN_PASSWORD_COST;
use chirpy::configuration::{
    ApplicationSettings, AuthSettings, DatabaseSettings, PolkaSettings, Settings, StorageBackend,
    DEFAULT_ACCESS_TOKEN_EXPIRY, DEFAULT_REFRESH_TOKEN_EXPIRY,
};
use chirpy::startup::run;
use chirpy::store::InMemoryStore;
use serde_json::{json, Value};

pub const POLKA_KEY: &str = "f271c81ff7084ee5b99a5091b42d486e";
pub const JWT_SECRET: &str = "integration-test-secret";

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
}

pub fn test_settings(platform: &str) -> Settings {
    Settings {
        application: ApplicationSettings {
            host: "127.0.0.1".into(),
            port: 0,
            platform: platform.into(),
        },
        database: DatabaseSettings {
            backend: StorageBackend::Memory,
            username: "postgres".into(),
            password: "password".into(),
            port: 5432,
            host: "localhost".into(),
            database_name: "chirpy".into(),
        },
        auth: AuthSettings {
            secret: JWT_SECRET.into(),
            access_token_expiry: DEFAULT_ACCESS_TOKEN_EXPIRY,
            refresh_token_expiry: DEFAULT_REFRESH_TOKEN_EXPIRY,
            password_cost: MIN_PASSWORD_COST,
            uniform_login_errors: false,
        },
        polka: PolkaSettings {
            api_key: POLKA_KEY.into(),
        },
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(test_settings("dev")).await
}

pub async fn spawn_app_with(settings: Settings) -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let store = Arc::new(InMemoryStore::default());
    let server = run(listener, store, settings).expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn create_user(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/users"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Signs up and logs in, returning the login body.
    pub async fn signed_in_user(&self, email: &str, password: &str) -> Value {
        let response = self.create_user(email, password).await;
        assert_eq!(201, response.status().as_u16());

        let response = self.login(email, password).await;
        assert_eq!(200, response.status().as_u16());
        response.json().await.expect("Failed to parse login response")
    }

    pub async fn post_chirp(&self, access_token: &str, body: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/chirps"))
            .bearer_auth(access_token)
            .json(&json!({ "body": body }))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_with_bearer(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request.")
    }
}

pub fn token_of(body: &Value, field: &str) -> String {
    body[field]
        .as_str()
        .unwrap_or_else(|| panic!("response has no `{}`", field))
        .to_string()
}
