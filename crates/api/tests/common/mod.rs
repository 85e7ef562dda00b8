//! Shared setup for router tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use ona_api::{AppState, Catalog, HttpMagicLinkProvider, Payments, SmtpEmailSender, create_router};
use ona_core::files::FileService;
use ona_core::payments::{CreateUserInput, User, UserRepository};
use ona_core::storage::{
    OpendalDriver, StorageConfig, StorageDisk, StorageDriver, StorageResolver, StorageStrategy,
};
use ona_db::migration::{Migrator, MigratorTrait};
use ona_db::{CatalogStore, LicenseStore, UserStore};
use ona_shared::{EmailConfig, EmailService, IdentityConfig, JwtConfig, JwtService, Role, StripeConfig};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde_json::Value;
use tower::ServiceExt;

pub const WEBHOOK_SECRET: &str = "whsec_test_secret";
pub const MULTIPART_BOUNDARY: &str = "ona-test-boundary";

/// Router over an in-memory database and in-memory disks.
pub struct TestApp {
    pub router: Router,
    pub db: DatabaseConnection,
    pub jwt: Arc<JwtService>,
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with_secret(WEBHOOK_SECRET).await
}

pub async fn spawn_app_with_secret(webhook_secret: &str) -> TestApp {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("Failed to open in-memory database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    let mut drivers: HashMap<StorageDisk, Arc<dyn StorageDriver>> = HashMap::new();
    drivers.insert(
        StorageDisk::Public,
        Arc::new(OpendalDriver::memory(StorageDisk::Public, "/uploads").unwrap()),
    );
    drivers.insert(
        StorageDisk::Fs,
        Arc::new(OpendalDriver::memory(StorageDisk::Fs, "/api/v1/admin/files").unwrap()),
    );
    let storage_config = StorageConfig::new(StorageStrategy::Fs);
    let resolver = Arc::new(StorageResolver::new(StorageStrategy::Fs, drivers).unwrap());
    let files = Arc::new(FileService::new(resolver, &storage_config));

    let users = Arc::new(UserStore::new(db.clone()));
    let licenses = Arc::new(LicenseStore::new(db.clone()));

    // Nothing listens on port 9, so welcome emails fail fast and the
    // checkout still succeeds.
    let magic_links = Arc::new(HttpMagicLinkProvider::new(&IdentityConfig {
        base_url: "http://127.0.0.1:9/api/auth".into(),
        api_key: None,
        frontend_url: "http://localhost:3000".into(),
    }));
    let mailer = Arc::new(SmtpEmailSender::new(Arc::new(EmailService::new(
        EmailConfig::default(),
    ))));

    let payments: Arc<Payments> = Arc::new(Payments::new(
        users,
        Arc::clone(&licenses),
        magic_links,
        mailer,
    ));
    let catalog: Arc<Catalog> = Arc::new(Catalog::new(
        Arc::new(CatalogStore::new(db.clone())),
        licenses,
    ));

    let jwt = Arc::new(JwtService::new(JwtConfig {
        secret: "test-secret-key-at-least-32-bytes-long".into(),
        access_token_expiry_secs: 3600,
    }));

    let state = AppState {
        jwt_service: Arc::clone(&jwt),
        files,
        payments,
        catalog,
        stripe: Arc::new(StripeConfig {
            webhook_secret: webhook_secret.to_string(),
            signature_tolerance_secs: 300,
        }),
        max_upload_bytes: storage_config.max_file_size,
    };

    TestApp {
        router: create_router(state),
        db,
        jwt,
    }
}

impl TestApp {
    /// Insert a user and mint a token for them.
    pub async fn user_with_token(&self, email: &str, role: Role) -> (User, String) {
        let user = UserStore::new(self.db.clone())
            .create(CreateUserInput {
                email: email.to_string(),
                name: "Test User".to_string(),
                role,
                email_verified: true,
            })
            .await
            .unwrap();
        let token = self
            .jwt
            .generate_access_token(user.id, &user.email, role)
            .unwrap();
        (user, token)
    }

    pub async fn admin_token(&self) -> String {
        self.user_with_token("admin@ona-ui.com", Role::Admin).await.1
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    pub async fn send_raw(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, bytes.to_vec())
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(request("GET", uri, token, Body::empty())).await
    }

    pub async fn post_json(&self, uri: &str, token: Option<&str>, body: &Value) -> (StatusCode, Value) {
        let mut req = request("POST", uri, token, Body::from(body.to_string()));
        req.headers_mut()
            .insert(header::CONTENT_TYPE, "application/json".parse().unwrap());
        self.send(req).await
    }

    pub async fn patch_json(&self, uri: &str, token: Option<&str>, body: &Value) -> (StatusCode, Value) {
        let mut req = request("PATCH", uri, token, Body::from(body.to_string()));
        req.headers_mut()
            .insert(header::CONTENT_TYPE, "application/json".parse().unwrap());
        self.send(req).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(request("DELETE", uri, token, Body::empty())).await
    }
}

pub fn request(method: &str, uri: &str, token: Option<&str>, body: Body) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(body).unwrap()
}

/// Multipart body with one file part and plain text fields.
pub fn multipart_body(
    filename: &str,
    content_type: &str,
    content: &[u8],
    fields: &[(&str, &str)],
) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}
