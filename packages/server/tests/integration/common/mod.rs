use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use reqwest::{Client, Method, RequestBuilder};
use sea_orm::DatabaseConnection;
use serde_json::Value;
use tempfile::TempDir;

use catalog_server::config::{
    AppConfig, AuthConfig, CatalogConfig, DatabaseConfig, LogConfig, ServerConfig,
};
use catalog_server::state::AppState;
use common::StorageConfig;
use common::storage::FilesystemUploadStore;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "correct-horse-battery";

pub mod routes {
    pub const HEALTH: &str = "/api/v1/health";
    pub const LOGIN: &str = "/api/v1/auth/login";
    pub const SESSION: &str = "/api/v1/admin/session";
    pub const CATEGORIES: &str = "/api/v1/catalog/categories";
    pub const PRODUCTS: &str = "/api/v1/catalog/products";
    pub const CLEANUP: &str = "/api/v1/uploads/cleanup";

    pub fn category(id: &str) -> String {
        format!("/api/v1/catalog/categories/{id}")
    }

    pub fn product(id: &str) -> String {
        format!("/api/v1/catalog/products/{id}")
    }

    pub fn upload(filename: &str) -> String {
        format!("/uploads/{filename}")
    }
}

/// A running test server backed by a fresh SQLite database and upload directory.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub db: DatabaseConnection,
    pub uploads_dir: PathBuf,
    /// Bearer token attached to every request once set.
    pub token: Option<String>,
    _dir: TempDir,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

/// A file part for multipart product writes.
pub struct FilePart {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl FilePart {
    pub fn new(name: &str, bytes: &[u8]) -> Self {
        Self {
            name: name.to_string(),
            bytes: bytes.to_vec(),
        }
    }
}

fn test_config(dir: &Path) -> AppConfig {
    let db_path = dir.join("catalog.db");
    AppConfig {
        server: ServerConfig {
            port: 0,
            ..Default::default()
        },
        database: DatabaseConfig::new(format!("sqlite://{}?mode=rwc", db_path.display())),
        auth: AuthConfig {
            enabled: false,
            ..AuthConfig::new("test-secret-for-integration-tests")
        },
        storage: StorageConfig {
            uploads_dir: dir.join("uploads"),
            ..Default::default()
        },
        catalog: CatalogConfig::default(),
        log: LogConfig::default(),
    }
}

impl TestApp {
    /// Spawn with authentication disabled.
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    /// Spawn with authentication enabled and the test admin seeded.
    pub async fn spawn_with_auth() -> Self {
        Self::spawn_with(|config| {
            config.auth.enabled = true;
            config.auth.admin_email = Some(ADMIN_EMAIL.to_string());
            config.auth.admin_password = Some(ADMIN_PASSWORD.to_string());
        })
        .await
    }

    /// Spawn after letting the caller adjust the configuration.
    pub async fn spawn_with(configure: impl FnOnce(&mut AppConfig)) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut config = test_config(dir.path());
        configure(&mut config);

        let db = catalog_server::database::init_db(&config.database)
            .await
            .expect("Failed to initialize test database");
        catalog_server::seed::ensure_indexes(&db)
            .await
            .expect("Failed to create indexes");
        catalog_server::seed::ensure_admin(&db, &config.auth)
            .await
            .expect("Failed to seed admin");

        let uploads = FilesystemUploadStore::new(
            config.storage.uploads_dir.clone(),
            config.storage.max_file_size,
        )
        .await
        .expect("Failed to create upload store");
        let uploads_dir = config.storage.uploads_dir.clone();

        let state = AppState {
            db: db.clone(),
            config: Arc::new(config),
            uploads: Arc::new(uploads),
        };

        let app = catalog_server::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            db,
            uploads_dir,
            token: None,
            _dir: dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match &self.token {
            Some(token) => builder.header("Authorization", format!("Bearer {token}")),
            None => builder,
        }
    }

    async fn send(builder: RequestBuilder) -> TestResponse {
        let res = builder.send().await.expect("Failed to send request");
        TestResponse::from_response(res).await
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        Self::send(self.request(Method::GET, path)).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> TestResponse {
        Self::send(self.request(Method::POST, path).json(body)).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> TestResponse {
        Self::send(self.request(Method::PUT, path).json(body)).await
    }

    pub async fn patch(&self, path: &str, body: &Value) -> TestResponse {
        Self::send(self.request(Method::PATCH, path).json(body)).await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        Self::send(self.request(Method::DELETE, path)).await
    }

    /// Send a multipart product write: `payload` as a JSON text field plus
    /// one `mediaFiles` part per file.
    pub async fn multipart(
        &self,
        method: Method,
        path: &str,
        payload: &Value,
        files: Vec<FilePart>,
    ) -> TestResponse {
        let mut form = reqwest::multipart::Form::new().text("payload", payload.to_string());
        for file in files {
            let part = reqwest::multipart::Part::bytes(file.bytes)
                .file_name(file.name)
                .mime_str("application/octet-stream")
                .expect("Failed to set MIME type");
            form = form.part("mediaFiles", part);
        }
        Self::send(self.request(method, path).multipart(form)).await
    }

    /// Log in as the seeded admin and attach the token to later requests.
    pub async fn login(&mut self) {
        let res = self
            .post(
                routes::LOGIN,
                &serde_json::json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }),
            )
            .await;
        assert_eq!(res.status, 200, "Login failed: {}", res.text);
        self.token = Some(
            res.body["token"]
                .as_str()
                .expect("Login response should contain a token")
                .to_string(),
        );
    }

    /// Names of the files currently in the upload directory.
    pub fn stored_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(&self.uploads_dir)
            .expect("Failed to read upload dir")
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| name != ".gitkeep")
            .collect();
        names.sort();
        names
    }

    /// Write a file straight into the upload directory.
    pub fn place_file(&self, name: &str, bytes: &[u8]) {
        std::fs::write(self.uploads_dir.join(name), bytes).expect("Failed to write upload");
    }

    /// Create a category via the API and return its `id`.
    pub async fn create_category(&self, slug: &str, name: &str) -> String {
        let res = self
            .post(
                routes::CATEGORIES,
                &serde_json::json!({ "slug": slug, "name": name }),
            )
            .await;
        assert_eq!(res.status, 201, "create_category failed: {}", res.text);
        res.id()
    }

    /// Create a product via the JSON API and return the response.
    pub async fn create_product(&self, payload: &Value) -> TestResponse {
        let res = self.post(routes::PRODUCTS, payload).await;
        assert_eq!(res.status, 201, "create_product failed: {}", res.text);
        res
    }
}

impl TestResponse {
    pub async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let text = res.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self { status, text, body }
    }

    pub fn id(&self) -> String {
        self.body["id"]
            .as_str()
            .expect("response body should contain 'id'")
            .to_string()
    }

    /// String entries of a JSON array found at `pointer`.
    pub fn strings(&self, pointer: &str) -> Vec<String> {
        self.body
            .pointer(pointer)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}
