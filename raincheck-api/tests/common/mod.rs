/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - Router construction around mock push/suggestion services
/// - Test user creation and JWT token generation
/// - Request helpers
///
/// The database pool is created lazily: tests that never touch the database
/// (auth rejection, schema validation, cron secret checks) run without a
/// running Postgres. Tests that do need one are marked `#[ignore]` and
/// expect `DATABASE_URL` to point at a disposable database.

use raincheck_api::app::{build_router, AppState};
use raincheck_api::config::{
    ApiConfig, Config, CronConfig, DatabaseConfig, JwtConfig, PushConfig, SuggestConfig,
};
use raincheck_shared::auth::jwt::{create_token, Claims, TokenType};
use raincheck_shared::auth::password;
use raincheck_shared::models::user::{CreateUser, User};
use raincheck_shared::assistant::StaticAssistantService;
use raincheck_shared::push::MockPushGateway;
use raincheck_shared::suggest::StaticSuggestionService;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "integration-test-secret-at-least-32-bytes";
pub const TEST_CRON_SECRET: &str = "integration-test-cron-secret";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub push: Arc<MockPushGateway>,
    pub user_id: Uuid,
    pub jwt_token: String,
}

impl TestContext {
    /// Creates a test context around a lazily-connected pool
    ///
    /// No connection is made until a handler actually queries the database.
    pub fn new() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgresql://localhost/raincheck_test".to_string());

        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
            },
            database: DatabaseConfig {
                url: database_url.clone(),
                max_connections: 5,
            },
            jwt: JwtConfig {
                secret: TEST_JWT_SECRET.to_string(),
            },
            cron: CronConfig {
                secret: TEST_CRON_SECRET.to_string(),
            },
            push: PushConfig {
                service_account_json: "{}".to_string(),
            },
            suggest: SuggestConfig {
                api_key: "test-key".to_string(),
            },
        };

        let db = PgPool::connect_lazy(&database_url)?;
        let push = Arc::new(MockPushGateway::new());
        let suggest = Arc::new(StaticSuggestionService::default());
        let assistant = Arc::new(StaticAssistantService::default());

        // A user id baked into the token; DB-backed tests replace it with a
        // real row via `create_test_user`.
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, TokenType::Access);
        let jwt_token = create_token(&claims, TEST_JWT_SECRET)?;

        let state = AppState::new(db.clone(), config, push.clone(), suggest, assistant);
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            push,
            user_id,
            jwt_token,
        })
    }

    /// Returns authorization header value for the test user
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.jwt_token)
    }

    /// Creates a real user row and re-mints the token for it
    ///
    /// Requires a running database; migrations are run first.
    pub async fn create_test_user(&mut self) -> anyhow::Result<User> {
        sqlx::migrate!("../migrations").run(&self.db).await?;

        let user = User::create(
            &self.db,
            CreateUser {
                email: format!("test-{}@example.com", Uuid::new_v4()),
                password_hash: password::hash_password("test_password_1")?,
                name: Some("Test User".to_string()),
                image_url: None,
            },
        )
        .await?;

        self.user_id = user.id;
        let claims = Claims::new(user.id, TokenType::Access);
        self.jwt_token = create_token(&claims, TEST_JWT_SECRET)?;

        Ok(user)
    }

    /// Cleans up test data created by `create_test_user`
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        // Tasks cascade from the user row
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(self.user_id)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}

/// Builds a JSON request with the given method, path, and optional auth
pub fn json_request(
    method: &str,
    uri: &str,
    auth: Option<&str>,
    body: serde_json::Value,
) -> axum::http::Request<axum::body::Body> {
    let mut builder = axum::http::Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");

    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }

    builder
        .body(axum::body::Body::from(body.to_string()))
        .unwrap()
}

/// Reads a response body as JSON
pub async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
