//! Test harness with testcontainers for integration testing.
//!
//! One pgvector container is shared by every test. Each harness gets its own
//! freshly migrated database inside it, so tests never see each other's rows.

use anyhow::{Context, Result};
use playbooks::{PoolConfig, PostgresStore};
use sqlx::PgPool;
use std::sync::atomic::{AtomicUsize, Ordering};
use test_context::AsyncTestContext;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared test infrastructure that persists across all tests.
struct SharedTestInfra {
    server_url: String,
    // Keep the container alive for the entire test run
    _postgres: ContainerAsync<Postgres>,
}

/// Global shared infrastructure - initialized once, reused by all tests.
static SHARED_INFRA: OnceCell<SharedTestInfra> = OnceCell::const_new();

static NEXT_DATABASE: AtomicUsize = AtomicUsize::new(0);

impl SharedTestInfra {
    async fn init() -> Result<Self> {
        // Run tests with: RUST_LOG=debug cargo test -- --ignored --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        // Stock postgres lacks the vector extension
        let postgres = Postgres::default()
            .with_name("pgvector/pgvector")
            .with_tag("pg16")
            .start()
            .await
            .context("Failed to start Postgres container")?;

        let host = postgres.get_host().await?;
        let port = postgres.get_host_port_ipv4(5432).await?;

        Ok(Self {
            server_url: format!("postgresql://postgres:postgres@{}:{}", host, port),
            _postgres: postgres,
        })
    }

    async fn get() -> &'static Self {
        SHARED_INFRA
            .get_or_init(|| async {
                Self::init()
                    .await
                    .expect("Failed to initialize shared test infrastructure")
            })
            .await
    }
}

/// Test harness that manages test infrastructure.
///
/// ```ignore
/// use test_context::test_context;
///
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// #[ignore] // Requires database
/// async fn my_test(ctx: &TestHarness) {
///     let store = &ctx.store;
/// }
/// ```
pub struct TestHarness {
    /// Store over this test's private database.
    pub store: PostgresStore,
    /// Pool for raw fixture SQL.
    pub db_pool: PgPool,
    /// URL of this test's database, for building extra stores.
    pub database_url: String,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new().await.expect("Failed to create test harness")
    }

    async fn teardown(self) {
        self.db_pool.close().await;
    }
}

impl TestHarness {
    /// Create a database for this test and run migrations on it.
    pub async fn new() -> Result<Self> {
        let infra = SharedTestInfra::get().await;

        let name = format!(
            "playbooks_test_{}_{}",
            std::process::id(),
            NEXT_DATABASE.fetch_add(1, Ordering::SeqCst)
        );
        let admin = PgPool::connect(&format!("{}/postgres", infra.server_url))
            .await
            .context("Failed to connect to test server")?;
        sqlx::query(&format!("CREATE DATABASE {}", name))
            .execute(&admin)
            .await
            .context("Failed to create test database")?;
        admin.close().await;

        let database_url = format!("{}/{}", infra.server_url, name);
        let store = PostgresStore::connect(&database_url, &PoolConfig::default())
            .await
            .context("Failed to connect to test database")?;
        store.migrate().await.context("Failed to run migrations")?;

        Ok(Self {
            db_pool: store.pool().clone(),
            store,
            database_url,
        })
    }
}
