//! Embedded PostgreSQL databases for the Diesel adapter suites.
//!
//! Every test starts a private cluster through `pg-embed-setup-unpriv`,
//! creates a uniquely named database, and applies the embedded migrations
//! with [`run_migrations`], so tests never share rows and always see the
//! production schema, seeded categories included.

use std::future::Future;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use diesel::pg::PgConnection;
use diesel::{Connection, RunQueryDsl};
use pg_embedded_setup_unpriv::TestCluster;
use tokio::runtime::Runtime;
use uuid::Uuid;

use tokku::outbound::persistence::{DbPool, PoolConfig, run_migrations};

/// Serialises cluster bootstrap and the environment overrides it needs.
static BOOTSTRAP_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn pg_embed_dirs() -> std::io::Result<(PathBuf, PathBuf)> {
    let target = std::env::var_os("CARGO_TARGET_DIR").map_or_else(
        || PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("..").join("target"),
        PathBuf::from,
    );
    let base = target
        .join("pg-embed")
        .join(format!("bootstrap-{}-{}", std::process::id(), Uuid::new_v4()));
    let runtime_dir = base.join("install");
    let data_dir = base.join("data");
    std::fs::create_dir_all(&runtime_dir)?;
    std::fs::create_dir_all(&data_dir)?;
    Ok((runtime_dir, data_dir))
}

/// Start a cluster, keeping its files under the target directory unless
/// `PG_RUNTIME_DIR` and `PG_DATA_DIR` are both set.
fn start_cluster() -> Result<TestCluster, String> {
    let _bootstrap = BOOTSTRAP_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|err| err.into_inner());

    let needs_override =
        std::env::var_os("PG_RUNTIME_DIR").is_none() || std::env::var_os("PG_DATA_DIR").is_none();
    let _env = if needs_override {
        let (runtime_dir, data_dir) = pg_embed_dirs().map_err(|err| err.to_string())?;
        Some(env_lock::lock_env([
            ("PG_RUNTIME_DIR", Some(runtime_dir.to_string_lossy().into_owned())),
            ("PG_DATA_DIR", Some(data_dir.to_string_lossy().into_owned())),
        ]))
    } else {
        None
    };

    TestCluster::new().map_err(|err| format!("{err:?}"))
}

fn create_database(admin_url: &str, name: &str) -> Result<(), String> {
    let mut conn = PgConnection::establish(admin_url).map_err(|err| err.to_string())?;
    diesel::sql_query(format!("CREATE DATABASE {name}"))
        .execute(&mut conn)
        .map(|_| ())
        .map_err(|err| err.to_string())
}

/// A migrated database on its own embedded cluster.
///
/// Fields drop in order: the pool closes its connections while the runtime
/// is still alive, and the cluster stops last.
pub struct TestDatabase {
    pool: DbPool,
    runtime: Runtime,
    url: String,
    _cluster: TestCluster,
}

impl TestDatabase {
    /// Start a cluster and migrate a fresh database on it.
    ///
    /// Must be called outside any Tokio runtime; the cluster bootstrap runs
    /// its own.
    pub fn start() -> Result<Self, String> {
        let cluster = start_cluster()?;
        let name = format!("tokku_{}", Uuid::new_v4().simple());
        create_database(&cluster.connection().database_url("postgres"), &name)?;
        let url = cluster.connection().database_url(&name);

        let runtime = Runtime::new().map_err(|err| err.to_string())?;
        runtime
            .block_on(run_migrations(&url))
            .map_err(|err| err.to_string())?;
        let config = PoolConfig::new(url.as_str())
            .with_max_size(4)
            .with_min_idle(Some(1));
        let pool = runtime
            .block_on(DbPool::new(config))
            .map_err(|err| err.to_string())?;

        Ok(Self {
            pool,
            runtime,
            url,
            _cluster: cluster,
        })
    }

    /// Shared pool for building repositories.
    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    /// Drive an adapter future to completion.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Run raw SQL on a fresh synchronous connection, bypassing the
    /// adapters.
    pub fn execute_sql(&self, sql: &str) -> Result<usize, String> {
        let mut conn = PgConnection::establish(&self.url).map_err(|err| err.to_string())?;
        diesel::sql_query(sql)
            .execute(&mut conn)
            .map_err(|err| err.to_string())
    }
}
