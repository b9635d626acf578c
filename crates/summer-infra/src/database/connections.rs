#[cfg(feature = "postgres")]
use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "postgres")]
use sea_orm::{ConnectOptions, Database, DbConn, DbErr};

/// Configuration for the database pool.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
}

/// The process-wide connection pool.
///
/// Built once at startup and shared with the repositories through
/// [`DatabasePool::shared`]; call [`DatabasePool::close`] on shutdown.
#[cfg(feature = "postgres")]
#[derive(Clone)]
pub struct DatabasePool {
    conn: Arc<DbConn>,
}

#[cfg(feature = "postgres")]
impl DatabasePool {
    /// Connect and verify the database is reachable.
    pub async fn init(config: &DatabaseConfig) -> Result<Self, DbErr> {
        tracing::info!("Initializing database connection pool...");

        let opts = ConnectOptions::new(&config.url)
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(config.connect_timeout)
            .idle_timeout(Duration::from_secs(300))
            .sqlx_logging(true)
            .to_owned();

        let conn = Database::connect(opts).await?;
        conn.ping().await?;

        tracing::info!(
            max_connections = config.max_connections,
            "Database connected"
        );

        Ok(Self::from_connection(conn))
    }

    /// Wrap an already established connection.
    pub fn from_connection(conn: DbConn) -> Self {
        Self {
            conn: Arc::new(conn),
        }
    }

    pub fn conn(&self) -> &DbConn {
        &self.conn
    }

    /// A handle for repositories.
    pub fn shared(&self) -> Arc<DbConn> {
        Arc::clone(&self.conn)
    }

    /// Close the pool once every other handle has been dropped.
    ///
    /// Returns `Ok(false)` when handles are still alive; their connections
    /// are then released as they drop.
    pub async fn close(self) -> Result<bool, DbErr> {
        match Arc::try_unwrap(self.conn) {
            Ok(conn) => {
                tracing::info!("Closing database connection pool");
                conn.close().await?;
                Ok(true)
            }
            Err(_) => Ok(false),
        }
    }
}
