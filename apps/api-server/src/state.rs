//! Application state - shared across all handlers.

use std::path::PathBuf;
use std::sync::Arc;

use actix_web::HttpRequest;
use anyhow::Context;

use summer_core::ports::{PasswordService, PostRepository, UserRepository};
use summer_core::{PostService, UserService};
use summer_infra::{
    Argon2PasswordService, InMemoryPostRepository, InMemoryUserRepository, LocalPhotoStorage,
};

#[cfg(feature = "postgres")]
use migration::{Migrator, MigratorTrait};
#[cfg(feature = "postgres")]
use summer_infra::{DatabasePool, PostgresPostRepository, PostgresUserRepository};

use crate::config::AppConfig;
use crate::handlers::UPLOADS_PATH;

/// Where uploaded photos live and how they are addressed.
#[derive(Debug, Clone)]
pub struct UploadSettings {
    pub dir: PathBuf,
    pub max_bytes: usize,
    pub public_base_url: Option<String>,
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub posts: PostService,
    pub uploads: UploadSettings,
    #[cfg(feature = "postgres")]
    db: Option<DatabasePool>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    ///
    /// A configured database that cannot be reached is a startup error.
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let photos = LocalPhotoStorage::init(config.upload_dir.clone())
            .await
            .context("failed to prepare upload directory")?;
        let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());
        let uploads = UploadSettings {
            dir: photos.root().to_path_buf(),
            max_bytes: config.max_upload_bytes,
            public_base_url: config.public_base_url.clone(),
        };

        #[cfg(feature = "postgres")]
        if let Some(db_config) = &config.database {
            let pool = DatabasePool::init(db_config)
                .await
                .context("failed to connect to database")?;

            if config.run_migrations {
                tracing::info!("Applying pending migrations");
                Migrator::up(pool.conn(), None)
                    .await
                    .context("failed to apply migrations")?;
            }

            let users = Arc::new(PostgresUserRepository::new(pool.shared()));
            let posts = Arc::new(PostgresPostRepository::new(pool.shared()));
            let mut state = Self::from_parts(users, posts, passwords, photos, uploads);
            state.db = Some(pool);

            tracing::info!("Application state initialized (postgres)");
            return Ok(state);
        }

        #[cfg(not(feature = "postgres"))]
        if config.database.is_some() {
            tracing::warn!("DATABASE_URL is set but the postgres feature is disabled");
        }

        tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        let users = Arc::new(InMemoryUserRepository::new());
        let posts = Arc::new(InMemoryPostRepository::new(users.clone()));

        Ok(Self::from_parts(users, posts, passwords, photos, uploads))
    }

    /// Wire services over the given adapters.
    pub fn from_parts(
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
        passwords: Arc<dyn PasswordService>,
        photos: LocalPhotoStorage,
        uploads: UploadSettings,
    ) -> Self {
        Self {
            users: UserService::new(users.clone(), passwords, Arc::new(photos)),
            posts: PostService::new(posts, users),
            uploads,
            #[cfg(feature = "postgres")]
            db: None,
        }
    }

    /// Absolute URL prefix under which uploaded files are served.
    pub fn public_uploads_root(&self, req: &HttpRequest) -> String {
        let base = match &self.uploads.public_base_url {
            Some(base) => base.clone(),
            None => {
                let info = req.connection_info();
                format!("{}://{}", info.scheme(), info.host())
            }
        };
        format!("{}{}", base.trim_end_matches('/'), UPLOADS_PATH)
    }

    /// Release external resources once the server has stopped.
    pub async fn shutdown(self) {
        #[cfg(feature = "postgres")]
        {
            let Self { users, posts, db, .. } = self;
            // Repositories hold pool handles.
            drop(users);
            drop(posts);

            if let Some(pool) = db {
                match pool.close().await {
                    Ok(true) => tracing::info!("Database pool closed"),
                    Ok(false) => tracing::warn!("Database pool still shared; closing on drop"),
                    Err(e) => tracing::error!(error = %e, "Failed to close database pool"),
                }
            }
        }

        tracing::info!("Shutdown complete");
    }
}
