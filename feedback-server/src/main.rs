use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod server;

use application::auth_service::AuthService;
use application::feedback_service::FeedbackService;
use data::post_repository::PostRepository;
use data::repositories::memory::MemoryStore;
use data::repositories::postgres::post_repository::PostgresPostRepository;
use data::repositories::postgres::user_repository::PostgresUserRepository;
use data::user_repository::UserRepository;
use infrastructure::database::{create_pool, run_migrations};
use infrastructure::logging::init_logging;
use infrastructure::session::SessionAuthenticator;
use infrastructure::settings::Settings;
use presentation::AppState;
use presentation::http::cookies::CookieSettings;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;

    init_logging(&settings.log_level, settings.log_format)?;

    let (users, posts): (Arc<dyn UserRepository>, Arc<dyn PostRepository>) =
        match &settings.database_url {
            Some(database_url) => {
                let pool = create_pool(database_url, settings.db_max_connections).await?;
                run_migrations(&pool).await?;
                (
                    Arc::new(PostgresUserRepository::new(pool.clone())),
                    Arc::new(PostgresPostRepository::new(pool)),
                )
            }
            None => {
                warn!("DATABASE_URL is not set, using the in-memory store; data is lost on exit");
                let store = MemoryStore::new();
                (Arc::new(store.clone()), Arc::new(store))
            }
        };

    let sessions = Arc::new(SessionAuthenticator::new(
        &settings.session_secret,
        settings.session_ttl_seconds,
    ));
    let cookies = CookieSettings {
        secure: settings.session_cookie_secure,
        session_max_age_seconds: sessions.ttl_seconds(),
    };

    let state = AppState::new(
        Arc::new(AuthService::new(users.clone(), sessions)),
        Arc::new(FeedbackService::new(users, posts)),
        cookies,
    );

    info!("starting feedback server");
    server::run_http(&settings, state).await
}
