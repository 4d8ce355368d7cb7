use config::Config;
use email::EmailService;
use sqlx::PgPool;

pub mod config;
pub mod email;
pub mod middleware;
pub mod utils;

pub mod routes;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub email: EmailService,
}
