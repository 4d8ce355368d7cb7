use std::env;
use std::time::Duration;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub jwt_secret: String,
    pub jwt_expiration_secs: u64,
    pub bcrypt_cost: u32,
    pub required_app_version: String,
    pub resend_api_key: String,
    pub email_from: String,
    pub email_name: String,
    pub business_notification_email: String,
    pub public_base_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        let jwt_expiration_hours = env::var("JWT_EXPIRES_IN")
            .unwrap_or_default()
            .trim_end_matches('h')
            .parse::<u64>()
            .unwrap_or(24);

        Ok(Config {
            database_url: env::var("DATABASE_URL")?,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_default()
                .parse()
                .unwrap_or(3000),
            jwt_secret: env::var("JWT_SECRET")?,
            jwt_expiration_secs: jwt_expiration_hours * 3600,
            bcrypt_cost: env::var("BCRYPT_ROUNDS")
                .unwrap_or_default()
                .parse()
                .unwrap_or(12),
            required_app_version: env::var("REQUIRED_APP_VERSION")
                .unwrap_or_else(|_| "1.0.0".into()),
            resend_api_key: env::var("RESEND_API_KEY")?,
            email_from: env::var("EMAIL_FROM")?,
            email_name: env::var("EMAIL_NAME")?,
            business_notification_email: env::var("BUSINESS_NOTIFICATION_EMAIL")?,
            public_base_url: env::var("EMAIL_VERIFICATION_URL")?,
        })
    }

    pub fn jwt_expiration(&self) -> Duration {
        Duration::from_secs(self.jwt_expiration_secs)
    }
}
