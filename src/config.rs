use lazy_static::lazy_static;

/// Runtime configuration, read once from the environment.
///
/// A `.env` file is honored when present so local runs don't need to
/// export anything. Every value has a development default; production
/// deployments are expected to set at least `EXCELVIZ_JWT_SECRET` and
/// the SMTP credentials.
pub struct Config {
    /// Address the HTTP server binds to.
    pub bind_addr: String,

    /// Root directory of the document store.
    pub data_dir: String,

    /// HS256 signing secret for access tokens.
    pub jwt_secret: String,

    /// Upload size cap in bytes, enforced before parsing.
    pub max_upload_bytes: usize,

    /// Allowed CORS origin; `*` means any.
    pub cors_origin: String,

    pub smtp_host: String,
    pub smtp_user: String,
    pub smtp_pass: String,
    pub smtp_from: String,
}

const DEFAULT_MAX_UPLOAD: usize = 5 * 1024 * 1024;

impl Config {
    fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        Config {
            bind_addr: env_or("EXCELVIZ_BIND_ADDR", "127.0.0.1:3000"),
            data_dir: env_or("EXCELVIZ_DATA_DIR", "data"),
            jwt_secret: env_or("EXCELVIZ_JWT_SECRET", "excelviz-dev-secret"),
            max_upload_bytes: std::env::var("EXCELVIZ_MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_UPLOAD),
            cors_origin: env_or("EXCELVIZ_CORS_ORIGIN", "*"),
            smtp_host: env_or("EXCELVIZ_SMTP_HOST", "localhost"),
            smtp_user: env_or("EXCELVIZ_SMTP_USER", ""),
            smtp_pass: env_or("EXCELVIZ_SMTP_PASS", ""),
            smtp_from: env_or("EXCELVIZ_SMTP_FROM", "Excelviz <no-reply@localhost>"),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

lazy_static! {
    /// Global configuration, initialized on first access.
    pub static ref CONFIG: Config = Config::from_env();
}
