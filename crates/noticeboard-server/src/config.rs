use crate::error::Result;
pub use clap::Parser;
#[cfg(feature = "postgres")]
use url::Url;

#[derive(Debug, Clone, clap::Parser)]
#[command(version, about)]
pub struct ServerConfig {
    #[arg(
        short,
        long,
        default_value_t = 5000,
        env = "NOTICEBOARD_LISTEN_PORT",
        help = "Port to listen on"
    )]
    pub port: u16,
    #[arg(
        short,
        long,
        default_value = "127.0.0.1",
        env = "NOTICEBOARD_LISTEN_ADDRESS",
        help = "Address to listen on"
    )]
    pub listen_address: String,

    #[arg(long, env = "NOTICEBOARD_CORS", help = "Enable permissive CORS")]
    pub cors: bool,

    #[command(flatten)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, clap::Args)]
pub struct DatabaseConfig {
    #[arg(
        long,
        env = "NOTICEBOARD_DATABASE_URL",
        help = "Full database URL, when given, the POSTGRES_* options are ignored"
    )]
    database_url: Option<String>,

    #[arg(long, env = "POSTGRES_HOST", default_value = "127.0.0.1")]
    pub db_host: String,

    #[arg(long, env = "POSTGRES_PORT", default_value_t = 5431)]
    pub db_port: u16,

    #[arg(long, env = "POSTGRES_USER", default_value = "postgres")]
    pub db_user: String,

    #[arg(long, env = "POSTGRES_PASSWORD", default_value = "postgres")]
    pub db_password: String,

    #[arg(long, env = "POSTGRES_DB", default_value = "db_postgres")]
    pub db_name: String,

    #[arg(
        long,
        env = "NOTICEBOARD_MAX_CONNECTIONS",
        default_value_t = noticeboard_dal::DEFAULT_MAX_CONNECTIONS,
        help = "Size of database connection pool"
    )]
    pub max_connections: u32,
}

impl ServerConfig {
    pub fn load() -> Result<Self> {
        ServerConfig::try_parse().map_err(|e| e.into())
    }

    pub fn database_url(&self) -> Result<String> {
        self.database.database_url()
    }
}

impl DatabaseConfig {
    /// Connection string, either given explicitly or composed from parts
    pub fn database_url(&self) -> Result<String> {
        match self.database_url {
            Some(ref url) => Ok(url.clone()),
            None => self.compose_url(),
        }
    }

    #[cfg(feature = "postgres")]
    fn compose_url(&self) -> Result<String> {
        let mut url = Url::parse(&format!("postgres://{}", self.db_host))?;
        url.set_port(Some(self.db_port))
            .map_err(|_| anyhow::anyhow!("Invalid database port"))?;
        url.set_username(&self.db_user)
            .map_err(|_| anyhow::anyhow!("Invalid database user"))?;
        url.set_password(Some(&self.db_password))
            .map_err(|_| anyhow::anyhow!("Invalid database password"))?;
        url.set_path(&self.db_name);
        Ok(url.to_string())
    }

    #[cfg(not(feature = "postgres"))]
    fn compose_url(&self) -> Result<String> {
        // SQLite has no server, only database name is relevant
        Ok(format!("sqlite://{}.db?mode=rwc", self.db_name))
    }
}
