use anyhow::Result;

pub struct AppConfig {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    pub fn new() -> Result<Self> {
        let database = DatabaseConfig {
            host: std::env::var("DATABASE_HOST")?,
            port: std::env::var("DATABASE_PORT")?.parse::<u16>()?,
            username: std::env::var("DATABASE_USERNAME")?,
            password: std::env::var("DATABASE_PASSWORD")?,
            database: std::env::var("DATABASE_NAME")?,
        };
        let server = ServerConfig {
            port: match std::env::var("SERVER_PORT") {
                Ok(port) => port.parse::<u16>()?,
                Err(_) => ServerConfig::DEFAULT_PORT,
            },
        };
        Ok(Self { database, server })
    }
}

pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
}

pub struct ServerConfig {
    pub port: u16,
}

impl ServerConfig {
    pub const DEFAULT_PORT: u16 = 8080;
}
