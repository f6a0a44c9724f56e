use serde::Deserialize;
use std::env;
use std::net::SocketAddr;

// Top-level configuration container, assembled from environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub jwt: JwtConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
    pub seed_sample_data: bool,
}

impl AppConfig {
    /// Listen address from the configured HOST and PORT.
    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .expect("HOST and PORT must form a valid socket address")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    pub browse_cache_ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub expires_in_hours: i64,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            app: AppConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORT")
                    .unwrap_or_else(|_| "8000".to_string())
                    .parse()
                    .expect("PORT must be a valid number"),
                environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
                rust_log: env::var("RUST_LOG")
                    .unwrap_or_else(|_| "cinema_booking=debug,tower_http=debug".to_string()),
                seed_sample_data: env::var("SEED_SAMPLE_DATA")
                    .unwrap_or_else(|_| "true".to_string())
                    .parse()
                    .expect("SEED_SAMPLE_DATA must be true or false"),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
                pool_size: env::var("DB_POOL_SIZE")
                    .unwrap_or_else(|_| "20".to_string())
                    .parse()
                    .expect("DB_POOL_SIZE must be a valid number"),
            },
            redis: RedisConfig {
                url: env::var("REDIS_URL").expect("REDIS_URL must be set"),
                browse_cache_ttl_secs: env::var("BROWSE_CACHE_TTL_SECS")
                    .unwrap_or_else(|_| "300".to_string())
                    .parse()
                    .expect("BROWSE_CACHE_TTL_SECS must be a valid number"),
            },
            jwt: JwtConfig {
                secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
                expires_in_hours: env::var("JWT_EXPIRES_IN_HOURS")
                    .unwrap_or_else(|_| "24".to_string())
                    .parse()
                    .expect("JWT_EXPIRES_IN_HOURS must be a valid number"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_config(host: &str, port: u16) -> AppConfig {
        AppConfig {
            host: host.to_string(),
            port,
            environment: "test".to_string(),
            rust_log: "debug".to_string(),
            seed_sample_data: false,
        }
    }

    #[test]
    fn socket_addr_uses_the_configured_host() {
        let addr = app_config("127.0.0.1", 9000).socket_addr();
        assert_eq!(addr.to_string(), "127.0.0.1:9000");
    }

    #[test]
    fn socket_addr_supports_the_wildcard_host() {
        let addr = app_config("0.0.0.0", 8000).socket_addr();
        assert_eq!(addr.to_string(), "0.0.0.0:8000");
    }
}
