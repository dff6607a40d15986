use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

pub struct Config {
    pub port: u16,
    pub database_path: String,
    pub views_root: String,
    pub public_root: String,
    pub admin_user: String,
    pub admin_password: String,
    pub whatsapp_phone: String,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("TIENDA_PORT", "4000"),
            database_path: try_load("TIENDA_DB_PATH", "tienda.db"),
            views_root: try_load("TIENDA_VIEWS_ROOT", "views"),
            public_root: try_load("TIENDA_PUBLIC_ROOT", "public"),
            admin_user: try_load("TIENDA_ADMIN_USER", "admin"),
            admin_password: try_load("TIENDA_ADMIN_PASSWORD", "pradito2025"),
            whatsapp_phone: try_load("TIENDA_WHATSAPP_PHONE", "573225865591"),
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found, using default");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}
