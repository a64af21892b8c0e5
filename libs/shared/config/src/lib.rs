use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use serde::{Deserialize, Serialize};
use tracing::warn;

const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Store-level unique index on (patient_id, scheduled_at).
    pub enforce_unique_slots: bool,
    pub seed_demo_data: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            enforce_unique_slots: true,
            seed_demo_data: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let config = Self {
            host: parse_var("CLINIC_HOST", defaults.host),
            port: parse_var("CLINIC_PORT", defaults.port),
            enforce_unique_slots: parse_var("CLINIC_ENFORCE_UNIQUE_SLOTS", defaults.enforce_unique_slots),
            seed_demo_data: parse_var("CLINIC_SEED_DEMO_DATA", defaults.seed_demo_data),
        };

        if !config.enforce_unique_slots {
            warn!("Store-level slot uniqueness disabled - concurrent bookings may double-book a patient");
        }

        config
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_var<T>(name: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Debug,
{
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value {:?}, using default {:?}", name, raw, default);
            default
        }),
        Err(_) => {
            warn!("{} not set, using default {:?}", name, default);
            default
        }
    }
}
