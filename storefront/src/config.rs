//! Storefront configuration
//!
//! # Environment variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | DATABASE_URL | (unset) | PostgreSQL URL; unset runs on the in-memory backend |
//! | HTTP_PORT | 3000 | HTTP listen port |
//! | ENVIRONMENT | development | development / staging / production |
//! | AUDIT_BUFFER_SIZE | 256 | Audit channel capacity |
//! | CART_SESSION_CAPACITY | 10000 | Most cart mirrors kept in memory |
//! | CART_SESSION_IDLE_SECS | 900 | Idle time before a cart mirror is dropped |
//! | ALL_DEVICES_SLUG | alldevices | Slug selecting the all-devices listing |
//! | CUSTOM_FACET_VALUE | Custom | Data-entry free-text sentinel |
//! | FLAG_TRUE_VALUE | true | "Yes" value of boolean facets |
//! | FLAG_FALSE_VALUE | false | "No" value of boolean facets |
//! | DATA_ENTRY_ROLES | admin,sales | Roles that receive data-entry facets |
//! | UNIQUE_VIOLATION_CODE | 23505 | Backend code for a uniqueness conflict |
//! | FOREIGN_KEY_VIOLATION_CODE | 23503 | Backend code for a missing referenced row |

use std::time::Duration;

use shared::models::CUSTOM_FACET_VALUE;

/// Service configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub http_port: u16,
    /// development | staging | production
    pub environment: String,
    pub audit_buffer_size: usize,
    pub cart_sessions: CartSessionConfig,
    pub catalog: CatalogConfig,
}

/// Bounds on the per-user cart mirror cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartSessionConfig {
    pub capacity: usize,
    pub idle_ttl: Duration,
}

impl Default for CartSessionConfig {
    fn default() -> Self {
        Self {
            capacity: 10_000,
            idle_ttl: Duration::from_secs(900),
        }
    }
}

/// Settings injected into the catalog and cart components
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    pub all_devices_slug: String,
    pub custom_sentinel: String,
    pub flags: FlagConfig,
    pub roles: RoleConfig,
    pub conflict_codes: ConflictCodes,
}

/// Values of the Yes/No facets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagConfig {
    pub true_value: String,
    pub false_value: String,
}

/// Role identifiers recognized by the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleConfig {
    /// Roles that see data-entry facets (with the custom sentinel)
    pub data_entry: Vec<String>,
}

impl RoleConfig {
    pub fn is_data_entry(&self, role: &str) -> bool {
        self.data_entry.iter().any(|r| r.eq_ignore_ascii_case(role.trim()))
    }
}

/// Backend error codes that classify cart mutation failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictCodes {
    pub unique_violation: String,
    pub foreign_key_violation: String,
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = CatalogConfig::default();
        let sessions = CartSessionConfig::default();
        Self {
            database_url: std::env::var("DATABASE_URL").ok().filter(|v| !v.is_empty()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            audit_buffer_size: std::env::var("AUDIT_BUFFER_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v: &usize| *v > 0)
                .unwrap_or(256),
            cart_sessions: CartSessionConfig {
                capacity: std::env::var("CART_SESSION_CAPACITY")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .filter(|v: &usize| *v > 0)
                    .unwrap_or(sessions.capacity),
                idle_ttl: std::env::var("CART_SESSION_IDLE_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .map(Duration::from_secs)
                    .unwrap_or(sessions.idle_ttl),
            },
            catalog: CatalogConfig {
                all_devices_slug: env_or("ALL_DEVICES_SLUG", defaults.all_devices_slug),
                custom_sentinel: env_or("CUSTOM_FACET_VALUE", defaults.custom_sentinel),
                flags: FlagConfig {
                    true_value: env_or("FLAG_TRUE_VALUE", defaults.flags.true_value),
                    false_value: env_or("FLAG_FALSE_VALUE", defaults.flags.false_value),
                },
                roles: RoleConfig {
                    data_entry: std::env::var("DATA_ENTRY_ROLES")
                        .ok()
                        .map(|v| parse_roles(&v))
                        .filter(|roles| !roles.is_empty())
                        .unwrap_or(defaults.roles.data_entry),
                },
                conflict_codes: ConflictCodes {
                    unique_violation: env_or(
                        "UNIQUE_VIOLATION_CODE",
                        defaults.conflict_codes.unique_violation,
                    ),
                    foreign_key_violation: env_or(
                        "FOREIGN_KEY_VIOLATION_CODE",
                        defaults.conflict_codes.foreign_key_violation,
                    ),
                },
            },
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            all_devices_slug: "alldevices".into(),
            custom_sentinel: CUSTOM_FACET_VALUE.into(),
            flags: FlagConfig {
                true_value: "true".into(),
                false_value: "false".into(),
            },
            roles: RoleConfig {
                data_entry: vec!["admin".into(), "sales".into()],
            },
            conflict_codes: ConflictCodes {
                unique_violation: "23505".into(),
                foreign_key_violation: "23503".into(),
            },
        }
    }
}

fn env_or(name: &str, default: String) -> String {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
}

fn parse_roles(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect()
}
