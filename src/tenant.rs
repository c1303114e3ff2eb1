use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::collections::HashMap;

pub const DEFAULT_TENANT: &str = "default";

/// The pool resolved for the current request, inserted by the tenant
/// middleware so handlers never pick a database themselves.
#[derive(Clone)]
pub struct TenantDb(pub PgPool);

/// Maps tenant routing keys (carried in JWT claims) to their database pools.
/// Pools are created once at startup; requests only ever look one up, so a
/// bad tenant key can never repoint another request's connection.
#[derive(Clone)]
pub struct TenantRegistry {
    pools: HashMap<String, PgPool>,
}

impl TenantRegistry {
    /// Builds the registry from the default pool plus the `TENANT_DATABASES`
    /// environment variable, a comma-separated list of `key=postgres-url`
    /// pairs. Entries with a malformed shape are skipped with a warning.
    pub async fn from_env(default_pool: PgPool) -> anyhow::Result<Self> {
        let mut pools = HashMap::new();
        pools.insert(DEFAULT_TENANT.to_string(), default_pool);

        if let Ok(raw) = std::env::var("TENANT_DATABASES") {
            for entry in raw.split(',').filter(|e| !e.trim().is_empty()) {
                let Some((key, url)) = entry.split_once('=') else {
                    tracing::warn!("Skipping malformed tenant entry: {}", entry);
                    continue;
                };
                let key = key.trim();
                let pool = PgPoolOptions::new()
                    .max_connections(5)
                    .connect(url.trim())
                    .await?;
                // Tenant databases carry the same schema as the default one
                // and are brought up to date before taking traffic.
                sqlx::migrate!().run(&pool).await?;
                tracing::info!("Registered tenant database: {}", key);
                pools.insert(key.to_string(), pool);
            }
        }

        Ok(Self { pools })
    }

    pub fn pool(&self, tenant: &str) -> Option<PgPool> {
        self.pools.get(tenant).cloned()
    }

    pub fn with_pools(pools: HashMap<String, PgPool>) -> Self {
        Self { pools }
    }
}
