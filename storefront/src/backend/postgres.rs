//! PostgreSQL backend

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::RawField;
use shared::models::{
    AuditEvent, CartLine, FilterDimension, OrderProductManifest, ProductRow, PublishState,
};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};

use super::{
    AuditSink, BackendError, BackendResult, CartMutation, CartStore, OrderBy, PredicateOp,
    ProductQuery, ProductStore, WinStore,
};
use crate::reports::WinRecord;

/// Array-like columns are read through `to_jsonb` so that native arrays,
/// JSON text and plain text all arrive as a JSON value
const PRODUCT_COLUMNS: &str = "id, slug, name, sku, form_factor, processor, memory, storage, \
     screen_size, to_jsonb(technologies) AS technologies, copilot, five_g, \
     total_inventory::bigint AS total_inventory, stock_inventory::bigint AS stock_inventory, \
     status, image, to_jsonb(gallery) AS gallery, created_at";

#[derive(Debug, Clone)]
pub struct PgBackend {
    pool: PgPool,
}

impl PgBackend {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and apply pending migrations
    pub async fn connect(database_url: &str) -> BackendResult<Self> {
        let pool = PgPool::connect(database_url).await?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| BackendError::Unavailable(format!("migration failed: {e}")))?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn column(dimension: FilterDimension) -> Option<&'static str> {
    match dimension {
        FilterDimension::FormFactor => Some("form_factor"),
        FilterDimension::Processor => Some("processor"),
        FilterDimension::Memory => Some("memory"),
        FilterDimension::Storage => Some("storage"),
        FilterDimension::ScreenSize => Some("screen_size"),
        FilterDimension::Copilot | FilterDimension::FiveG => None,
    }
}

/// Escape LIKE metacharacters so the term matches literally
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Build the product SELECT for `query`
pub fn build_product_query(query: &ProductQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM products"));
    let mut has_where = false;
    let mut and = |qb: &mut QueryBuilder<'static, Postgres>| {
        qb.push(if has_where { " AND " } else { " WHERE " });
        has_where = true;
    };

    for predicate in &query.predicates {
        let Some(col) = column(predicate.dimension) else {
            continue;
        };
        match (predicate.op, predicate.values.as_slice()) {
            (_, []) => continue,
            // Facet values are trimmed, so the column is too
            (PredicateOp::Eq, [value, ..]) => {
                and(&mut qb);
                qb.push(format!("btrim({col}) = "))
                    .push_bind(value.trim().to_string());
            }
            (PredicateOp::In, values) => {
                and(&mut qb);
                let values: Vec<String> = values.iter().map(|v| v.trim().to_string()).collect();
                qb.push(format!("btrim({col}) = ANY("))
                    .push_bind(values)
                    .push(")");
            }
        }
    }

    if let Some(term) = &query.search {
        let pattern = format!("%{}%", escape_like(term));
        and(&mut qb);
        qb.push("(name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR sku ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    match query.order_by {
        OrderBy::RecentFirst => qb.push(" ORDER BY created_at DESC NULLS LAST"),
    };
    qb
}

fn product_from_row(row: &PgRow) -> Result<ProductRow, sqlx::Error> {
    let status: Option<String> = row.try_get("status")?;
    let status = match status.as_deref().map(str::trim) {
        Some(s) if s.eq_ignore_ascii_case("published") => PublishState::Published,
        _ => PublishState::Private,
    };
    let technologies: Option<serde_json::Value> = row.try_get("technologies")?;
    let gallery: Option<serde_json::Value> = row.try_get("gallery")?;
    let created_at: Option<DateTime<Utc>> = row.try_get("created_at")?;

    Ok(ProductRow {
        id: row.try_get("id")?,
        slug: row.try_get::<Option<String>, _>("slug")?.unwrap_or_default(),
        name: row.try_get("name")?,
        sku: row.try_get("sku")?,
        form_factor: row.try_get("form_factor")?,
        processor: row.try_get("processor")?,
        memory: row.try_get("memory")?,
        storage: row.try_get("storage")?,
        screen_size: row.try_get("screen_size")?,
        technologies: RawField::from(technologies),
        copilot: row.try_get("copilot")?,
        five_g: row.try_get("five_g")?,
        total_inventory: row.try_get("total_inventory")?,
        stock_inventory: row.try_get("stock_inventory")?,
        status,
        image: row.try_get("image")?,
        gallery: RawField::from(gallery),
        created_at,
    })
}

#[async_trait]
impl ProductStore for PgBackend {
    async fn query_products(&self, query: &ProductQuery) -> BackendResult<Vec<ProductRow>> {
        let mut qb = build_product_query(query);
        let rows = qb.build().fetch_all(&self.pool).await?;
        let products = rows
            .iter()
            .map(product_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(count = products.len(), "Fetched products");
        Ok(products)
    }
}

#[async_trait]
impl CartStore for PgBackend {
    async fn fetch_lines(&self, user_id: &str) -> BackendResult<Vec<CartLine>> {
        let lines = sqlx::query_as::<_, CartLine>(
            "SELECT user_id, product_id, quantity, created_at FROM cart_items \
             WHERE user_id = $1 ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(lines)
    }

    async fn mutate(&self, user_id: &str, mutation: CartMutation) -> BackendResult<()> {
        match mutation {
            CartMutation::Insert {
                product_id,
                quantity,
            } => {
                let quantity = i32::try_from(quantity)
                    .map_err(|_| BackendError::rejected("22003", "quantity out of range"))?;
                sqlx::query(
                    "INSERT INTO cart_items (user_id, product_id, quantity) VALUES ($1, $2, $3)",
                )
                .bind(user_id)
                .bind(product_id)
                .bind(quantity)
                .execute(&self.pool)
                .await?;
            }
            CartMutation::Delete { product_id } => {
                sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND product_id = $2")
                    .bind(user_id)
                    .bind(product_id)
                    .execute(&self.pool)
                    .await?;
            }
            CartMutation::DeleteAll => {
                sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
                    .bind(user_id)
                    .execute(&self.pool)
                    .await?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl WinStore for PgBackend {
    async fn fetch_wins(&self) -> BackendResult<Vec<WinRecord>> {
        let rows = sqlx::query(
            "SELECT id, customer, to_jsonb(product_ids) AS product_ids, \
             to_jsonb(quantities) AS quantities, closed_at \
             FROM wins ORDER BY closed_at DESC NULLS LAST",
        )
        .fetch_all(&self.pool)
        .await?;

        let wins = rows
            .iter()
            .map(|row| -> Result<WinRecord, sqlx::Error> {
                let product_ids: Option<serde_json::Value> = row.try_get("product_ids")?;
                let quantities: Option<serde_json::Value> = row.try_get("quantities")?;
                Ok(WinRecord {
                    id: row.try_get("id")?,
                    customer: row.try_get("customer")?,
                    manifest: OrderProductManifest::new(product_ids, quantities),
                    closed_at: row.try_get("closed_at")?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(count = wins.len(), "Fetched wins");
        Ok(wins)
    }
}

#[async_trait]
impl AuditSink for PgBackend {
    async fn record(&self, event: AuditEvent) -> BackendResult<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_logs (
                event_type, level, action, message, user_id,
                entity_id, details, status, timestamp
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&event.event_type)
        .bind(event.level.as_str())
        .bind(event.action.as_str())
        .bind(&event.message)
        .bind(&event.user_id)
        .bind(&event.entity_id)
        .bind(&event.details)
        .bind(event.status.as_str())
        .bind(event.timestamp)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Predicate;

    fn where_clause(query: &ProductQuery) -> String {
        let qb = build_product_query(query);
        let sql = qb.sql();
        sql[sql.find(" FROM products").unwrap()..].to_string()
    }

    #[test]
    fn test_unfiltered_query() {
        assert_eq!(
            where_clause(&ProductQuery::default()),
            " FROM products ORDER BY created_at DESC NULLS LAST"
        );
    }

    #[test]
    fn test_predicates_pushed() {
        let query = ProductQuery {
            predicates: vec![
                Predicate::for_values(FilterDimension::FormFactor, vec!["Laptop".into()]),
                Predicate::for_values(
                    FilterDimension::Memory,
                    vec!["16GB".into(), "32GB".into()],
                ),
                // Flags have no column and are skipped
                Predicate::for_values(FilterDimension::Copilot, vec!["true".into()]),
            ],
            ..Default::default()
        };
        assert_eq!(
            where_clause(&query),
            " FROM products WHERE btrim(form_factor) = $1 AND btrim(memory) = ANY($2) \
             ORDER BY created_at DESC NULLS LAST"
        );
    }

    #[test]
    fn test_search_query() {
        let query = ProductQuery {
            search: Some("surface".into()),
            ..Default::default()
        };
        assert_eq!(
            where_clause(&query),
            " FROM products WHERE (name ILIKE $1 OR sku ILIKE $2) \
             ORDER BY created_at DESC NULLS LAST"
        );
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("x1"), "x1");
    }
}
