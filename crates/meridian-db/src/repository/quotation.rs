//! # Quotation Repository
//!
//! Database operations for quotations and their line items.
//!
//! ## Quotation Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Quotation Lifecycle                                │
//! │                                                                         │
//! │  1. REQUEST (salesperson)                                              │
//! │     └── insert_request() → Quotation { status: Pending }               │
//! │         └── same tx: deals.quotation_status = 'pending'                │
//! │                                                                         │
//! │  2. APPROVE (admin)                                                    │
//! │     └── store_approval() → status: Approved, totals recomputed         │
//! │         └── same tx: items replaced, deals.quotation_status mirrored   │
//! │                                                                         │
//! │  3. (OR) REJECT (admin)                                                │
//! │     └── store_rejection() → status: Rejected                           │
//! │         └── same tx: deals.quotation_status mirrored                   │
//! │                                                                         │
//! │  4. SET MARGIN (salesperson, post-approval)                            │
//! │     └── set_margin() → margin recorded; items untouched                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every transition writes the quotation row and the parent deal's
//! `quotation_status` mirror in one transaction, so the mirror can never
//! drift from the quotation itself.

use chrono::{NaiveDate, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;

use crate::error::{DbError, DbResult};
use meridian_core::{MarginType, Quotation, QuotationItem, QuotationStatus};

const QUOTATION_COLUMNS: &str = r#"
    id, deal_id, requested_by, approved_by, status,
    freight_charges_paise, freight_gst_rate, freight_gst_amount_paise,
    installation_charges_paise, installation_gst_rate, installation_gst_amount_paise,
    margin_type, margin_value, amount_paise, is_read,
    remarks_for_admin, remarks_for_salesperson, valid_until,
    created_at, updated_at
"#;

/// Repository for quotation database operations.
#[derive(Debug, Clone)]
pub struct QuotationRepository {
    pool: SqlitePool,
}

impl QuotationRepository {
    /// Creates a new QuotationRepository.
    pub fn new(pool: SqlitePool) -> Self {
        QuotationRepository { pool }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Gets a quotation by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Quotation>> {
        let quotation = sqlx::query_as::<_, Quotation>(&format!(
            "SELECT {} FROM quotations WHERE id = ?1",
            QUOTATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(quotation)
    }

    /// Gets all items for a quotation, in position order.
    pub async fn get_items(&self, quotation_id: &str) -> DbResult<Vec<QuotationItem>> {
        let items = sqlx::query_as::<_, QuotationItem>(
            r#"
            SELECT
                id, quotation_id, position, product_name, description, brand, model,
                quantity, unit_price_paise, target_price_paise,
                gst_rate, gst_amount_paise, total_paise
            FROM quotation_items
            WHERE quotation_id = ?1
            ORDER BY position
            "#,
        )
        .bind(quotation_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists quotations, optionally filtered by status. Newest first.
    pub async fn list(&self, status: Option<QuotationStatus>) -> DbResult<Vec<Quotation>> {
        let quotations = sqlx::query_as::<_, Quotation>(&format!(
            r#"
            SELECT {} FROM quotations
            WHERE (?1 IS NULL OR status = ?1)
            ORDER BY created_at DESC
            "#,
            QUOTATION_COLUMNS
        ))
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(quotations)
    }

    /// Lists all quotations for a deal. Newest first.
    pub async fn list_for_deal(&self, deal_id: &str) -> DbResult<Vec<Quotation>> {
        let quotations = sqlx::query_as::<_, Quotation>(&format!(
            r#"
            SELECT {} FROM quotations
            WHERE deal_id = ?1
            ORDER BY created_at DESC
            "#,
            QUOTATION_COLUMNS
        ))
        .bind(deal_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(quotations)
    }

    /// Counts quotations awaiting review (admin dashboard).
    pub async fn pending_count(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM quotations WHERE status = 'pending'")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Lists a salesperson's approved-but-unread quotations (notifications).
    pub async fn unread_approved_for(&self, user_id: &str) -> DbResult<Vec<Quotation>> {
        let quotations = sqlx::query_as::<_, Quotation>(&format!(
            r#"
            SELECT {} FROM quotations
            WHERE requested_by = ?1 AND status = 'approved' AND is_read = 0
            ORDER BY updated_at DESC
            "#,
            QUOTATION_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(quotations)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Persists a freshly requested quotation with its items and flags the
    /// parent deal as pending, all in one transaction.
    pub async fn insert_request(
        &self,
        quotation: &Quotation,
        items: &[QuotationItem],
    ) -> DbResult<()> {
        debug!(id = %quotation.id, deal_id = %quotation.deal_id, items = items.len(),
            "Inserting quotation request");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO quotations (
                id, deal_id, requested_by, approved_by, status,
                freight_charges_paise, freight_gst_rate, freight_gst_amount_paise,
                installation_charges_paise, installation_gst_rate, installation_gst_amount_paise,
                margin_type, margin_value, amount_paise, is_read,
                remarks_for_admin, remarks_for_salesperson, valid_until,
                created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8,
                ?9, ?10, ?11,
                ?12, ?13, ?14, ?15,
                ?16, ?17, ?18,
                ?19, ?20
            )
            "#,
        )
        .bind(&quotation.id)
        .bind(&quotation.deal_id)
        .bind(&quotation.requested_by)
        .bind(&quotation.approved_by)
        .bind(quotation.status)
        .bind(quotation.freight_charges_paise)
        .bind(quotation.freight_gst_rate)
        .bind(quotation.freight_gst_amount_paise)
        .bind(quotation.installation_charges_paise)
        .bind(quotation.installation_gst_rate)
        .bind(quotation.installation_gst_amount_paise)
        .bind(quotation.margin_type)
        .bind(quotation.margin_value)
        .bind(quotation.amount_paise)
        .bind(quotation.is_read)
        .bind(&quotation.remarks_for_admin)
        .bind(&quotation.remarks_for_salesperson)
        .bind(quotation.valid_until)
        .bind(quotation.created_at)
        .bind(quotation.updated_at)
        .execute(&mut *tx)
        .await?;

        insert_items(&mut tx, items).await?;
        mirror_deal_status(&mut tx, &quotation.deal_id, QuotationStatus::Pending).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Persists an approval: updated header fields, recomputed items, and the
    /// deal mirror, in one transaction.
    ///
    /// The caller (workflow) has already recomputed item totals and the
    /// approval-time amount, and has already resolved target-price
    /// preservation; this method only makes it durable.
    pub async fn store_approval(
        &self,
        quotation: &Quotation,
        items: &[QuotationItem],
    ) -> DbResult<()> {
        debug!(id = %quotation.id, amount = quotation.amount_paise, "Storing approval");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE quotations SET
                status = ?2,
                approved_by = ?3,
                freight_charges_paise = ?4,
                freight_gst_rate = ?5,
                freight_gst_amount_paise = ?6,
                installation_charges_paise = ?7,
                installation_gst_rate = ?8,
                installation_gst_amount_paise = ?9,
                amount_paise = ?10,
                is_read = 0,
                remarks_for_salesperson = ?11,
                valid_until = ?12,
                updated_at = ?13
            WHERE id = ?1
            "#,
        )
        .bind(&quotation.id)
        .bind(quotation.status)
        .bind(&quotation.approved_by)
        .bind(quotation.freight_charges_paise)
        .bind(quotation.freight_gst_rate)
        .bind(quotation.freight_gst_amount_paise)
        .bind(quotation.installation_charges_paise)
        .bind(quotation.installation_gst_rate)
        .bind(quotation.installation_gst_amount_paise)
        .bind(quotation.amount_paise)
        .bind(&quotation.remarks_for_salesperson)
        .bind(quotation.valid_until)
        .bind(quotation.updated_at)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Quotation", &quotation.id));
        }

        replace_items(&mut tx, &quotation.id, items).await?;
        mirror_deal_status(&mut tx, &quotation.deal_id, QuotationStatus::Approved).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Persists a rejection and the deal mirror in one transaction.
    pub async fn store_rejection(
        &self,
        id: &str,
        deal_id: &str,
        remarks_for_salesperson: Option<&str>,
    ) -> DbResult<()> {
        debug!(id = %id, "Storing rejection");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE quotations SET
                status = 'rejected',
                is_read = 0,
                remarks_for_salesperson = COALESCE(?2, remarks_for_salesperson),
                updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(remarks_for_salesperson)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Quotation", id));
        }

        mirror_deal_status(&mut tx, deal_id, QuotationStatus::Rejected).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Replaces the items and editable header fields of a pending quotation.
    ///
    /// The `status = 'pending'` guard makes the pending-only rule hold even
    /// if a transition landed between the workflow's check and this write.
    pub async fn update_pending(
        &self,
        id: &str,
        items: &[QuotationItem],
        remarks_for_admin: Option<&str>,
        valid_until: Option<NaiveDate>,
    ) -> DbResult<()> {
        debug!(id = %id, items = items.len(), "Updating pending quotation");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE quotations SET
                remarks_for_admin = ?2,
                valid_until = ?3,
                updated_at = ?4
            WHERE id = ?1 AND status = 'pending'
            "#,
        )
        .bind(id)
        .bind(remarks_for_admin)
        .bind(valid_until)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Quotation (pending)", id));
        }

        replace_items(&mut tx, id, items).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Records the salesperson's margin on an approved quotation.
    pub async fn set_margin(
        &self,
        id: &str,
        margin_type: MarginType,
        margin_value: i64,
    ) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE quotations SET
                margin_type = ?2,
                margin_value = ?3,
                updated_at = ?4
            WHERE id = ?1 AND status = 'approved'
            "#,
        )
        .bind(id)
        .bind(margin_type)
        .bind(margin_value)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Quotation (approved)", id));
        }

        Ok(())
    }

    /// Bulk-marks a salesperson's approved quotations as read.
    ///
    /// The update is scoped by `requested_by`, so ids belonging to someone
    /// else silently no-op. Returns the number of rows actually flipped.
    pub async fn mark_read(&self, ids: &[String], user_id: &str) -> DbResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        // sqlx has no array binding for SQLite; build the placeholder list.
        let placeholders = (2..ids.len() + 2)
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            r#"
            UPDATE quotations SET is_read = 1
            WHERE requested_by = ?1 AND status = 'approved' AND id IN ({})
            "#,
            placeholders
        );

        let mut query = sqlx::query(&sql).bind(user_id);
        for id in ids {
            query = query.bind(id);
        }

        let result = query.execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

/// Inserts quotation items inside an open transaction.
async fn insert_items(
    tx: &mut Transaction<'_, Sqlite>,
    items: &[QuotationItem],
) -> DbResult<()> {
    for item in items {
        sqlx::query(
            r#"
            INSERT INTO quotation_items (
                id, quotation_id, position, product_name, description, brand, model,
                quantity, unit_price_paise, target_price_paise,
                gst_rate, gst_amount_paise, total_paise
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&item.id)
        .bind(&item.quotation_id)
        .bind(item.position)
        .bind(&item.product_name)
        .bind(&item.description)
        .bind(&item.brand)
        .bind(&item.model)
        .bind(item.quantity)
        .bind(item.unit_price_paise)
        .bind(item.target_price_paise)
        .bind(item.gst_rate)
        .bind(item.gst_amount_paise)
        .bind(item.total_paise)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

/// Deletes and re-inserts a quotation's items inside an open transaction.
async fn replace_items(
    tx: &mut Transaction<'_, Sqlite>,
    quotation_id: &str,
    items: &[QuotationItem],
) -> DbResult<()> {
    sqlx::query("DELETE FROM quotation_items WHERE quotation_id = ?1")
        .bind(quotation_id)
        .execute(&mut **tx)
        .await?;

    insert_items(tx, items).await
}

/// Mirrors the quotation status onto the parent deal inside an open
/// transaction. This is the only place the mirror column is written.
async fn mirror_deal_status(
    tx: &mut Transaction<'_, Sqlite>,
    deal_id: &str,
    status: QuotationStatus,
) -> DbResult<()> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        UPDATE deals SET quotation_status = ?2, updated_at = ?3
        WHERE id = ?1
        "#,
    )
    .bind(deal_id)
    .bind(status)
    .bind(now)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Deal", deal_id));
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::deal::NewDeal;
    use crate::repository::user::hash_password;
    use meridian_core::{DealStage, GstRate, Role, User};
    use uuid::Uuid;

    async fn setup() -> (Database, String, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let sales = User {
            id: Uuid::new_v4().to_string(),
            name: "Priya".to_string(),
            email: "priya@example.com".to_string(),
            password_hash: hash_password("secret").unwrap(),
            role: Role::Salesperson,
            created_at: Utc::now(),
        };
        db.users().insert(&sales).await.unwrap();

        let deal = db
            .deals()
            .create(NewDeal {
                customer_name: "Acme Industries".to_string(),
                contact_name: None,
                contact_email: None,
                contact_phone: None,
                address: None,
                oem: None,
                expected_revenue_paise: 0,
                expected_margin_paise: None,
                stage: DealStage::New,
                assigned_to: sales.id.clone(),
            })
            .await
            .unwrap();

        (db, sales.id, deal.id)
    }

    fn pending_quotation(deal_id: &str, requested_by: &str) -> Quotation {
        let now = Utc::now();
        Quotation {
            id: Uuid::new_v4().to_string(),
            deal_id: deal_id.to_string(),
            requested_by: requested_by.to_string(),
            approved_by: None,
            status: QuotationStatus::Pending,
            freight_charges_paise: 0,
            freight_gst_rate: GstRate::Zero,
            freight_gst_amount_paise: 0,
            installation_charges_paise: 0,
            installation_gst_rate: GstRate::Zero,
            installation_gst_amount_paise: 0,
            margin_type: None,
            margin_value: 0,
            amount_paise: 0,
            is_read: false,
            remarks_for_admin: None,
            remarks_for_salesperson: None,
            valid_until: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn item(quotation_id: &str, position: i64, price: i64) -> QuotationItem {
        QuotationItem {
            id: Uuid::new_v4().to_string(),
            quotation_id: quotation_id.to_string(),
            position,
            product_name: format!("Product {}", position),
            description: None,
            brand: None,
            model: None,
            quantity: 1,
            unit_price_paise: price,
            target_price_paise: price,
            gst_rate: GstRate::Eighteen,
            gst_amount_paise: 0,
            total_paise: 0,
        }
    }

    #[tokio::test]
    async fn test_request_mirrors_deal_status() {
        let (db, sales_id, deal_id) = setup().await;
        let repo = db.quotations();

        let q = pending_quotation(&deal_id, &sales_id);
        let items = vec![item(&q.id, 0, 100_000)];
        repo.insert_request(&q, &items).await.unwrap();

        let deal = db.deals().get_by_id(&deal_id).await.unwrap().unwrap();
        assert_eq!(deal.quotation_status, Some(QuotationStatus::Pending));

        let stored = repo.get_by_id(&q.id).await.unwrap().unwrap();
        assert_eq!(stored.status, QuotationStatus::Pending);
        assert_eq!(repo.get_items(&q.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_request_against_missing_deal_rolls_back() {
        let (db, sales_id, deal_id) = setup().await;
        let repo = db.quotations();

        let mut q = pending_quotation(&deal_id, &sales_id);
        q.deal_id = Uuid::new_v4().to_string(); // no such deal

        let err = repo.insert_request(&q, &[]).await.unwrap_err();
        // FK on quotations.deal_id fires before the mirror update
        assert!(matches!(
            err,
            DbError::ForeignKeyViolation { .. } | DbError::NotFound { .. }
        ));
        assert!(repo.get_by_id(&q.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rejection_clears_read_flag_and_mirrors() {
        let (db, sales_id, deal_id) = setup().await;
        let repo = db.quotations();

        let q = pending_quotation(&deal_id, &sales_id);
        repo.insert_request(&q, &[item(&q.id, 0, 100_000)])
            .await
            .unwrap();

        repo.store_rejection(&q.id, &deal_id, Some("Price too low"))
            .await
            .unwrap();

        let stored = repo.get_by_id(&q.id).await.unwrap().unwrap();
        assert_eq!(stored.status, QuotationStatus::Rejected);
        assert!(!stored.is_read);
        assert_eq!(stored.remarks_for_salesperson.as_deref(), Some("Price too low"));

        let deal = db.deals().get_by_id(&deal_id).await.unwrap().unwrap();
        assert_eq!(deal.quotation_status, Some(QuotationStatus::Rejected));
    }

    #[tokio::test]
    async fn test_mark_read_is_scoped_to_owner() {
        let (db, sales_id, deal_id) = setup().await;
        let repo = db.quotations();

        // Persist directly in approved state; mark_read only touches approved rows
        let mut q = pending_quotation(&deal_id, &sales_id);
        q.status = QuotationStatus::Approved;
        repo.insert_request(&q, &[item(&q.id, 0, 100_000)])
            .await
            .unwrap();

        let flipped = repo.mark_read(&[q.id.clone()], "someone-else").await.unwrap();
        assert_eq!(flipped, 0);

        let flipped = repo.mark_read(&[q.id.clone()], &sales_id).await.unwrap();
        assert_eq!(flipped, 1);

        let stored = repo.get_by_id(&q.id).await.unwrap().unwrap();
        assert!(stored.is_read);
    }

    #[tokio::test]
    async fn test_set_margin_requires_approved_row() {
        let (db, sales_id, deal_id) = setup().await;
        let repo = db.quotations();

        let q = pending_quotation(&deal_id, &sales_id);
        repo.insert_request(&q, &[item(&q.id, 0, 100_000)])
            .await
            .unwrap();

        let err = repo
            .set_margin(&q.id, MarginType::Percentage, 2_000)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
