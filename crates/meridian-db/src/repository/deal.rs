//! # Deal Repository
//!
//! Database operations for the sales pipeline.
//!
//! The `quotation_status` mirror column on deals is *not* written here.
//! Only the quotation repository touches it, inside the same transaction
//! as the quotation write it mirrors.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use meridian_core::{Deal, DealStage};

/// Input for creating a deal. The id, deal number, and timestamps are
/// generated by the repository.
#[derive(Debug, Clone)]
pub struct NewDeal {
    pub customer_name: String,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub address: Option<String>,
    pub oem: Option<String>,
    pub expected_revenue_paise: i64,
    pub expected_margin_paise: Option<i64>,
    pub stage: DealStage,
    pub assigned_to: String,
}

/// Repository for deal database operations.
#[derive(Debug, Clone)]
pub struct DealRepository {
    pool: SqlitePool,
}

impl DealRepository {
    /// Creates a new DealRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DealRepository { pool }
    }

    /// Creates a new deal with a generated `OPP-YYMMDD-NNNN` number.
    pub async fn create(&self, input: NewDeal) -> DbResult<Deal> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let deal_number = self.next_deal_number().await?;

        debug!(id = %id, deal_number = %deal_number, "Creating deal");

        let deal = Deal {
            id: id.clone(),
            deal_number,
            customer_name: input.customer_name,
            contact_name: input.contact_name,
            contact_email: input.contact_email,
            contact_phone: input.contact_phone,
            address: input.address,
            oem: input.oem,
            expected_revenue_paise: input.expected_revenue_paise,
            expected_margin_paise: input.expected_margin_paise,
            stage: input.stage,
            assigned_to: input.assigned_to,
            quotation_status: None,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO deals (
                id, deal_number, customer_name, contact_name, contact_email,
                contact_phone, address, oem,
                expected_revenue_paise, expected_margin_paise,
                stage, assigned_to, quotation_status,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
        )
        .bind(&deal.id)
        .bind(&deal.deal_number)
        .bind(&deal.customer_name)
        .bind(&deal.contact_name)
        .bind(&deal.contact_email)
        .bind(&deal.contact_phone)
        .bind(&deal.address)
        .bind(&deal.oem)
        .bind(deal.expected_revenue_paise)
        .bind(deal.expected_margin_paise)
        .bind(deal.stage)
        .bind(&deal.assigned_to)
        .bind(deal.quotation_status)
        .bind(deal.created_at)
        .bind(deal.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(deal)
    }

    /// Gets a deal by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Deal>> {
        let deal = sqlx::query_as::<_, Deal>(
            r#"
            SELECT
                id, deal_number, customer_name, contact_name, contact_email,
                contact_phone, address, oem,
                expected_revenue_paise, expected_margin_paise,
                stage, assigned_to, quotation_status,
                created_at, updated_at
            FROM deals
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(deal)
    }

    /// Lists deals, optionally filtered by stage and/or assignee.
    /// Newest first.
    pub async fn list(
        &self,
        stage: Option<DealStage>,
        assigned_to: Option<&str>,
    ) -> DbResult<Vec<Deal>> {
        let deals = sqlx::query_as::<_, Deal>(
            r#"
            SELECT
                id, deal_number, customer_name, contact_name, contact_email,
                contact_phone, address, oem,
                expected_revenue_paise, expected_margin_paise,
                stage, assigned_to, quotation_status,
                created_at, updated_at
            FROM deals
            WHERE (?1 IS NULL OR stage = ?1)
              AND (?2 IS NULL OR assigned_to = ?2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(stage)
        .bind(assigned_to)
        .fetch_all(&self.pool)
        .await?;

        Ok(deals)
    }

    /// Moves a deal to a new pipeline stage.
    pub async fn update_stage(&self, id: &str, stage: DealStage) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE deals SET stage = ?2, updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(stage)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Deal", id));
        }

        Ok(())
    }

    /// Generates the next deal number for today: `OPP-YYMMDD-NNNN`.
    ///
    /// NNNN is a per-day counter derived from the count of today's deals.
    /// A collision under concurrent inserts trips the UNIQUE constraint and
    /// surfaces as a retryable error rather than a silent duplicate.
    async fn next_deal_number(&self) -> DbResult<String> {
        let date_part = Utc::now().format("%y%m%d").to_string();
        let prefix = format!("OPP-{}-%", date_part);

        let today: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM deals WHERE deal_number LIKE ?1
            "#,
        )
        .bind(&prefix)
        .fetch_one(&self.pool)
        .await?;

        Ok(format!("OPP-{}-{:04}", date_part, today + 1))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::user::{hash_password, UserRepository};
    use meridian_core::{Role, User};

    async fn setup() -> (Database, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let user = User {
            id: Uuid::new_v4().to_string(),
            name: "Priya".to_string(),
            email: "priya@example.com".to_string(),
            password_hash: hash_password("secret").unwrap(),
            role: Role::Salesperson,
            created_at: Utc::now(),
        };
        UserRepository::new(db.pool().clone())
            .insert(&user)
            .await
            .unwrap();

        (db, user.id)
    }

    fn new_deal(assigned_to: &str) -> NewDeal {
        NewDeal {
            customer_name: "Acme Industries".to_string(),
            contact_name: Some("R. Mehta".to_string()),
            contact_email: None,
            contact_phone: None,
            address: None,
            oem: Some("Cisco".to_string()),
            expected_revenue_paise: 50_000_000,
            expected_margin_paise: None,
            stage: DealStage::New,
            assigned_to: assigned_to.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_fetch_deal() {
        let (db, user_id) = setup().await;
        let repo = db.deals();

        let created = repo.create(new_deal(&user_id)).await.unwrap();
        assert!(created.deal_number.starts_with("OPP-"));
        assert!(created.deal_number.ends_with("-0001"));
        assert_eq!(created.quotation_status, None);

        let fetched = repo.get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.customer_name, "Acme Industries");
        assert_eq!(fetched.stage, DealStage::New);
    }

    #[tokio::test]
    async fn test_deal_numbers_increment_within_a_day() {
        let (db, user_id) = setup().await;
        let repo = db.deals();

        let first = repo.create(new_deal(&user_id)).await.unwrap();
        let second = repo.create(new_deal(&user_id)).await.unwrap();

        assert!(first.deal_number.ends_with("-0001"));
        assert!(second.deal_number.ends_with("-0002"));
    }

    #[tokio::test]
    async fn test_list_filters_by_stage() {
        let (db, user_id) = setup().await;
        let repo = db.deals();

        let deal = repo.create(new_deal(&user_id)).await.unwrap();
        repo.update_stage(&deal.id, DealStage::Qualified).await.unwrap();
        repo.create(new_deal(&user_id)).await.unwrap();

        let qualified = repo.list(Some(DealStage::Qualified), None).await.unwrap();
        assert_eq!(qualified.len(), 1);
        assert_eq!(qualified[0].id, deal.id);

        let all = repo.list(None, None).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_update_stage_missing_deal() {
        let (db, _user_id) = setup().await;
        let err = db
            .deals()
            .update_stage("no-such-id", DealStage::Won)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
