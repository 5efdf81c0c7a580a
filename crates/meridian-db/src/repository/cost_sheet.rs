//! # Cost Sheet Repository
//!
//! Database operations for versioned cost sheets.
//!
//! ## Versioning
//! ```text
//! save(deal, draft, create_new_version = false)
//!      └── mutate the current is_latest row in place
//!
//! save(deal, draft, create_new_version = true)
//!      └── SINGLE TRANSACTION:
//!          1. UPDATE cost_sheets SET is_latest = 0 WHERE id = <old latest>
//!          2. INSERT new row with version + 1, is_latest = 1
//!
//! Old versions are never deleted.
//! ```
//!
//! Line collections (products, manpower, custom charges) are stored as JSON
//! arrays; the scalar and computed fields stay relational so version lists
//! stay cheap to query.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use meridian_core::costsheet::{
    CostSheet, CostSummary, CustomCharge, ManpowerCost, Overheads, ProductCost,
};

/// The caller-supplied content of a cost sheet save: inputs plus the
/// already-computed summary. Versioning fields are repository-owned.
#[derive(Debug, Clone)]
pub struct CostSheetDraft {
    pub revenue_paise: i64,
    pub products: Vec<ProductCost>,
    pub manpower: Vec<ManpowerCost>,
    pub overheads: Overheads,
    pub custom_charges: Vec<CustomCharge>,
    pub summary: CostSummary,
}

/// Repository for cost sheet database operations.
#[derive(Debug, Clone)]
pub struct CostSheetRepository {
    pool: SqlitePool,
}

impl CostSheetRepository {
    /// Creates a new CostSheetRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CostSheetRepository { pool }
    }

    /// Gets the latest cost sheet version for a deal.
    pub async fn get_latest(&self, deal_id: &str) -> DbResult<Option<CostSheet>> {
        let record = sqlx::query_as::<_, CostSheetRecord>(&format!(
            "SELECT {} FROM cost_sheets WHERE deal_id = ?1 AND is_latest = 1",
            COST_SHEET_COLUMNS
        ))
        .bind(deal_id)
        .fetch_optional(&self.pool)
        .await?;

        record.map(CostSheetRecord::into_domain).transpose()
    }

    /// Lists all cost sheet versions for a deal, newest version first.
    pub async fn list_versions(&self, deal_id: &str) -> DbResult<Vec<CostSheet>> {
        let records = sqlx::query_as::<_, CostSheetRecord>(&format!(
            "SELECT {} FROM cost_sheets WHERE deal_id = ?1 ORDER BY version DESC",
            COST_SHEET_COLUMNS
        ))
        .bind(deal_id)
        .fetch_all(&self.pool)
        .await?;

        records
            .into_iter()
            .map(CostSheetRecord::into_domain)
            .collect()
    }

    /// Saves a cost sheet for a deal.
    ///
    /// - First save for a deal: inserts version 1.
    /// - `create_new_version = false`: mutates the current latest in place.
    /// - `create_new_version = true`: clones into version + 1 and clears the
    ///   predecessor's `is_latest`, in one transaction.
    pub async fn save(
        &self,
        deal_id: &str,
        draft: CostSheetDraft,
        create_new_version: bool,
    ) -> DbResult<CostSheet> {
        let now = Utc::now();
        let latest = self.get_latest(deal_id).await?;

        match latest {
            None => {
                let sheet = draft.into_sheet(deal_id, 1, now, now);
                debug!(deal_id = %deal_id, "Creating cost sheet v1");
                self.insert(&sheet, None).await?;
                Ok(sheet)
            }
            Some(current) if !create_new_version => {
                let mut sheet = draft.into_sheet(deal_id, current.version, current.created_at, now);
                sheet.id = current.id;
                debug!(deal_id = %deal_id, version = sheet.version, "Updating cost sheet in place");
                self.update_in_place(&sheet).await?;
                Ok(sheet)
            }
            Some(current) => {
                let sheet = draft.into_sheet(deal_id, current.version + 1, now, now);
                debug!(deal_id = %deal_id, version = sheet.version, "Branching cost sheet version");
                self.insert(&sheet, Some(&current.id)).await?;
                Ok(sheet)
            }
        }
    }

    /// Inserts a new version; when `supersedes` is given, clears the old
    /// row's `is_latest` in the same transaction.
    async fn insert(&self, sheet: &CostSheet, supersedes: Option<&str>) -> DbResult<()> {
        let products = serde_json::to_string(&sheet.products)?;
        let manpower = serde_json::to_string(&sheet.manpower)?;
        let custom_charges = serde_json::to_string(&sheet.custom_charges)?;

        let mut tx = self.pool.begin().await?;

        if let Some(old_id) = supersedes {
            sqlx::query("UPDATE cost_sheets SET is_latest = 0 WHERE id = ?1")
                .bind(old_id)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query(
            r#"
            INSERT INTO cost_sheets (
                id, deal_id, version, is_latest, revenue_paise,
                products, manpower, custom_charges,
                freight_paise, installation_paise, gst_paise, admin_overhead_bps,
                finance_paise, insurance_paise, gem_paise, misc_paise,
                product_cost_paise, manpower_cost_paise, admin_overhead_paise,
                total_project_cost_paise, net_margin_paise, net_margin_bps,
                created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, 1, ?4,
                ?5, ?6, ?7,
                ?8, ?9, ?10, ?11,
                ?12, ?13, ?14, ?15,
                ?16, ?17, ?18,
                ?19, ?20, ?21,
                ?22, ?23
            )
            "#,
        )
        .bind(&sheet.id)
        .bind(&sheet.deal_id)
        .bind(sheet.version)
        .bind(sheet.revenue_paise)
        .bind(&products)
        .bind(&manpower)
        .bind(&custom_charges)
        .bind(sheet.overheads.freight_paise)
        .bind(sheet.overheads.installation_paise)
        .bind(sheet.overheads.gst_paise)
        .bind(sheet.overheads.admin_overhead_bps as i64)
        .bind(sheet.overheads.finance_paise)
        .bind(sheet.overheads.insurance_paise)
        .bind(sheet.overheads.gem_paise)
        .bind(sheet.overheads.misc_paise)
        .bind(sheet.summary.product_cost_paise)
        .bind(sheet.summary.manpower_cost_paise)
        .bind(sheet.summary.admin_overhead_paise)
        .bind(sheet.summary.total_project_cost_paise)
        .bind(sheet.summary.net_margin_paise)
        .bind(sheet.summary.net_margin_bps)
        .bind(sheet.created_at)
        .bind(sheet.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Overwrites the current latest version's content.
    async fn update_in_place(&self, sheet: &CostSheet) -> DbResult<()> {
        let products = serde_json::to_string(&sheet.products)?;
        let manpower = serde_json::to_string(&sheet.manpower)?;
        let custom_charges = serde_json::to_string(&sheet.custom_charges)?;

        sqlx::query(
            r#"
            UPDATE cost_sheets SET
                revenue_paise = ?2,
                products = ?3,
                manpower = ?4,
                custom_charges = ?5,
                freight_paise = ?6,
                installation_paise = ?7,
                gst_paise = ?8,
                admin_overhead_bps = ?9,
                finance_paise = ?10,
                insurance_paise = ?11,
                gem_paise = ?12,
                misc_paise = ?13,
                product_cost_paise = ?14,
                manpower_cost_paise = ?15,
                admin_overhead_paise = ?16,
                total_project_cost_paise = ?17,
                net_margin_paise = ?18,
                net_margin_bps = ?19,
                updated_at = ?20
            WHERE id = ?1
            "#,
        )
        .bind(&sheet.id)
        .bind(sheet.revenue_paise)
        .bind(&products)
        .bind(&manpower)
        .bind(&custom_charges)
        .bind(sheet.overheads.freight_paise)
        .bind(sheet.overheads.installation_paise)
        .bind(sheet.overheads.gst_paise)
        .bind(sheet.overheads.admin_overhead_bps as i64)
        .bind(sheet.overheads.finance_paise)
        .bind(sheet.overheads.insurance_paise)
        .bind(sheet.overheads.gem_paise)
        .bind(sheet.overheads.misc_paise)
        .bind(sheet.summary.product_cost_paise)
        .bind(sheet.summary.manpower_cost_paise)
        .bind(sheet.summary.admin_overhead_paise)
        .bind(sheet.summary.total_project_cost_paise)
        .bind(sheet.summary.net_margin_paise)
        .bind(sheet.summary.net_margin_bps)
        .bind(sheet.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

impl CostSheetDraft {
    fn into_sheet(
        self,
        deal_id: &str,
        version: i64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> CostSheet {
        CostSheet {
            id: Uuid::new_v4().to_string(),
            deal_id: deal_id.to_string(),
            version,
            is_latest: true,
            revenue_paise: self.revenue_paise,
            products: self.products,
            manpower: self.manpower,
            overheads: self.overheads,
            custom_charges: self.custom_charges,
            summary: self.summary,
            created_at,
            updated_at,
        }
    }
}

// =============================================================================
// Record Type
// =============================================================================

const COST_SHEET_COLUMNS: &str = r#"
    id, deal_id, version, is_latest, revenue_paise,
    products, manpower, custom_charges,
    freight_paise, installation_paise, gst_paise, admin_overhead_bps,
    finance_paise, insurance_paise, gem_paise, misc_paise,
    product_cost_paise, manpower_cost_paise, admin_overhead_paise,
    total_project_cost_paise, net_margin_paise, net_margin_bps,
    created_at, updated_at
"#;

/// Raw row shape; JSON columns are parsed into the domain type.
#[derive(Debug, Clone, sqlx::FromRow)]
struct CostSheetRecord {
    id: String,
    deal_id: String,
    version: i64,
    is_latest: bool,
    revenue_paise: i64,
    products: String,
    manpower: String,
    custom_charges: String,
    freight_paise: i64,
    installation_paise: i64,
    gst_paise: i64,
    admin_overhead_bps: i64,
    finance_paise: i64,
    insurance_paise: i64,
    gem_paise: i64,
    misc_paise: i64,
    product_cost_paise: i64,
    manpower_cost_paise: i64,
    admin_overhead_paise: i64,
    total_project_cost_paise: i64,
    net_margin_paise: i64,
    net_margin_bps: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CostSheetRecord {
    fn into_domain(self) -> DbResult<CostSheet> {
        Ok(CostSheet {
            id: self.id,
            deal_id: self.deal_id,
            version: self.version,
            is_latest: self.is_latest,
            revenue_paise: self.revenue_paise,
            products: serde_json::from_str(&self.products)?,
            manpower: serde_json::from_str(&self.manpower)?,
            custom_charges: serde_json::from_str(&self.custom_charges)?,
            overheads: Overheads {
                freight_paise: self.freight_paise,
                installation_paise: self.installation_paise,
                gst_paise: self.gst_paise,
                admin_overhead_bps: self.admin_overhead_bps as u32,
                finance_paise: self.finance_paise,
                insurance_paise: self.insurance_paise,
                gem_paise: self.gem_paise,
                misc_paise: self.misc_paise,
            },
            summary: CostSummary {
                product_cost_paise: self.product_cost_paise,
                manpower_cost_paise: self.manpower_cost_paise,
                admin_overhead_paise: self.admin_overhead_paise,
                total_project_cost_paise: self.total_project_cost_paise,
                net_margin_paise: self.net_margin_paise,
                net_margin_bps: self.net_margin_bps,
            },
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
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
    use meridian_core::costsheet::aggregate;
    use meridian_core::{DealStage, Money, Role, User};

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
        db.users().insert(&user).await.unwrap();

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
                assigned_to: user.id,
            })
            .await
            .unwrap();

        (db, deal.id)
    }

    fn draft(revenue_paise: i64) -> CostSheetDraft {
        let products = vec![ProductCost {
            name: "Firewall".to_string(),
            quantity: 1,
            oem_price_paise: 2_000_000,
        }];
        let overheads = Overheads::default();
        let summary = aggregate(
            Money::from_paise(revenue_paise),
            &products,
            &[],
            &overheads,
            &[],
        );
        CostSheetDraft {
            revenue_paise,
            products,
            manpower: vec![],
            overheads,
            custom_charges: vec![],
            summary,
        }
    }

    #[tokio::test]
    async fn test_first_save_creates_version_one() {
        let (db, deal_id) = setup().await;
        let repo = db.cost_sheets();

        let sheet = repo.save(&deal_id, draft(5_000_000), false).await.unwrap();
        assert_eq!(sheet.version, 1);
        assert!(sheet.is_latest);
        assert_eq!(sheet.summary.net_margin_paise, 3_000_000);

        let latest = repo.get_latest(&deal_id).await.unwrap().unwrap();
        assert_eq!(latest.id, sheet.id);
        assert_eq!(latest.products.len(), 1);
    }

    #[tokio::test]
    async fn test_save_without_flag_keeps_version() {
        let (db, deal_id) = setup().await;
        let repo = db.cost_sheets();

        let first = repo.save(&deal_id, draft(5_000_000), false).await.unwrap();
        let second = repo.save(&deal_id, draft(6_000_000), false).await.unwrap();

        assert_eq!(second.version, 1);
        assert_eq!(second.id, first.id);
        assert_eq!(repo.list_versions(&deal_id).await.unwrap().len(), 1);

        let latest = repo.get_latest(&deal_id).await.unwrap().unwrap();
        assert_eq!(latest.revenue_paise, 6_000_000);
    }

    #[tokio::test]
    async fn test_save_with_flag_branches_version() {
        let (db, deal_id) = setup().await;
        let repo = db.cost_sheets();

        let v1 = repo.save(&deal_id, draft(5_000_000), false).await.unwrap();
        let v2 = repo.save(&deal_id, draft(7_000_000), true).await.unwrap();

        assert_eq!(v2.version, 2);
        assert!(v2.is_latest);
        assert_ne!(v2.id, v1.id);

        let versions = repo.list_versions(&deal_id).await.unwrap();
        assert_eq!(versions.len(), 2);
        assert_eq!(versions[0].version, 2);
        assert!(versions[0].is_latest);
        assert_eq!(versions[1].version, 1);
        assert!(!versions[1].is_latest);

        let latest = repo.get_latest(&deal_id).await.unwrap().unwrap();
        assert_eq!(latest.version, 2);
        assert_eq!(latest.revenue_paise, 7_000_000);
    }
}
