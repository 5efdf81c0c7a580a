//! End-to-end tests for the quotation workflow against an in-memory
//! database: request → approve/reject → margin → notifications.

use chrono::Utc;
use uuid::Uuid;

use meridian_api::auth::AuthUser;
use meridian_api::dto::{
    ApproveQuotationBody, MarkReadBody, QuotationItemBody, RejectQuotationBody,
    RequestQuotationBody, SetMarginBody, UpdateQuotationBody,
};
use meridian_api::error::ErrorCode;
use meridian_api::workflow::QuotationWorkflow;
use meridian_core::{DealStage, GstRate, MarginType, QuotationStatus, Role, User};
use meridian_db::repository::deal::NewDeal;
use meridian_db::repository::user::hash_password;
use meridian_db::{Database, DbConfig};

struct Harness {
    db: Database,
    workflow: QuotationWorkflow,
    admin: AuthUser,
    sales: AuthUser,
    deal_id: String,
}

async fn harness() -> Harness {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();

    let admin_user = User {
        id: Uuid::new_v4().to_string(),
        name: "Admin".to_string(),
        email: "admin@example.com".to_string(),
        password_hash: hash_password("admin123").unwrap(),
        role: Role::Admin,
        created_at: Utc::now(),
    };
    let sales_user = User {
        id: Uuid::new_v4().to_string(),
        name: "Priya".to_string(),
        email: "priya@example.com".to_string(),
        password_hash: hash_password("sales123").unwrap(),
        role: Role::Salesperson,
        created_at: Utc::now(),
    };
    db.users().insert(&admin_user).await.unwrap();
    db.users().insert(&sales_user).await.unwrap();

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
            stage: DealStage::Proposition,
            assigned_to: sales_user.id.clone(),
        })
        .await
        .unwrap();

    Harness {
        workflow: QuotationWorkflow::new(db.clone()),
        db,
        admin: AuthUser {
            id: admin_user.id,
            name: admin_user.name,
            role: Role::Admin,
        },
        sales: AuthUser {
            id: sales_user.id,
            name: sales_user.name,
            role: Role::Salesperson,
        },
        deal_id: deal.id,
    }
}

fn laptop_item(unit_price_paise: i64) -> QuotationItemBody {
    QuotationItemBody {
        product_name: "Laptop".to_string(),
        description: Some("14-inch business laptop".to_string()),
        brand: Some("Lenovo".to_string()),
        model: Some("T14".to_string()),
        quantity: 2,
        unit_price_paise,
        gst_rate: GstRate::Eighteen,
    }
}

fn request_body(deal_id: &str) -> RequestQuotationBody {
    RequestQuotationBody {
        deal_id: deal_id.to_string(),
        items: vec![laptop_item(5_000_000)],
        remarks_for_admin: Some("Urgent, customer waiting".to_string()),
        valid_until: None,
    }
}

fn approve_body(items: Vec<QuotationItemBody>) -> ApproveQuotationBody {
    ApproveQuotationBody {
        items,
        freight_charges_paise: 100_000,
        freight_gst_rate: GstRate::Five,
        installation_charges_paise: 0,
        installation_gst_rate: GstRate::Zero,
        remarks_for_salesperson: None,
        valid_until: None,
    }
}

#[tokio::test]
async fn laptop_scenario_totals() {
    let h = harness().await;

    let detail = h
        .workflow
        .request(&h.sales, request_body(&h.deal_id))
        .await
        .unwrap();
    assert_eq!(detail.quotation.status, QuotationStatus::Pending);
    assert_eq!(detail.quotation.amount_paise, 0);
    assert_eq!(detail.items[0].item.total_paise, 0);

    let approved = h
        .workflow
        .approve(&h.admin, &detail.quotation.id, approve_body(vec![laptop_item(5_000_000)]))
        .await
        .unwrap();

    // 2 × ₹50,000 × 1.18 = ₹1,18,000; freight ₹1,000 × 1.05 = ₹1,050
    assert_eq!(approved.items[0].item.total_paise, 11_800_000);
    assert_eq!(approved.quotation.freight_gst_amount_paise, 5_000);
    assert_eq!(approved.quotation.amount_paise, 11_905_000);
    assert_eq!(approved.totals.grand_total_paise, 11_905_000);
    assert_eq!(approved.quotation.status, QuotationStatus::Approved);
    assert_eq!(approved.quotation.approved_by.as_deref(), Some(h.admin.id.as_str()));
    assert!(!approved.quotation.is_read);

    // Deal mirror updated in the same transaction
    let deal = h.db.deals().get_by_id(&h.deal_id).await.unwrap().unwrap();
    assert_eq!(deal.quotation_status, Some(QuotationStatus::Approved));
}

#[tokio::test]
async fn target_price_survives_admin_edits() {
    let h = harness().await;

    let detail = h
        .workflow
        .request(&h.sales, request_body(&h.deal_id))
        .await
        .unwrap();

    // Admin bumps the vendor price from 50,000 to 55,000
    let approved = h
        .workflow
        .approve(&h.admin, &detail.quotation.id, approve_body(vec![laptop_item(5_500_000)]))
        .await
        .unwrap();

    assert_eq!(approved.items[0].item.unit_price_paise, 5_500_000);
    assert_eq!(approved.items[0].item.target_price_paise, 5_000_000);
}

#[tokio::test]
async fn admin_added_item_uses_own_price_as_target() {
    let h = harness().await;

    let detail = h
        .workflow
        .request(&h.sales, request_body(&h.deal_id))
        .await
        .unwrap();

    let mut items = vec![laptop_item(5_000_000)];
    items.push(QuotationItemBody {
        product_name: "Docking station".to_string(),
        description: None,
        brand: None,
        model: None,
        quantity: 2,
        unit_price_paise: 800_000,
        gst_rate: GstRate::Eighteen,
    });

    let approved = h
        .workflow
        .approve(&h.admin, &detail.quotation.id, approve_body(items))
        .await
        .unwrap();

    assert_eq!(approved.items.len(), 2);
    assert_eq!(approved.items[1].item.target_price_paise, 800_000);
}

#[tokio::test]
async fn margin_requires_approval_then_derives_client_prices() {
    let h = harness().await;

    let detail = h
        .workflow
        .request(&h.sales, request_body(&h.deal_id))
        .await
        .unwrap();
    let id = detail.quotation.id.clone();

    // Margin on a pending quotation is a domain conflict
    let err = h
        .workflow
        .set_margin(
            &h.sales,
            &id,
            SetMarginBody {
                margin_type: MarginType::Percentage,
                margin_value: 2_000,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::DomainConflict);

    h.workflow
        .approve(&h.admin, &id, approve_body(vec![laptop_item(5_000_000)]))
        .await
        .unwrap();

    // 20% margin after approval
    let with_margin = h
        .workflow
        .set_margin(
            &h.sales,
            &id,
            SetMarginBody {
                margin_type: MarginType::Percentage,
                margin_value: 2_000,
            },
        )
        .await
        .unwrap();

    // Stored vendor price untouched; client price derived at read time
    assert_eq!(with_margin.items[0].item.unit_price_paise, 5_000_000);
    assert_eq!(with_margin.items[0].client_unit_price_paise, 6_000_000);
    // 2 × ₹60,000 × 1.18 = ₹1,41,600 + freight ₹1,050
    assert_eq!(with_margin.items[0].client_total_paise, 14_160_000);
    assert_eq!(with_margin.totals.grand_total_paise, 14_265_000);
    // Approval-time amount stays pre-margin
    assert_eq!(with_margin.quotation.amount_paise, 11_905_000);
}

#[tokio::test]
async fn editing_is_pending_only_and_owner_scoped() {
    let h = harness().await;

    let detail = h
        .workflow
        .request(&h.sales, request_body(&h.deal_id))
        .await
        .unwrap();
    let id = detail.quotation.id.clone();

    let update = UpdateQuotationBody {
        items: vec![laptop_item(4_800_000)],
        remarks_for_admin: Some("Lowered ask".to_string()),
        valid_until: None,
    };

    // A different salesperson cannot edit
    let stranger = AuthUser {
        id: "someone-else".to_string(),
        name: "Stranger".to_string(),
        role: Role::Salesperson,
    };
    let err = h
        .workflow
        .update_pending(&stranger, &id, update.clone())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Forbidden);

    // The requester can, while pending
    let updated = h.workflow.update_pending(&h.sales, &id, update.clone()).await.unwrap();
    assert_eq!(updated.items[0].item.unit_price_paise, 4_800_000);
    assert_eq!(updated.items[0].item.target_price_paise, 4_800_000);

    // After approval, editing is forbidden even for the requester
    h.workflow
        .approve(&h.admin, &id, approve_body(vec![laptop_item(4_800_000)]))
        .await
        .unwrap();
    let err = h
        .workflow
        .update_pending(&h.sales, &id, update)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Forbidden);
}

#[tokio::test]
async fn transition_guards_are_symmetric() {
    let h = harness().await;

    let detail = h
        .workflow
        .request(&h.sales, request_body(&h.deal_id))
        .await
        .unwrap();
    let id = detail.quotation.id.clone();

    // Only admins approve or reject
    let err = h
        .workflow
        .approve(&h.sales, &id, approve_body(vec![laptop_item(5_000_000)]))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Forbidden);

    h.workflow
        .approve(&h.admin, &id, approve_body(vec![laptop_item(5_000_000)]))
        .await
        .unwrap();

    // Re-approving an approved quotation is a domain conflict
    let err = h
        .workflow
        .approve(&h.admin, &id, approve_body(vec![laptop_item(5_000_000)]))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::DomainConflict);
    assert!(err.message.contains("already approved"));

    // Revoking an approval via reject is allowed
    let rejected = h
        .workflow
        .reject(
            &h.admin,
            &id,
            RejectQuotationBody {
                remarks_for_salesperson: Some("Vendor pricing changed".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(rejected.quotation.status, QuotationStatus::Rejected);

    let deal = h.db.deals().get_by_id(&h.deal_id).await.unwrap().unwrap();
    assert_eq!(deal.quotation_status, Some(QuotationStatus::Rejected));

    // Re-rejecting is now guarded just like re-approving
    let err = h
        .workflow
        .reject(&h.admin, &id, RejectQuotationBody { remarks_for_salesperson: None })
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::DomainConflict);
    assert!(err.message.contains("already rejected"));

    // A rejected quotation can be re-approved after rework
    let reapproved = h
        .workflow
        .approve(&h.admin, &id, approve_body(vec![laptop_item(5_200_000)]))
        .await
        .unwrap();
    assert_eq!(reapproved.quotation.status, QuotationStatus::Approved);
}

#[tokio::test]
async fn notifications_drain_and_refill() {
    let h = harness().await;

    let first = h
        .workflow
        .request(&h.sales, request_body(&h.deal_id))
        .await
        .unwrap();
    h.workflow
        .approve(&h.admin, &first.quotation.id, approve_body(vec![laptop_item(5_000_000)]))
        .await
        .unwrap();

    let notifications = h.workflow.notifications(&h.sales).await.unwrap();
    assert_eq!(notifications.unread_count, 1);

    // Admin sees nothing: notifications are scoped to the requester
    let admin_view = h.workflow.notifications(&h.admin).await.unwrap();
    assert_eq!(admin_view.unread_count, 0);

    let marked = h
        .workflow
        .mark_read(
            &h.sales,
            MarkReadBody {
                quotation_ids: vec![first.quotation.id.clone()],
            },
        )
        .await
        .unwrap();
    assert_eq!(marked.marked, 1);
    assert_eq!(h.workflow.notifications(&h.sales).await.unwrap().unread_count, 0);

    // A fresh approval brings the count back up
    let second = h
        .workflow
        .request(&h.sales, request_body(&h.deal_id))
        .await
        .unwrap();
    h.workflow
        .approve(&h.admin, &second.quotation.id, approve_body(vec![laptop_item(5_000_000)]))
        .await
        .unwrap();
    assert_eq!(h.workflow.notifications(&h.sales).await.unwrap().unread_count, 1);
}

#[tokio::test]
async fn request_validation_and_missing_deal() {
    let h = harness().await;

    // Empty items
    let err = h
        .workflow
        .request(
            &h.sales,
            RequestQuotationBody {
                deal_id: h.deal_id.clone(),
                items: vec![],
                remarks_for_admin: None,
                valid_until: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);

    // Unknown deal
    let err = h
        .workflow
        .request(
            &h.sales,
            RequestQuotationBody {
                deal_id: "no-such-deal".to_string(),
                items: vec![laptop_item(5_000_000)],
                remarks_for_admin: None,
                valid_until: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);

    // Zero quantity
    let mut bad_item = laptop_item(5_000_000);
    bad_item.quantity = 0;
    let err = h
        .workflow
        .request(
            &h.sales,
            RequestQuotationBody {
                deal_id: h.deal_id.clone(),
                items: vec![bad_item],
                remarks_for_admin: None,
                valid_until: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);

    // Admin stats are admin-only
    let err = h.workflow.pending_count(&h.sales).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::Forbidden);
}
