//! # Seed Data Generator
//!
//! Populates the database with development users and a sample deal.
//!
//! ## Usage
//! ```bash
//! cargo run -p meridian-db --bin seed
//!
//! # Specify database path
//! cargo run -p meridian-db --bin seed -- --db ./data/meridian.db
//! ```
//!
//! ## Generated Data
//! - Admin login:        admin@meridian.local / admin123
//! - Salesperson login:  sales@meridian.local / sales123
//! - One sample deal assigned to the salesperson
//!
//! Idempotent: does nothing if users already exist.

use chrono::Utc;
use std::env;
use uuid::Uuid;

use meridian_core::{DealStage, Role, User};
use meridian_db::repository::deal::NewDeal;
use meridian_db::repository::user::hash_password;
use meridian_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let db_path = args
        .iter()
        .position(|a| a == "--db")
        .and_then(|i| args.get(i + 1))
        .cloned()
        .unwrap_or_else(|| "./meridian.db".to_string());

    println!("Seeding database at {}", db_path);

    let db = Database::new(DbConfig::new(&db_path)).await?;

    if db.users().count().await? > 0 {
        println!("Users already present, nothing to do");
        return Ok(());
    }

    let now = Utc::now();

    let admin = User {
        id: Uuid::new_v4().to_string(),
        name: "Admin".to_string(),
        email: "admin@meridian.local".to_string(),
        password_hash: hash_password("admin123")?,
        role: Role::Admin,
        created_at: now,
    };
    db.users().insert(&admin).await?;
    println!("Created admin: {}", admin.email);

    let sales = User {
        id: Uuid::new_v4().to_string(),
        name: "Priya Nair".to_string(),
        email: "sales@meridian.local".to_string(),
        password_hash: hash_password("sales123")?,
        role: Role::Salesperson,
        created_at: now,
    };
    db.users().insert(&sales).await?;
    println!("Created salesperson: {}", sales.email);

    let deal = db
        .deals()
        .create(NewDeal {
            customer_name: "Acme Industries".to_string(),
            contact_name: Some("R. Mehta".to_string()),
            contact_email: Some("r.mehta@acme.example".to_string()),
            contact_phone: Some("+91 98765 43210".to_string()),
            address: Some("Plot 14, MIDC, Pune".to_string()),
            oem: Some("Cisco".to_string()),
            expected_revenue_paise: 250_000_000, // ₹25,00,000
            expected_margin_paise: Some(25_000_000),
            stage: DealStage::Qualified,
            assigned_to: sales.id.clone(),
        })
        .await?;
    println!("Created sample deal: {}", deal.deal_number);

    println!("Done.");
    Ok(())
}
