//! Seed tool: provisions an admin account and a small demo catalog.
//!
//! ## Usage
//! ```text
//! DATABASE_PATH=medipos.db SEED_ADMIN_PASSWORD=change-me cargo run --bin seed
//! ```
//!
//! Idempotent: refuses to touch a database that already has users.

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHasher};
use chrono::Utc;
use tracing::info;

use medipos_core::{Category, Product, Role, User};
use medipos_db::repository::product::generate_product_id;
use medipos_db::repository::user::generate_user_id;
use medipos_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let database_path =
        std::env::var("DATABASE_PATH").unwrap_or_else(|_| "medipos.db".to_string());
    let admin_password = std::env::var("SEED_ADMIN_PASSWORD")
        .map_err(|_| "SEED_ADMIN_PASSWORD must be set")?;

    let db = Database::new(DbConfig::new(&database_path)).await?;

    if db.users().count().await? > 0 {
        info!("Database already seeded, nothing to do");
        return Ok(());
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(admin_password.as_bytes(), &salt)
        .map_err(|e| format!("password hashing failed: {e}"))?
        .to_string();

    let admin = User {
        id: generate_user_id(),
        name: "Administrator".to_string(),
        email: "admin@medipos.local".to_string(),
        password_hash,
        role: Role::Admin,
        created_at: Utc::now(),
    };
    db.users().insert(&admin).await?;
    info!(email = %admin.email, "Admin user created");

    for (name, category, price_cents, quantity) in demo_catalog() {
        let now = Utc::now();
        let product = Product {
            id: generate_product_id(),
            name: name.to_string(),
            description: None,
            category,
            manufacturer: None,
            price_cents,
            quantity,
            added_by: admin.id.clone(),
            created_at: now,
            updated_at: now,
        };
        db.products().insert(&product).await?;
    }
    info!("Demo catalog created");

    db.close().await;
    Ok(())
}

fn demo_catalog() -> Vec<(&'static str, Category, i64, i64)> {
    vec![
        ("Paracetamol 500mg", Category::Tablet, 500, 200),
        ("Amoxicillin 250mg", Category::Capsule, 1250, 80),
        ("Cough Syrup 100ml", Category::Syrup, 1800, 40),
        ("Saline Eye Drops", Category::Drop, 950, 60),
        ("Antiseptic Ointment", Category::Ointment, 1100, 50),
        ("Digital Thermometer", Category::Equipment, 4500, 15),
        ("Hand Sanitizer 250ml", Category::PersonalCare, 700, 120),
    ]
}
