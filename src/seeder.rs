use crate::{
    auth::{self, user},
    config::AppConfig,
    db::DbPool,
    entities::{customer, product, Customer, Product},
    errors::ServiceError,
};
use chrono::Utc;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use tracing::{info, warn};
use uuid::Uuid;

/// Seed the database on startup.
///
/// The administrator account is ensured in every environment; demo products
/// and customers are only inserted into an empty development database.
pub async fn run(db: &DbPool, config: &AppConfig) -> Result<(), ServiceError> {
    seed_admin_user(db, config).await?;

    if config.is_development() {
        seed_demo_products(db).await?;
        seed_demo_customers(db).await?;
    }

    Ok(())
}

async fn seed_admin_user(db: &DbPool, config: &AppConfig) -> Result<(), ServiceError> {
    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(config.seed_admin_email.as_str()))
        .one(db)
        .await?;

    if existing.is_some() {
        return Ok(());
    }

    let password = match config.seed_admin_password.as_deref() {
        Some(password) => password.to_string(),
        None if config.is_development() => {
            warn!("Seeding development admin user with the default password");
            "123456".to_string()
        }
        None => {
            warn!(
                "No admin user found and no seed_admin_password configured; skipping admin seed"
            );
            return Ok(());
        }
    };

    let record = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(config.seed_admin_username.clone()),
        email: Set(config.seed_admin_email.clone()),
        password_hash: Set(auth::hash_password(&password)
            .map_err(|e| ServiceError::HashError(e.to_string()))?),
        created_at: Set(Utc::now()),
    };
    record.insert(db).await?;

    info!("Seeded admin user {}", config.seed_admin_email);
    Ok(())
}

async fn seed_demo_products(db: &DbPool) -> Result<(), ServiceError> {
    if Product::find().count(db).await? > 0 {
        return Ok(());
    }

    let rows = [
        ("Pollo Asado", dec!(22000), 50),
        ("Pollo Frito", dec!(18000), 30),
        ("Pollo a la Parrilla", dec!(25000), 0),
    ];

    for (name, price, stock) in rows {
        let record = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            price: Set(price),
            stock: Set(stock),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };
        record.insert(db).await?;
    }

    info!("Seeded demo products");
    Ok(())
}

async fn seed_demo_customers(db: &DbPool) -> Result<(), ServiceError> {
    if Customer::find().count(db).await? > 0 {
        return Ok(());
    }

    let rows = [
        (
            "Juan Pérez",
            "juan.perez@gmail.com",
            "3001234567",
            "Calle 123 #45-67",
            "Cliente frecuente",
        ),
        (
            "María García",
            "maria.garcia@gmail.com",
            "3001234568",
            "Calle 124 #46-68",
            "Cliente nuevo",
        ),
        (
            "Pedro López",
            "pedro.lopez@gmail.com",
            "3001234569",
            "Calle 125 #47-69",
            "Cliente VIP",
        ),
    ];

    for (name, email, phone, address, notes) in rows {
        let record = customer::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            phone: Set(Some(phone.to_string())),
            address: Set(Some(address.to_string())),
            email: Set(Some(email.to_string())),
            notes: Set(Some(notes.to_string())),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };
        record.insert(db).await?;
    }

    info!("Seeded demo customers");
    Ok(())
}
