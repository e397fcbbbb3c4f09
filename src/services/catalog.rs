use crate::{
    db::DbPool,
    entities::{product, Product},
    errors::ServiceError,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Catalog service owning product records and their stock quantity.
#[derive(Clone)]
pub struct ProductCatalogService {
    db: Arc<DbPool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProductInput {
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
}

impl ProductCatalogService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Create a new product
    #[instrument(skip(self))]
    pub async fn create_product(
        &self,
        input: CreateProductInput,
    ) -> Result<product::Model, ServiceError> {
        let product_id = Uuid::new_v4();

        let record = product::ActiveModel {
            id: Set(product_id),
            name: Set(input.name),
            price: Set(input.price),
            stock: Set(input.stock),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };

        let created = record.insert(&*self.db).await?;

        info!("Created product: {}", product_id);
        Ok(created)
    }

    /// List all products, newest first
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<product::Model>, ServiceError> {
        Product::find()
            .order_by_desc(product::Column::CreatedAt)
            .all(&*self.db)
            .await
            .map_err(Into::into)
    }

    /// Get a product by ID
    #[instrument(skip(self))]
    pub async fn get_product(&self, product_id: Uuid) -> Result<product::Model, ServiceError> {
        Product::find_by_id(product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))
    }

    /// Update an existing product
    #[instrument(skip(self))]
    pub async fn update_product(
        &self,
        product_id: Uuid,
        input: UpdateProductInput,
    ) -> Result<product::Model, ServiceError> {
        let product = self.get_product(product_id).await?;
        let mut active: product::ActiveModel = product.into();

        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(price) = input.price {
            active.price = Set(price);
        }
        if let Some(stock) = input.stock {
            active.stock = Set(stock);
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(&*self.db).await?;
        info!("Updated product: {}", product_id);
        Ok(updated)
    }

    /// Delete a product. Historical sale lines keep their reference.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, product_id: Uuid) -> Result<(), ServiceError> {
        let product = self.get_product(product_id).await?;

        let active: product::ActiveModel = product.into();
        active.delete(&*self.db).await?;

        info!("Deleted product: {}", product_id);
        Ok(())
    }

    /// Adjust the stock quantity by a signed delta.
    ///
    /// Read-then-write: the new quantity is computed from the current row
    /// and persisted. Fails without touching the row when the result would
    /// be negative.
    #[instrument(skip(self))]
    pub async fn adjust_stock(
        &self,
        product_id: Uuid,
        delta: i32,
    ) -> Result<product::Model, ServiceError> {
        let product = self.get_product(product_id).await?;

        let new_stock = product.stock + delta;
        if new_stock < 0 {
            return Err(ServiceError::InvalidOperation(format!(
                "Insufficient stock for product {}: current {}, required {}",
                product.name,
                product.stock,
                delta.abs()
            )));
        }

        let mut active: product::ActiveModel = product.into();
        active.stock = Set(new_stock);
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(&*self.db).await?;
        info!(
            "Adjusted stock for product {}: {:+} -> {}",
            product_id, delta, new_stock
        );
        Ok(updated)
    }
}
