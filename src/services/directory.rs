use crate::{
    db::DbPool,
    entities::{customer, Customer},
    errors::ServiceError,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Directory service owning customer records. Sale recording relies on
/// [`CustomerDirectoryService::get_customer`] as its existence check.
#[derive(Clone)]
pub struct CustomerDirectoryService {
    db: Arc<DbPool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCustomerInput {
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCustomerInput {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
}

impl CustomerDirectoryService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn create_customer(
        &self,
        input: CreateCustomerInput,
    ) -> Result<customer::Model, ServiceError> {
        let customer_id = Uuid::new_v4();

        let record = customer::ActiveModel {
            id: Set(customer_id),
            name: Set(input.name),
            phone: Set(input.phone),
            address: Set(input.address),
            email: Set(input.email),
            notes: Set(input.notes),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };

        let created = record.insert(&*self.db).await?;

        info!("Created customer: {}", customer_id);
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn list_customers(&self) -> Result<Vec<customer::Model>, ServiceError> {
        Customer::find()
            .order_by_desc(customer::Column::CreatedAt)
            .all(&*self.db)
            .await
            .map_err(Into::into)
    }

    #[instrument(skip(self))]
    pub async fn get_customer(&self, customer_id: Uuid) -> Result<customer::Model, ServiceError> {
        Customer::find_by_id(customer_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Customer {} not found", customer_id)))
    }

    #[instrument(skip(self))]
    pub async fn update_customer(
        &self,
        customer_id: Uuid,
        input: UpdateCustomerInput,
    ) -> Result<customer::Model, ServiceError> {
        let customer = self.get_customer(customer_id).await?;
        let mut active: customer::ActiveModel = customer.into();

        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(phone) = input.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(address) = input.address {
            active.address = Set(Some(address));
        }
        if let Some(email) = input.email {
            active.email = Set(Some(email));
        }
        if let Some(notes) = input.notes {
            active.notes = Set(Some(notes));
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(&*self.db).await?;
        info!("Updated customer: {}", customer_id);
        Ok(updated)
    }

    /// Delete a customer. Sales that reference it are kept and will report
    /// not-found when queried through the customer.
    #[instrument(skip(self))]
    pub async fn delete_customer(&self, customer_id: Uuid) -> Result<(), ServiceError> {
        let customer = self.get_customer(customer_id).await?;

        let active: customer::ActiveModel = customer.into();
        active.delete(&*self.db).await?;

        info!("Deleted customer: {}", customer_id);
        Ok(())
    }
}
