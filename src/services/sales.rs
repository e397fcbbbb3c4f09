use crate::{
    db::DbPool,
    entities::{sale, sale_line, Sale, SaleLine},
    errors::ServiceError,
};
use chrono::{DateTime, Local, NaiveDate, Utc};
use futures::future::try_join_all;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{CustomerDirectoryService, ProductCatalogService};

/// Records sales against the catalog and the customer directory.
///
/// Every referenced entity is resolved before anything is written: the
/// customer lookup gates the request, and all product lookups run
/// concurrently and are awaited together, so a sale referencing a missing
/// product is rejected as a whole. The sale header and its lines go in
/// within one transaction and are never visible partially inserted.
///
/// Recording a sale does NOT touch product stock, and the declared total is
/// stored verbatim; inventory and sales are reconciled out of band.
#[derive(Clone)]
pub struct SaleRecordingService {
    db: Arc<DbPool>,
    catalog: Arc<ProductCatalogService>,
    directory: Arc<CustomerDirectoryService>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleLineInput {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordSaleInput {
    pub lines: Vec<SaleLineInput>,
    pub customer_id: Uuid,
    pub total: Decimal,
    pub is_debt: bool,
    pub debt_amount: Option<Decimal>,
    pub debt_date: Option<DateTime<Utc>>,
}

/// Partial update; only payment terms are mutable after creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSaleInput {
    pub is_debt: Option<bool>,
    pub debt_amount: Option<Decimal>,
    pub debt_date: Option<DateTime<Utc>>,
}

/// A sale header together with its ordered lines.
#[derive(Debug, Clone, Serialize)]
pub struct SaleWithLines {
    pub sale: sale::Model,
    pub lines: Vec<sale_line::Model>,
}

impl SaleRecordingService {
    pub fn new(
        db: Arc<DbPool>,
        catalog: Arc<ProductCatalogService>,
        directory: Arc<CustomerDirectoryService>,
    ) -> Self {
        Self {
            db,
            catalog,
            directory,
        }
    }

    /// Record a sale. See the type-level docs for the consistency contract.
    #[instrument(skip(self, input))]
    pub async fn record_sale(&self, input: RecordSaleInput) -> Result<SaleWithLines, ServiceError> {
        if input.lines.is_empty() {
            return Err(ServiceError::ValidationError(
                "A sale must have at least one line".to_string(),
            ));
        }

        // Blocking existence check; a missing customer aborts the request.
        self.directory.get_customer(input.customer_id).await?;

        // All product lookups fly concurrently; any not-found aborts before
        // the write below.
        try_join_all(
            input
                .lines
                .iter()
                .map(|line| self.catalog.get_product(line.product_id)),
        )
        .await?;

        let sale_id = Uuid::new_v4();
        let now = Utc::now();

        let txn = self.db.begin().await?;

        let header = sale::ActiveModel {
            id: Set(sale_id),
            customer_id: Set(input.customer_id),
            total: Set(input.total),
            is_debt: Set(input.is_debt),
            debt_amount: Set(input.debt_amount),
            debt_date: Set(input.debt_date),
            created_at: Set(now),
        };
        let header = header.insert(&txn).await?;

        let mut lines = Vec::with_capacity(input.lines.len());
        for (position, line) in input.lines.iter().enumerate() {
            let record = sale_line::ActiveModel {
                id: Set(Uuid::new_v4()),
                sale_id: Set(sale_id),
                product_id: Set(line.product_id),
                quantity: Set(line.quantity),
                position: Set(position as i32),
            };
            lines.push(record.insert(&txn).await?);
        }

        txn.commit().await?;

        info!(
            "Recorded sale {} for customer {} with {} lines",
            sale_id,
            header.customer_id,
            lines.len()
        );

        Ok(SaleWithLines {
            sale: header,
            lines,
        })
    }

    /// List all sales, newest first.
    #[instrument(skip(self))]
    pub async fn list_sales(&self) -> Result<Vec<SaleWithLines>, ServiceError> {
        let sales = Sale::find()
            .order_by_desc(sale::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        self.attach_lines(sales).await
    }

    /// Get a sale by ID.
    #[instrument(skip(self))]
    pub async fn get_sale(&self, sale_id: Uuid) -> Result<SaleWithLines, ServiceError> {
        let header = Sale::find_by_id(sale_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Sale {} not found", sale_id)))?;

        let lines = SaleLine::find()
            .filter(sale_line::Column::SaleId.eq(sale_id))
            .order_by_asc(sale_line::Column::Position)
            .all(&*self.db)
            .await?;

        Ok(SaleWithLines {
            sale: header,
            lines,
        })
    }

    /// List the sales of one customer; the customer must exist.
    #[instrument(skip(self))]
    pub async fn list_sales_for_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<SaleWithLines>, ServiceError> {
        self.directory.get_customer(customer_id).await?;

        let sales = Sale::find()
            .filter(sale::Column::CustomerId.eq(customer_id))
            .order_by_desc(sale::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        self.attach_lines(sales).await
    }

    /// List the sales created today, bounded by local midnights:
    /// `[today 00:00 local, tomorrow 00:00 local)`.
    #[instrument(skip(self))]
    pub async fn list_today_sales(&self) -> Result<Vec<SaleWithLines>, ServiceError> {
        let today = Local::now().date_naive();
        let tomorrow = today
            .succ_opt()
            .ok_or_else(|| ServiceError::InternalError("Calendar overflow".to_string()))?;

        let start = local_midnight(today)?;
        let end = local_midnight(tomorrow)?;

        let sales = Sale::find()
            .filter(sale::Column::CreatedAt.gte(start))
            .filter(sale::Column::CreatedAt.lt(end))
            .order_by_desc(sale::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        self.attach_lines(sales).await
    }

    /// List the sales currently flagged as debt ("fiado").
    #[instrument(skip(self))]
    pub async fn list_debt_sales(&self) -> Result<Vec<SaleWithLines>, ServiceError> {
        let sales = Sale::find()
            .filter(sale::Column::IsDebt.eq(true))
            .order_by_desc(sale::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        self.attach_lines(sales).await
    }

    /// Partially update the payment terms of a sale, e.g. flipping `is_debt`
    /// off once a debt is settled. Lines and customer are immutable.
    #[instrument(skip(self))]
    pub async fn update_sale(
        &self,
        sale_id: Uuid,
        input: UpdateSaleInput,
    ) -> Result<SaleWithLines, ServiceError> {
        let existing = self.get_sale(sale_id).await?;

        // An empty patch would produce an empty changeset; nothing to do.
        if input.is_debt.is_none() && input.debt_amount.is_none() && input.debt_date.is_none() {
            return Ok(existing);
        }

        let mut active: sale::ActiveModel = existing.sale.clone().into();

        if let Some(is_debt) = input.is_debt {
            active.is_debt = Set(is_debt);
        }
        if let Some(debt_amount) = input.debt_amount {
            active.debt_amount = Set(Some(debt_amount));
        }
        if let Some(debt_date) = input.debt_date {
            active.debt_date = Set(Some(debt_date));
        }

        let updated = active.update(&*self.db).await?;
        info!("Updated sale: {}", sale_id);

        Ok(SaleWithLines {
            sale: updated,
            lines: existing.lines,
        })
    }

    /// Delete a sale and its lines.
    #[instrument(skip(self))]
    pub async fn delete_sale(&self, sale_id: Uuid) -> Result<(), ServiceError> {
        let existing = self.get_sale(sale_id).await?;

        // Lines first: SQLite does not enforce the cascade unless foreign
        // keys are switched on for the connection.
        SaleLine::delete_many()
            .filter(sale_line::Column::SaleId.eq(sale_id))
            .exec(&*self.db)
            .await?;

        let active: sale::ActiveModel = existing.sale.into();
        active.delete(&*self.db).await?;

        info!("Deleted sale: {}", sale_id);
        Ok(())
    }

    /// Fetch the lines of a batch of sales in one query and zip them back
    /// onto their headers, preserving line order.
    async fn attach_lines(
        &self,
        sales: Vec<sale::Model>,
    ) -> Result<Vec<SaleWithLines>, ServiceError> {
        if sales.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = sales.iter().map(|s| s.id).collect();
        let lines = SaleLine::find()
            .filter(sale_line::Column::SaleId.is_in(ids))
            .order_by_asc(sale_line::Column::Position)
            .all(&*self.db)
            .await?;

        let mut by_sale: HashMap<Uuid, Vec<sale_line::Model>> = HashMap::new();
        for line in lines {
            by_sale.entry(line.sale_id).or_default().push(line);
        }

        Ok(sales
            .into_iter()
            .map(|header| {
                let lines = by_sale.remove(&header.id).unwrap_or_default();
                SaleWithLines {
                    sale: header,
                    lines,
                }
            })
            .collect())
    }
}

fn local_midnight(day: NaiveDate) -> Result<DateTime<Utc>, ServiceError> {
    day.and_hms_opt(0, 0, 0)
        .and_then(|naive| naive.and_local_timezone(Local).earliest())
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| ServiceError::InternalError("Invalid local midnight".to_string()))
}
