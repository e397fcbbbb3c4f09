use crate::{
    db::DbPool,
    entities::{
        expense::{self, ExpenseCategory},
        Expense,
    },
    errors::ServiceError,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, FromQueryResult, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

/// Expense ledger: independent CRUD plus read-only aggregates. Listings are
/// sorted by expense date, newest first.
#[derive(Clone)]
pub struct ExpenseLedgerService {
    db: Arc<DbPool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateExpenseInput {
    pub description: String,
    pub category: ExpenseCategory,
    pub amount: Decimal,
    pub date: DateTime<Utc>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateExpenseInput {
    pub description: Option<String>,
    pub category: Option<ExpenseCategory>,
    pub amount: Option<Decimal>,
    pub date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// One row of the per-category aggregate.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryTotal {
    pub category: ExpenseCategory,
    pub total: Decimal,
}

#[derive(Debug, FromQueryResult)]
struct SumRow {
    total: Option<Decimal>,
}

#[derive(Debug, FromQueryResult)]
struct CategorySumRow {
    category: ExpenseCategory,
    total: Option<Decimal>,
}

impl ExpenseLedgerService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn create_expense(
        &self,
        input: CreateExpenseInput,
    ) -> Result<expense::Model, ServiceError> {
        let expense_id = Uuid::new_v4();

        let record = expense::ActiveModel {
            id: Set(expense_id),
            description: Set(input.description),
            category: Set(input.category),
            amount: Set(input.amount),
            date: Set(input.date),
            notes: Set(input.notes),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };

        let created = record.insert(&*self.db).await?;

        info!("Created expense: {}", expense_id);
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn list_expenses(&self) -> Result<Vec<expense::Model>, ServiceError> {
        Expense::find()
            .order_by_desc(expense::Column::Date)
            .all(&*self.db)
            .await
            .map_err(Into::into)
    }

    #[instrument(skip(self))]
    pub async fn get_expense(&self, expense_id: Uuid) -> Result<expense::Model, ServiceError> {
        Expense::find_by_id(expense_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Expense {} not found", expense_id)))
    }

    #[instrument(skip(self))]
    pub async fn update_expense(
        &self,
        expense_id: Uuid,
        input: UpdateExpenseInput,
    ) -> Result<expense::Model, ServiceError> {
        let existing = self.get_expense(expense_id).await?;
        let mut active: expense::ActiveModel = existing.into();

        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(category) = input.category {
            active.category = Set(category);
        }
        if let Some(amount) = input.amount {
            active.amount = Set(amount);
        }
        if let Some(date) = input.date {
            active.date = Set(date);
        }
        if let Some(notes) = input.notes {
            active.notes = Set(Some(notes));
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(&*self.db).await?;
        info!("Updated expense: {}", expense_id);
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete_expense(&self, expense_id: Uuid) -> Result<(), ServiceError> {
        let existing = self.get_expense(expense_id).await?;

        let active: expense::ActiveModel = existing.into();
        active.delete(&*self.db).await?;

        info!("Deleted expense: {}", expense_id);
        Ok(())
    }

    /// Expenses dated today, UTC day boundaries: `[start, next_start)`.
    #[instrument(skip(self))]
    pub async fn list_today_expenses(&self) -> Result<Vec<expense::Model>, ServiceError> {
        let today = Utc::now().date_naive();
        let tomorrow = today
            .succ_opt()
            .ok_or_else(|| ServiceError::InternalError("Calendar overflow".to_string()))?;

        let start = utc_start_of_day(today)?;
        let end = utc_start_of_day(tomorrow)?;

        Expense::find()
            .filter(expense::Column::Date.gte(start))
            .filter(expense::Column::Date.lt(end))
            .order_by_desc(expense::Column::Date)
            .all(&*self.db)
            .await
            .map_err(Into::into)
    }

    /// Expenses within an inclusive instant range. Callers pass the exact
    /// bounds (`start 00:00:00.000Z` through `end 23:59:59.999Z`).
    #[instrument(skip(self))]
    pub async fn list_expenses_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<expense::Model>, ServiceError> {
        Expense::find()
            .filter(expense::Column::Date.gte(start))
            .filter(expense::Column::Date.lte(end))
            .order_by_desc(expense::Column::Date)
            .all(&*self.db)
            .await
            .map_err(Into::into)
    }

    /// Sum of all expense amounts; zero for an empty ledger.
    #[instrument(skip(self))]
    pub async fn total_expenses(&self) -> Result<Decimal, ServiceError> {
        let row = Expense::find()
            .select_only()
            .column_as(expense::Column::Amount.sum(), "total")
            .into_model::<SumRow>()
            .one(&*self.db)
            .await?;

        Ok(row.and_then(|r| r.total).unwrap_or(Decimal::ZERO))
    }

    /// Sum of expense amounts grouped by category, computed in SQL.
    #[instrument(skip(self))]
    pub async fn totals_by_category(&self) -> Result<Vec<CategoryTotal>, ServiceError> {
        let rows = Expense::find()
            .select_only()
            .column(expense::Column::Category)
            .column_as(expense::Column::Amount.sum(), "total")
            .group_by(expense::Column::Category)
            .into_model::<CategorySumRow>()
            .all(&*self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| CategoryTotal {
                category: row.category,
                total: row.total.unwrap_or(Decimal::ZERO),
            })
            .collect())
    }
}

fn utc_start_of_day(day: chrono::NaiveDate) -> Result<DateTime<Utc>, ServiceError> {
    day.and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ServiceError::InternalError("Invalid day start".to_string()))
}
