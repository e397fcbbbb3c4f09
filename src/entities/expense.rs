use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub description: String,
    pub category: ExpenseCategory,
    pub amount: Decimal,
    pub date: DateTime<Utc>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Closed expense categories; the wire values are the Spanish names the
/// business has always used.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum ExpenseCategory {
    #[sea_orm(string_value = "pollo")]
    Pollo,
    #[sea_orm(string_value = "combos")]
    Combos,
    #[sea_orm(string_value = "acompanantes")]
    Acompanantes,
    #[sea_orm(string_value = "salsas")]
    Salsas,
    #[sea_orm(string_value = "cerdo")]
    Cerdo,
    #[sea_orm(string_value = "pasteles")]
    Pasteles,
    #[sea_orm(string_value = "bebidas")]
    Bebidas,
    #[sea_orm(string_value = "adicionales")]
    Adicionales,
    #[sea_orm(string_value = "insumos")]
    Insumos,
    #[sea_orm(string_value = "delivery")]
    Delivery,
    #[sea_orm(string_value = "otros")]
    Otros,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
