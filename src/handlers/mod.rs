pub mod auth;
pub mod common;
pub mod customers;
pub mod expenses;
pub mod products;
pub mod sales;

use crate::auth::AuthService;
use crate::db::DbPool;
use crate::services::{
    CustomerDirectoryService, ExpenseLedgerService, ProductCatalogService, SaleRecordingService,
};
use std::sync::Arc;

/// Services container used by the HTTP handlers.
///
/// Each capability is constructed with its dependencies passed explicitly;
/// sale recording receives the catalog and the directory it validates
/// against, never the other way around.
#[derive(Clone)]
pub struct AppServices {
    pub catalog: Arc<ProductCatalogService>,
    pub directory: Arc<CustomerDirectoryService>,
    pub sales: Arc<SaleRecordingService>,
    pub ledger: Arc<ExpenseLedgerService>,
    pub auth: Arc<AuthService>,
}

impl AppServices {
    pub fn new(db: Arc<DbPool>, auth: Arc<AuthService>) -> Self {
        let catalog = Arc::new(ProductCatalogService::new(db.clone()));
        let directory = Arc::new(CustomerDirectoryService::new(db.clone()));
        let sales = Arc::new(SaleRecordingService::new(
            db.clone(),
            catalog.clone(),
            directory.clone(),
        ));
        let ledger = Arc::new(ExpenseLedgerService::new(db));

        Self {
            catalog,
            directory,
            sales,
            ledger,
            auth,
        }
    }
}
