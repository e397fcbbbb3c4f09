pub mod catalog;
pub mod directory;
pub mod ledger;
pub mod sales;

pub use catalog::ProductCatalogService;
pub use directory::CustomerDirectoryService;
pub use ledger::ExpenseLedgerService;
pub use sales::SaleRecordingService;
