pub mod customer;
pub mod expense;
pub mod product;
pub mod sale;
pub mod sale_line;

pub use customer::Entity as Customer;
pub use expense::Entity as Expense;
pub use product::Entity as Product;
pub use sale::Entity as Sale;
pub use sale_line::Entity as SaleLine;

pub type ProductModel = product::Model;
pub type CustomerModel = customer::Model;
pub type SaleModel = sale::Model;
pub type SaleLineModel = sale_line::Model;
pub type ExpenseModel = expense::Model;
