use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Brasas POS API",
        version = "0.2.0",
        description = r#"
Point-of-sale backend for a retail food business.

- **Catalog**: products and their stock quantity
- **Directory**: customer records
- **Sales**: cash or credit ("fiado") sale recording and debt tracking
- **Expenses**: ledger with daily, ranged and per-category reporting

All routes except `POST /api/v1/auth/signin` require a bearer token:

```
Authorization: Bearer <your-jwt-token>
```
        "#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    paths(
        // Auth
        crate::handlers::auth::sign_in,
        crate::handlers::auth::profile,

        // Products
        crate::handlers::products::create_product,
        crate::handlers::products::list_products,
        crate::handlers::products::get_product,
        crate::handlers::products::update_product,
        crate::handlers::products::delete_product,
        crate::handlers::products::adjust_stock,

        // Customers
        crate::handlers::customers::create_customer,
        crate::handlers::customers::list_customers,
        crate::handlers::customers::get_customer,
        crate::handlers::customers::update_customer,
        crate::handlers::customers::delete_customer,

        // Sales
        crate::handlers::sales::create_sale,
        crate::handlers::sales::list_sales,
        crate::handlers::sales::list_today_sales,
        crate::handlers::sales::list_debt_sales,
        crate::handlers::sales::list_sales_for_customer,
        crate::handlers::sales::get_sale,
        crate::handlers::sales::update_sale,
        crate::handlers::sales::delete_sale,

        // Expenses
        crate::handlers::expenses::create_expense,
        crate::handlers::expenses::list_expenses,
        crate::handlers::expenses::get_expense,
        crate::handlers::expenses::update_expense,
        crate::handlers::expenses::delete_expense,
        crate::handlers::expenses::list_today_expenses,
        crate::handlers::expenses::list_expenses_in_range,
        crate::handlers::expenses::total_expenses,
        crate::handlers::expenses::totals_by_category,
    ),
    components(
        schemas(
            crate::handlers::auth::SignInRequest,
            crate::handlers::auth::UserResponse,
            crate::auth::TokenResponse,
            crate::handlers::products::CreateProductRequest,
            crate::handlers::products::UpdateProductRequest,
            crate::handlers::products::AdjustStockRequest,
            crate::handlers::products::ProductResponse,
            crate::handlers::customers::CreateCustomerRequest,
            crate::handlers::customers::UpdateCustomerRequest,
            crate::handlers::customers::CustomerResponse,
            crate::handlers::sales::SaleLineRequest,
            crate::handlers::sales::CreateSaleRequest,
            crate::handlers::sales::UpdateSaleRequest,
            crate::handlers::sales::SaleLineResponse,
            crate::handlers::sales::SaleResponse,
            crate::handlers::expenses::CreateExpenseRequest,
            crate::handlers::expenses::UpdateExpenseRequest,
            crate::handlers::expenses::ExpenseResponse,
            crate::handlers::expenses::TotalResponse,
            crate::services::ledger::CategoryTotal,
            crate::entities::expense::ExpenseCategory,
            crate::errors::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Products", description = "Product catalog and stock"),
        (name = "Customers", description = "Customer directory"),
        (name = "Sales", description = "Sale recording and debt queries"),
        (name = "Expenses", description = "Expense ledger and reporting"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "Bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
