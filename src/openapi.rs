use utoipa::OpenApi;

use crate::handlers::{customers, orders, products};

#[derive(OpenApi)]
#[openapi(
    paths(
        customers::create_customer,
        products::create_product,
        orders::create_order,
        orders::get_order,
    ),
    components(schemas(
        customers::CreateCustomerRequest,
        customers::CustomerResponse,
        products::CreateProductRequest,
        products::ProductResponse,
        orders::OrderProductRequest,
        orders::CreateOrderRequest,
        orders::OrderLineResponse,
        orders::OrderResponse,
    )),
    tags(
        (name = "customers", description = "Customer registration"),
        (name = "products", description = "Product catalogue"),
        (name = "orders", description = "Order placement and lookup"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        assert_eq!(paths, vec!["/customers", "/orders", "/orders/{id}", "/products"]);
    }
}
