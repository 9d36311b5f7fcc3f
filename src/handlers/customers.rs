use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::model::Customer;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCustomerRequest {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CustomerResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<Customer> for CustomerResponse {
    fn from(c: Customer) -> Self {
        Self {
            id: c.id,
            name: c.name,
            email: c.email,
        }
    }
}

/// POST /customers
#[utoipa::path(
    post,
    path = "/customers",
    request_body = CreateCustomerRequest,
    responses(
        (status = 201, description = "Customer created", body = CustomerResponse),
        (status = 409, description = "E-mail already in use"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "customers"
)]
pub async fn create_customer(
    state: web::Data<AppState>,
    body: web::Json<CreateCustomerRequest>,
) -> Result<HttpResponse, AppError> {
    let CreateCustomerRequest { name, email } = body.into_inner();

    let customer = web::block(move || state.customers.create_customer(name, email))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(CustomerResponse::from(customer)))
}
