//! Employee Endpoints
//!
//! CRUD over `/api/employees`. Every route requires an authenticated
//! identity; the [`Identity`] extractor turns unauthenticated requests into
//! 401 before the handler body runs.
//!
//! | Method | Path                  | Success                    |
//! |--------|-----------------------|----------------------------|
//! | GET    | /api/employees        | 200, array of employees    |
//! | GET    | /api/employees/{id}   | 200, one employee          |
//! | POST   | /api/employees        | 201 + Location, employee   |
//! | PUT    | /api/employees/{id}   | 200, updated employee      |
//! | DELETE | /api/employees/{id}   | 204, empty body            |

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use crate::app::AppState;
use crate::employee::{Employee, EmployeeDraft};
use crate::error::AppError;
use crate::identity::Identity;
use crate::validation::{
    validate_email, validate_non_negative, validate_required, Validate, ValidatedJson,
    ValidationError, ValidationErrorCode,
};

// ============================================================================
// DTOs
// ============================================================================

/// Create/update payload. The same shape serves both POST and PUT.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department: String,
    pub job_title: String,
    pub salary: f64,
    pub date_of_joining: NaiveDate,
}

impl Validate for EmployeeRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_required(&self.first_name, "firstName")?;
        validate_required(&self.last_name, "lastName")?;
        validate_required(&self.email, "email")?;
        validate_email(self.email.trim())?;
        validate_required(&self.department, "department")?;
        validate_required(&self.job_title, "jobTitle")?;
        validate_non_negative(self.salary, "salary")?;

        if self.date_of_joining > Utc::now().date_naive() {
            return Err(ValidationError::for_field(
                "dateOfJoining",
                ValidationErrorCode::InvalidFormat,
                "dateOfJoining cannot be in the future",
            ));
        }

        Ok(())
    }
}

impl From<EmployeeRequest> for EmployeeDraft {
    fn from(request: EmployeeRequest) -> Self {
        Self {
            first_name: request.first_name,
            last_name: request.last_name,
            email: request.email,
            department: request.department,
            job_title: request.job_title,
            salary: request.salary,
            date_of_joining: request.date_of_joining,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/employees
async fn list_employees(
    Identity(_): Identity,
    State(state): State<AppState>,
) -> Json<Vec<Employee>> {
    Json(state.employees.find_all())
}

/// GET /api/employees/{id}
async fn get_employee(
    Identity(_): Identity,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Employee>, AppError> {
    let employee = state.employees.find_by_id(&id)?;
    Ok(Json(employee))
}

/// POST /api/employees
async fn create_employee(
    Identity(_): Identity,
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<EmployeeRequest>,
) -> Result<Response, AppError> {
    let created = state.employees.create(request.into())?;
    let location = format!("/api/employees/{}", created.id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(created),
    )
        .into_response())
}

/// PUT /api/employees/{id}
async fn update_employee(
    Identity(_): Identity,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<EmployeeRequest>,
) -> Result<Json<Employee>, AppError> {
    let updated = state.employees.update(&id, request.into())?;
    Ok(Json(updated))
}

/// DELETE /api/employees/{id}
async fn delete_employee(
    Identity(_): Identity,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.employees.delete(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Routes under `/api/employees`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/employees", get(list_employees))
        .route("/api/employees", post(create_employee))
        .route("/api/employees/{id}", get(get_employee))
        .route("/api/employees/{id}", put(update_employee))
        .route("/api/employees/{id}", delete(delete_employee))
}
