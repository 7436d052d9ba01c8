//! Employee Records
//!
//! Domain model, storage trait and service logic for employee records.
//! Storage is abstracted behind [`EmployeeStore`] so the HTTP layer and
//! tests run against the in-memory implementation while a real deployment
//! can plug in a database-backed one.
//!
//! Emails are the uniqueness key: they are trimmed and lowercased before
//! any comparison or write, so `User@Example.COM` and `user@example.com`
//! are the same address.

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Model
// ============================================================================

/// A stored employee record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    /// Normalized (trimmed, lowercased) email, unique across records
    pub email: String,
    pub department: String,
    pub job_title: String,
    pub salary: f64,
    pub date_of_joining: NaiveDate,
}

/// The writable fields of an employee, as accepted on create and update.
#[derive(Debug, Clone)]
pub struct EmployeeDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department: String,
    pub job_title: String,
    pub salary: f64,
    pub date_of_joining: NaiveDate,
}

/// Trim and lowercase an email address for storage and comparison.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// ============================================================================
// Errors
// ============================================================================

/// Employee operation failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmployeeError {
    /// No record with the given id
    NotFound { id: String },
    /// Another record already owns this email
    DuplicateEmail { email: String },
}

impl fmt::Display for EmployeeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { id } => write!(f, "Employee not found: {}", id),
            Self::DuplicateEmail { email } => write!(f, "Email already in use: {}", email),
        }
    }
}

impl std::error::Error for EmployeeError {}

impl From<EmployeeError> for crate::error::AppError {
    fn from(err: EmployeeError) -> Self {
        match &err {
            EmployeeError::NotFound { .. } => crate::error::AppError::not_found(err.to_string()),
            EmployeeError::DuplicateEmail { .. } => {
                crate::error::AppError::conflict(err.to_string())
            }
        }
    }
}

// ============================================================================
// Storage
// ============================================================================

/// Persistence seam for employee records.
pub trait EmployeeStore: Send + Sync {
    /// All records, ordered by id for stable listings
    fn find_all(&self) -> Vec<Employee>;

    /// One record by id
    fn find_by_id(&self, id: &str) -> Option<Employee>;

    /// Whether any record other than `excluding_id` owns this email
    /// (already normalized)
    fn email_taken(&self, email: &str, excluding_id: Option<&str>) -> bool;

    /// Insert a record. The caller has already checked email uniqueness.
    fn insert(&self, employee: Employee);

    /// Replace the record with this id. Returns false if it doesn't exist.
    fn replace(&self, employee: Employee) -> bool;

    /// Delete by id. Returns false if it doesn't exist.
    fn delete(&self, id: &str) -> bool;
}

/// HashMap-backed store, the default for development and tests.
#[derive(Default)]
pub struct InMemoryEmployeeStore {
    records: RwLock<HashMap<String, Employee>>,
}

impl InMemoryEmployeeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EmployeeStore for InMemoryEmployeeStore {
    fn find_all(&self) -> Vec<Employee> {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        let mut all: Vec<Employee> = records.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }

    fn find_by_id(&self, id: &str) -> Option<Employee> {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        records.get(id).cloned()
    }

    fn email_taken(&self, email: &str, excluding_id: Option<&str>) -> bool {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        records
            .values()
            .any(|e| e.email == email && Some(e.id.as_str()) != excluding_id)
    }

    fn insert(&self, employee: Employee) {
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        records.insert(employee.id.clone(), employee);
    }

    fn replace(&self, employee: Employee) -> bool {
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        match records.get_mut(&employee.id) {
            Some(slot) => {
                *slot = employee;
                true
            }
            None => false,
        }
    }

    fn delete(&self, id: &str) -> bool {
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        records.remove(id).is_some()
    }
}

// ============================================================================
// Service
// ============================================================================

/// Business rules over an [`EmployeeStore`]: email normalization and
/// uniqueness, id generation, not-found handling.
pub struct EmployeeService {
    store: Box<dyn EmployeeStore>,
}

impl EmployeeService {
    pub fn new(store: impl EmployeeStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    pub fn find_all(&self) -> Vec<Employee> {
        let employees = self.store.find_all();
        tracing::debug!(count = employees.len(), "Fetched employees");
        employees
    }

    pub fn find_by_id(&self, id: &str) -> Result<Employee, EmployeeError> {
        self.store.find_by_id(id).ok_or_else(|| {
            tracing::warn!(employee_id = %id, "Employee not found");
            EmployeeError::NotFound { id: id.to_string() }
        })
    }

    pub fn create(&self, draft: EmployeeDraft) -> Result<Employee, EmployeeError> {
        let email = normalize_email(&draft.email);
        if self.store.email_taken(&email, None) {
            tracing::warn!(email = %email, "Email already in use");
            return Err(EmployeeError::DuplicateEmail { email });
        }

        let employee = Employee {
            id: Uuid::new_v4().to_string(),
            first_name: draft.first_name,
            last_name: draft.last_name,
            email,
            department: draft.department,
            job_title: draft.job_title,
            salary: draft.salary,
            date_of_joining: draft.date_of_joining,
        };
        self.store.insert(employee.clone());
        tracing::info!(employee_id = %employee.id, "Created employee");
        Ok(employee)
    }

    pub fn update(&self, id: &str, draft: EmployeeDraft) -> Result<Employee, EmployeeError> {
        // Existence first so a bad id reports 404 even when the email also
        // collides.
        let existing = self.find_by_id(id)?;

        let email = normalize_email(&draft.email);
        if self.store.email_taken(&email, Some(id)) {
            tracing::warn!(email = %email, employee_id = %id, "Email already in use");
            return Err(EmployeeError::DuplicateEmail { email });
        }

        let employee = Employee {
            id: existing.id,
            first_name: draft.first_name,
            last_name: draft.last_name,
            email,
            department: draft.department,
            job_title: draft.job_title,
            salary: draft.salary,
            date_of_joining: draft.date_of_joining,
        };
        self.store.replace(employee.clone());
        tracing::info!(employee_id = %id, "Updated employee");
        Ok(employee)
    }

    pub fn delete(&self, id: &str) -> Result<(), EmployeeError> {
        if self.store.delete(id) {
            tracing::info!(employee_id = %id, "Deleted employee");
            Ok(())
        } else {
            tracing::warn!(employee_id = %id, "Employee not found");
            Err(EmployeeError::NotFound { id: id.to_string() })
        }
    }
}
