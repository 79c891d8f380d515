use chrono::{NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

use super::LeaveRepository;
use crate::{
    error::AppError,
    model::{
        employee::Employee,
        leave_application::{LeaveApplication, NewLeaveApplication},
        leave_type::LeaveType,
    },
};

/// In-memory stand-in for the MySQL repository. Enforces the same
/// protocol number uniqueness the unique index does.
#[derive(Default)]
pub struct MemoryLeaveRepository {
    employees: Mutex<HashMap<u64, Employee>>,
    leave_types: Mutex<HashMap<u64, LeaveType>>,
    applications: Mutex<HashMap<u64, LeaveApplication>>,
    next_id: Mutex<u64>,
}

impl MemoryLeaveRepository {
    pub fn with_employee(self, id: u64) -> Self {
        let employee = Employee {
            id,
            user_id: 100 + id,
            organization_id: None,
            first_name: format!("First{id}"),
            last_name: format!("Last{id}"),
            fathers_name: "Ioannis".to_string(),
            am: format!("AM{id:04}"),
            afm: format!("AFM{id:06}"),
            hire_date: NaiveDate::from_ymd_opt(2015, 9, 1).expect("valid date"),
            specialty: "PE03".to_string(),
            telephone: String::new(),
            mobile: String::new(),
            is_hr: false,
            is_director: false,
        };
        self.employees
            .lock()
            .expect("repository mutex poisoned")
            .insert(id, employee);
        self
    }

    pub fn with_leave_type(self, leave_type: LeaveType) -> Self {
        self.leave_types
            .lock()
            .expect("repository mutex poisoned")
            .insert(leave_type.id, leave_type);
        self
    }

    pub fn application_count(&self) -> usize {
        self.applications
            .lock()
            .expect("repository mutex poisoned")
            .len()
    }
}

impl LeaveRepository for MemoryLeaveRepository {
    async fn employee(&self, id: u64) -> Result<Option<Employee>, AppError> {
        let guard = self.employees.lock().expect("repository mutex poisoned");
        Ok(guard.get(&id).cloned())
    }

    async fn leave_type(&self, id: u64) -> Result<Option<LeaveType>, AppError> {
        let guard = self.leave_types.lock().expect("repository mutex poisoned");
        Ok(guard.get(&id).cloned())
    }

    async fn application(&self, id: u64) -> Result<Option<LeaveApplication>, AppError> {
        let guard = self.applications.lock().expect("repository mutex poisoned");
        Ok(guard.get(&id).cloned())
    }

    async fn insert_application(
        &self,
        application: &NewLeaveApplication,
    ) -> Result<LeaveApplication, AppError> {
        let id = {
            let mut next = self.next_id.lock().expect("repository mutex poisoned");
            *next += 1;
            *next
        };
        let now = Utc::now();
        let stored = LeaveApplication {
            id,
            employee_id: application.employee_id,
            leave_type_id: application.leave_type_id,
            start_date: application.start_date,
            end_date: application.end_date,
            leave_days_count: application.duration.leave_days_count,
            leave_months_count: application.duration.leave_months_count,
            reason: application.reason.clone(),
            status: application.status,
            rejection_reason: None,
            protocol_number: None,
            created_at: now,
            updated_at: now,
        };
        self.applications
            .lock()
            .expect("repository mutex poisoned")
            .insert(id, stored.clone());
        Ok(stored)
    }

    async fn save_application(&self, application: &LeaveApplication) -> Result<(), AppError> {
        let mut guard = self.applications.lock().expect("repository mutex poisoned");
        if let Some(protocol_number) = &application.protocol_number {
            let clash = guard.values().any(|other| {
                other.id != application.id
                    && other.protocol_number.as_deref() == Some(protocol_number.as_str())
            });
            if clash {
                return Err(AppError::DuplicateProtocol {
                    protocol_number: protocol_number.clone(),
                });
            }
        }
        match guard.get_mut(&application.id) {
            Some(stored) => {
                *stored = LeaveApplication {
                    updated_at: Utc::now(),
                    ..application.clone()
                };
                Ok(())
            }
            None => Err(AppError::NotFound { entity: "leave application" }),
        }
    }

    async fn protocol_number_taken(
        &self,
        protocol_number: &str,
        except_id: u64,
    ) -> Result<bool, AppError> {
        let guard = self.applications.lock().expect("repository mutex poisoned");
        Ok(guard.values().any(|a| {
            a.id != except_id && a.protocol_number.as_deref() == Some(protocol_number)
        }))
    }
}
