//! Starter catalog for development and demos.

use anyhow::{Context, Result};
use chrono::Utc;

use registrar_auth::{Role, UserAccount};
use registrar_core::{DepartmentId, RecordKind};
use registrar_records::{Course, Department};

use crate::store::{RecordStore, UnitOfWork};

const DEPARTMENTS: [(&str, &str, &str); 3] = [
    ("Computer Science", "Dr. Smith", "Building A"),
    ("Mathematics", "Dr. Jones", "Building B"),
    ("Physics", "Dr. Brown", "Building C"),
];

/// (name, description, degree, min degree, index into `DEPARTMENTS`)
const COURSES: [(&str, &str, u32, u32, usize); 6] = [
    ("Intro to Programming", "Programming basics", 100, 50, 0),
    ("Data Structures", "Advanced data structures", 110, 55, 0),
    ("Calculus I", "Limits and derivatives", 100, 50, 1),
    ("Linear Algebra", "Matrices and vectors", 110, 55, 1),
    ("Classical Mechanics", "Newtonian physics", 120, 60, 2),
    ("Electromagnetism", "Maxwell's equations", 120, 60, 2),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub departments: usize,
    pub courses: usize,
}

impl SeedReport {
    pub fn is_empty(&self) -> bool {
        self.departments == 0 && self.courses == 0
    }
}

/// Insert the starter departments and courses in one commit.
///
/// Skipped entirely when any department already exists.
pub fn seed_catalog<S>(store: &S) -> Result<SeedReport>
where
    S: RecordStore + ?Sized,
{
    if !store.departments().context("failed to list departments")?.is_empty() {
        tracing::info!("catalog already present; skipping seed");
        return Ok(SeedReport::default());
    }

    let mut unit = UnitOfWork::new();
    let mut department_ids = Vec::with_capacity(DEPARTMENTS.len());
    for (name, manager, location) in DEPARTMENTS {
        let id = store
            .reserve_id(RecordKind::Department)
            .context("failed to reserve department id")?;
        let mut department = Department::new(name, manager, location);
        department.id = DepartmentId::new(id);
        department_ids.push(department.id);
        unit.insert(department);
    }
    for (name, description, degree, min_degree, dept) in COURSES {
        unit.insert(Course::new(name, degree, min_degree, department_ids[dept]).with_description(description));
    }

    store.commit(unit).context("failed to commit seed catalog")?;
    let report = SeedReport {
        departments: DEPARTMENTS.len(),
        courses: COURSES.len(),
    };
    tracing::info!(departments = report.departments, courses = report.courses, "seeded catalog");
    Ok(report)
}

/// Create a confirmed administrator account unless the email is taken.
pub fn seed_admin<S>(store: &S, email: &str) -> Result<Option<UserAccount>>
where
    S: RecordStore + ?Sized,
{
    if store
        .account_by_email(email)
        .context("failed to look up admin account")?
        .is_some()
    {
        return Ok(None);
    }

    let account = UserAccount::confirmed(email, "System", "Administrator", Role::Admin, Utc::now());
    let mut unit = UnitOfWork::new();
    unit.insert(account.clone());
    store.commit(unit).context("failed to commit admin account")?;
    tracing::info!(email = %email, "seeded admin account");
    Ok(Some(account))
}
