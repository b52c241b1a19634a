#![allow(dead_code)]

use registrar_auth::Principal;
use registrar_core::{CourseNum, DepartmentId, InstructorId, StudentId};
use registrar_infra::{InMemoryRecordStore, OutboxNotifier, RecordStore, RegistrarConfig, UnitOfWork};
use registrar_records::{Course, Department, Instructor, Student};
use registrar_service::Registrar;

pub type TestRegistrar = Registrar<InMemoryRecordStore, OutboxNotifier>;

/// A registrar over an empty in-memory store, driven as an administrator.
pub struct Campus {
    pub registrar: TestRegistrar,
    pub admin: Principal,
}

impl Campus {
    pub fn new() -> Self {
        registrar_observability::init_for_tests();
        let config = RegistrarConfig::default();
        let notifier = OutboxNotifier::new(config.notifications.clone());
        Self {
            registrar: Registrar::new(InMemoryRecordStore::new(), notifier, config),
            admin: Principal::admin(),
        }
    }

    pub fn department(&self, name: &str) -> Department {
        self.registrar
            .create_department(&self.admin, Department::new(name, "Dr. Head", "Main Building"))
            .unwrap()
    }

    pub fn course(&self, name: &str, department: DepartmentId) -> Course {
        self.registrar
            .create_course(&self.admin, Course::new(name, 100, 50, department))
            .unwrap()
    }

    /// Insert a course under a fixed number, bypassing the service.
    pub fn course_numbered(&self, num: u64, name: &str, department: DepartmentId) -> Course {
        let mut course = Course::new(name, 100, 50, department);
        course.num = CourseNum::new(num);
        let mut unit = UnitOfWork::new();
        unit.insert(course.clone());
        self.registrar.store().commit(unit).unwrap();
        course.version = 1;
        course
    }

    pub fn student(&self, id: u64, email: &str, department: DepartmentId) -> Student {
        self.registrar
            .create_student(&self.admin, student_record(id, email, department))
            .unwrap()
    }

    pub fn instructor(&self, email: &str, salary: u64, department: DepartmentId) -> Instructor {
        self.registrar
            .create_instructor(&self.admin, instructor_record(email, salary, department))
            .unwrap()
    }
}

pub fn student_record(id: u64, email: &str, department: DepartmentId) -> Student {
    Student {
        id: StudentId::new(id),
        name: "Sara Mahmoud".to_string(),
        email: email.to_string(),
        address: "5 Tahrir Square".to_string(),
        gender: "Female".to_string(),
        age: 20,
        image: None,
        department_id: department,
        version: 0,
    }
}

pub fn instructor_record(email: &str, salary: u64, department: DepartmentId) -> Instructor {
    Instructor {
        id: InstructorId::UNASSIGNED,
        name: "Mona Adel".to_string(),
        email: email.to_string(),
        address: "12 Nile Street".to_string(),
        age: 40,
        salary,
        rating: 80,
        department_id: department,
        version: 0,
    }
}
