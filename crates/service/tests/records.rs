mod common;

use registrar_auth::Principal;
use registrar_core::{ConflictKind, DomainError, ExpectedVersion, StudentId};
use registrar_infra::store::EnrollmentReader;
use registrar_records::{Assignment, Enrollment};
use registrar_service::ErrorReport;

use common::{Campus, student_record};

#[test]
fn course_department_is_frozen_once_referenced() {
    let campus = Campus::new();
    let math = campus.department("Mathematics");
    let physics = campus.department("Physics");
    let course = campus.course("Linear Algebra", math.id);

    let mut moved = course.clone();
    moved.department_id = physics.id;
    let moved = campus
        .registrar
        .update_course(&campus.admin, course.num, moved, ExpectedVersion::Exact(1))
        .unwrap();
    assert_eq!(moved.department_id, physics.id);

    let student = campus.student(7, "seven@example.com", math.id);
    campus
        .registrar
        .create_enrollment(&campus.admin, Enrollment::new(student.id, course.num))
        .unwrap();

    let mut back = moved.clone();
    back.department_id = math.id;
    let err = campus
        .registrar
        .update_course(&campus.admin, course.num, back, ExpectedVersion::Exact(moved.version))
        .unwrap_err();
    assert!(err.violations().unwrap().has_field("department_id"));
}

#[test]
fn student_emails_are_unique_ignoring_case() {
    let campus = Campus::new();
    let physics = campus.department("Physics");
    let sara = campus.student(7, "sara@example.com", physics.id);
    let other = campus.student(8, "other@example.com", physics.id);

    let err = campus
        .registrar
        .create_student(&campus.admin, student_record(9, "SARA@example.com", physics.id))
        .unwrap_err();
    assert!(err.violations().unwrap().has_field("email"));

    let mut stolen = other.clone();
    stolen.email = "Sara@Example.com".to_string();
    let err = campus
        .registrar
        .update_student(&campus.admin, other.id, stolen, ExpectedVersion::Exact(1))
        .unwrap_err();
    assert!(err.violations().unwrap().has_field("email"));

    let mut kept = sara.clone();
    kept.name = "Sara Ali".to_string();
    campus
        .registrar
        .update_student(&campus.admin, sara.id, kept, ExpectedVersion::Exact(1))
        .unwrap();

    let registrar = &campus.registrar;
    assert!(registrar.is_student_email_unique(&campus.admin, "sara@example.com", Some(sara.id)).unwrap());
    assert!(!registrar.is_student_email_unique(&campus.admin, "sara@example.com", None).unwrap());
}

#[test]
fn department_with_members_cannot_be_deleted() {
    let campus = Campus::new();
    let physics = campus.department("Physics");
    let empty = campus.department("Astronomy");
    let student = campus.student(7, "seven@example.com", physics.id);

    let err = campus
        .registrar
        .delete_department(&campus.admin, physics.id, ExpectedVersion::Any)
        .unwrap_err();
    assert!(err.violations().unwrap().has_field("department"));

    campus
        .registrar
        .delete_department(&campus.admin, empty.id, ExpectedVersion::Exact(1))
        .unwrap();

    campus
        .registrar
        .delete_student(&campus.admin, student.id, ExpectedVersion::Exact(1))
        .unwrap();
    campus
        .registrar
        .delete_department(&campus.admin, physics.id, ExpectedVersion::Exact(1))
        .unwrap();
    assert!(campus.registrar.list_departments(&campus.admin).unwrap().is_empty());
}

#[test]
fn deleting_a_student_removes_their_enrollments() {
    let campus = Campus::new();
    let physics = campus.department("Physics");
    let optics = campus.course("Optics", physics.id);
    let mechanics = campus.course("Mechanics", physics.id);
    let seven = campus.student(7, "seven@example.com", physics.id);
    let eight = campus.student(8, "eight@example.com", physics.id);

    let engine = campus.registrar.enrollment();
    engine.enroll(&Principal::student(seven.id), seven.id, optics.num).unwrap();
    engine.enroll(&Principal::student(seven.id), seven.id, mechanics.num).unwrap();
    engine.enroll(&Principal::student(eight.id), eight.id, optics.num).unwrap();

    campus
        .registrar
        .delete_student(&campus.admin, seven.id, ExpectedVersion::Exact(1))
        .unwrap();

    let left = campus.registrar.list_enrollments(&campus.admin).unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].student_id, eight.id);
    assert!(campus.registrar.store().enrollments_for_student(seven.id).unwrap().is_empty());
}

#[test]
fn deleting_an_instructor_removes_their_assignments() {
    let campus = Campus::new();
    let physics = campus.department("Physics");
    let optics = campus.course("Optics", physics.id);
    let mona = campus.instructor("mona@example.com", 9000, physics.id);

    let assignment = campus
        .registrar
        .create_assignment(&campus.admin, Assignment::new(mona.id, optics.num))
        .unwrap();
    let err = campus
        .registrar
        .create_assignment(&campus.admin, Assignment::new(mona.id, optics.num))
        .unwrap_err();
    assert_eq!(err.conflict_kind(), Some(ConflictKind::Duplicate));

    let details = campus.registrar.instructor_details(&campus.admin, mona.id).unwrap();
    assert_eq!(details.assignments, vec![assignment]);
    assert_eq!(details.courses[0].name, "Optics");

    campus
        .registrar
        .delete_instructor(&campus.admin, mona.id, ExpectedVersion::Exact(1))
        .unwrap();
    assert!(campus.registrar.list_assignments(&campus.admin).unwrap().is_empty());
}

#[test]
fn stale_versions_are_reported_as_conflicts() {
    let campus = Campus::new();
    let physics = campus.department("Physics");
    let course = campus.course("Optics", physics.id);

    let mut first = course.clone();
    first.description = Some("Light and lenses".to_string());
    campus
        .registrar
        .update_course(&campus.admin, course.num, first, ExpectedVersion::Exact(1))
        .unwrap();

    let mut second = course.clone();
    second.description = Some("Waves".to_string());
    let err = campus
        .registrar
        .update_course(&campus.admin, course.num, second, ExpectedVersion::Exact(1))
        .unwrap_err();
    assert!(err.is_retryable());
    let report = ErrorReport::from(&err);
    assert_eq!(report.status, 409);
    assert_eq!(report.message, "This record was modified by another user. Please reload and try again");

    let current = campus.registrar.course(&campus.admin, course.num).unwrap();
    assert_eq!(current.course.description.as_deref(), Some("Light and lenses"));
    assert_eq!(current.course.version, 2);
}

#[test]
fn path_and_body_ids_must_agree() {
    let campus = Campus::new();
    let physics = campus.department("Physics");
    let seven = campus.student(7, "seven@example.com", physics.id);

    let err = campus
        .registrar
        .update_student(&campus.admin, StudentId::new(8), seven, ExpectedVersion::Any)
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { id: 8, .. }));
}

#[test]
fn grades_stay_within_the_course_degree() {
    let campus = Campus::new();
    let physics = campus.department("Physics");
    let optics = campus.course("Optics", physics.id);
    let seven = campus.student(7, "seven@example.com", physics.id);
    let enrollment = campus
        .registrar
        .create_enrollment(&campus.admin, Enrollment::new(seven.id, optics.num))
        .unwrap();

    let err = campus.registrar.set_grade(&campus.admin, enrollment.id, 101).unwrap_err();
    assert!(err.violations().unwrap().has_field("grade"));

    let graded = campus.registrar.set_grade(&campus.admin, enrollment.id, 100).unwrap();
    let cleared = campus.registrar.set_grade(&campus.admin, graded.id, 0).unwrap();
    assert!(!cleared.is_graded());

    campus
        .registrar
        .delete_enrollment(&campus.admin, enrollment.id, ExpectedVersion::Exact(cleared.version))
        .unwrap();
    assert!(campus.registrar.list_enrollments(&campus.admin).unwrap().is_empty());
}

#[test]
fn duplicate_enrollment_is_a_conflict_on_every_path() {
    let campus = Campus::new();
    let physics = campus.department("Physics");
    let optics = campus.course("Optics", physics.id);
    let seven = campus.student(7, "seven@example.com", physics.id);

    campus
        .registrar
        .create_enrollment(&campus.admin, Enrollment::new(seven.id, optics.num))
        .unwrap();
    let admin = campus
        .registrar
        .create_enrollment(&campus.admin, Enrollment::new(seven.id, optics.num))
        .unwrap_err();
    assert_eq!(admin.conflict_kind(), Some(ConflictKind::Duplicate));
    assert!(admin.violations().is_none());
    assert_eq!(ErrorReport::from(&admin).status, 409);

    let me = Principal::student(seven.id);
    let own = campus.registrar.enrollment().enroll(&me, seven.id, optics.num).unwrap_err();
    assert_eq!(own.conflict_kind(), admin.conflict_kind());
    assert_eq!(campus.registrar.list_enrollments(&campus.admin).unwrap().len(), 1);
}

#[test]
fn failed_commit_leaves_no_trace() {
    let campus = Campus::new();
    let physics = campus.department("Physics");
    let seven = campus.student(7, "seven@example.com", physics.id);
    campus.course("Optics", physics.id);

    campus.registrar.store().poison_next_commit();
    let err = campus
        .registrar
        .delete_student(&campus.admin, seven.id, ExpectedVersion::Exact(1))
        .unwrap_err();
    assert!(matches!(err, DomainError::Persistence(_)));
    assert_eq!(ErrorReport::from(&err).status, 500);

    assert_eq!(campus.registrar.list_students(&campus.admin).unwrap().len(), 1);
}
