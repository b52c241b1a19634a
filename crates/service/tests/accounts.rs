mod common;

use chrono::Utc;
use registrar_auth::{Principal, RegisterAccount, Role};
use registrar_core::{DomainError, RecordKind};
use uuid::Uuid;

use common::{Campus, instructor_record, student_record};

fn registration(email: &str, role: Role) -> RegisterAccount {
    RegisterAccount {
        email: email.to_string(),
        first_name: "Nour".to_string(),
        last_name: "Hassan".to_string(),
        role,
        occurred_at: Utc::now(),
    }
}

#[test]
fn registration_mails_a_confirmation_link() {
    let campus = Campus::new();
    let account = campus
        .registrar
        .register_account(registration("nour@example.com", Role::Student))
        .unwrap();
    let token = account.confirmation_token.unwrap();

    let message = campus.registrar.notifier().last_message().unwrap();
    assert_eq!(message.to, "nour@example.com");
    assert_eq!(message.subject, "Confirm your email");
    assert!(message.html_body.contains(&format!("user_id={}&token={token}", account.id)));

    assert_eq!(campus.registrar.principal_for(account.id).unwrap(), Principal::anonymous());

    let confirmed = campus.registrar.confirm_email(account.id, token).unwrap();
    assert!(confirmed.email_confirmed);
    assert_eq!(
        campus.registrar.principal_for(account.id).unwrap(),
        Principal::unlinked(Role::Student)
    );
}

#[test]
fn registration_rejects_duplicates_and_admins() {
    let campus = Campus::new();
    campus
        .registrar
        .register_account(registration("nour@example.com", Role::Student))
        .unwrap();

    let dup = campus
        .registrar
        .register_account(registration("NOUR@example.com", Role::Instructor))
        .unwrap_err();
    assert!(dup.violations().unwrap().has_field("email"));

    let admin = campus
        .registrar
        .register_account(registration("boss@example.com", Role::Admin))
        .unwrap_err();
    assert!(admin.violations().unwrap().has_field("role"));
}

#[test]
fn registration_rejects_malformed_emails() {
    let campus = Campus::new();
    for email in ["a@@example.com", "x@y@z.com", "nobody@localhost"] {
        let err = campus
            .registrar
            .register_account(registration(email, Role::Student))
            .unwrap_err();
        assert!(err.violations().unwrap().has_field("email"), "{email}");
    }
    assert!(campus.registrar.notifier().messages().is_empty());
}

#[test]
fn failed_notification_keeps_the_account() {
    let campus = Campus::new();
    campus.registrar.notifier().fail_next_send();

    let account = campus
        .registrar
        .register_account(registration("nour@example.com", Role::Student))
        .unwrap();
    assert!(campus.registrar.notifier().messages().is_empty());
    assert!(campus.registrar.principal_for(account.id).is_ok());
}

#[test]
fn wrong_token_is_rejected() {
    let campus = Campus::new();
    let account = campus
        .registrar
        .register_account(registration("nour@example.com", Role::Student))
        .unwrap();

    let err = campus.registrar.confirm_email(account.id, Uuid::now_v7()).unwrap_err();
    assert!(err.violations().unwrap().has_field("token"));

    let unknown = campus
        .registrar
        .confirm_email(registrar_auth::AccountId::new(), Uuid::now_v7())
        .unwrap_err();
    assert_eq!(unknown, DomainError::NotFound { kind: RecordKind::Account, id: 0 });
}

#[test]
fn provisioning_links_the_account_once() {
    let campus = Campus::new();
    let physics = campus.department("Physics");
    let account = campus
        .registrar
        .register_account(registration("nour@example.com", Role::Student))
        .unwrap();
    let token = account.confirmation_token.unwrap();
    campus.registrar.confirm_email(account.id, token).unwrap();

    let (linked, student) = campus
        .registrar
        .provision_student(&campus.admin, account.id, student_record(0, "nour@example.com", physics.id))
        .unwrap();
    assert!(student.id.is_assigned());
    assert_eq!(linked.linked_student_id(), Some(student.id));

    let me = campus.registrar.principal_for(account.id).unwrap();
    assert_eq!(me, Principal::student(student.id));
    assert_eq!(campus.registrar.my_profile(&me).unwrap().student.id, student.id);

    let again = campus
        .registrar
        .provision_student(&campus.admin, account.id, student_record(0, "second@example.com", physics.id))
        .unwrap_err();
    assert!(matches!(again, DomainError::Conflict { .. }));
    assert_eq!(campus.registrar.list_students(&campus.admin).unwrap().len(), 1);
}

#[test]
fn instructor_accounts_link_to_instructor_records() {
    let campus = Campus::new();
    let physics = campus.department("Physics");
    let account = campus
        .registrar
        .register_account(registration("mona@example.com", Role::Instructor))
        .unwrap();

    let err = campus
        .registrar
        .provision_student(&campus.admin, account.id, student_record(0, "mona@example.com", physics.id))
        .unwrap_err();
    assert!(err.violations().unwrap().has_field("role"));

    let (linked, instructor) = campus
        .registrar
        .provision_instructor(&campus.admin, account.id, instructor_record("mona@example.com", 9000, physics.id))
        .unwrap();
    assert_eq!(linked.linked_instructor_id(), Some(instructor.id));

    let outsider = Principal::student(registrar_core::StudentId::new(1));
    let denied = campus
        .registrar
        .provision_instructor(&outsider, account.id, instructor_record("x@example.com", 9000, physics.id))
        .unwrap_err();
    assert_eq!(denied, DomainError::Forbidden);
}
