use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use registrar_auth::{AccountId, UserAccount};
use registrar_core::{
    AssignmentId, CourseNum, DepartmentId, EnrollmentId, ExpectedVersion, InstructorId, Record, RecordKind,
    StudentId,
};
use registrar_records::{Assignment, Course, Department, DepartmentDependents, Enrollment, Instructor, Student};

use super::r#trait::{
    AccountReader, AssignmentReader, CommitReceipt, CourseReader, DepartmentReader, EnrollmentReader,
    InstructorReader, RecordStore, StoreError, StoreResult, StudentReader,
};
use super::unit_of_work::{Change, RecordData, RecordKey, UnitOfWork};

/// Case-folded form used for every case-insensitive key.
fn fold(s: &str) -> String {
    s.trim().to_lowercase()
}

// ─────────────────────────────────────────────────────────────────────────────
// Rows
// ─────────────────────────────────────────────────────────────────────────────

/// What the store needs to know about a record to stamp it.
trait Row: Record + Clone {
    /// Numeric identity, if the record kind uses store-assigned integers.
    fn numeric_id(&self) -> Option<u64>;
    fn assign_id(&mut self, id: u64);
    fn set_version(&mut self, version: u64);
}

macro_rules! int_row {
    ($record:ty, $field:ident, $id:ty) => {
        impl Row for $record {
            fn numeric_id(&self) -> Option<u64> {
                Some(self.$field.get())
            }

            fn assign_id(&mut self, id: u64) {
                self.$field = <$id>::new(id);
            }

            fn set_version(&mut self, version: u64) {
                self.version = version;
            }
        }
    };
}

int_row!(Department, id, DepartmentId);
int_row!(Course, num, CourseNum);
int_row!(Instructor, id, InstructorId);
int_row!(Student, id, StudentId);
int_row!(Enrollment, id, EnrollmentId);
int_row!(Assignment, id, AssignmentId);

impl Row for UserAccount {
    fn numeric_id(&self) -> Option<u64> {
        None
    }

    fn assign_id(&mut self, _id: u64) {}

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tables
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
struct Tables {
    departments: BTreeMap<DepartmentId, Department>,
    courses: BTreeMap<CourseNum, Course>,
    instructors: BTreeMap<InstructorId, Instructor>,
    students: BTreeMap<StudentId, Student>,
    enrollments: BTreeMap<EnrollmentId, Enrollment>,
    assignments: BTreeMap<AssignmentId, Assignment>,
    accounts: BTreeMap<AccountId, UserAccount>,
    sequences: HashMap<RecordKind, u64>,
}

impl Tables {
    fn next_id(&mut self, kind: RecordKind) -> u64 {
        let seq = self.sequences.entry(kind).or_insert(0);
        *seq += 1;
        *seq
    }

    fn apply(&mut self, change: Change, receipt: &mut CommitReceipt) -> StoreResult<()> {
        match change {
            Change::Insert(data) => {
                let kind = data.kind();
                let id = match data {
                    RecordData::Department(r) => insert_row(&mut self.departments, &mut self.sequences, r)?,
                    RecordData::Course(r) => insert_row(&mut self.courses, &mut self.sequences, r)?,
                    RecordData::Instructor(r) => insert_row(&mut self.instructors, &mut self.sequences, r)?,
                    RecordData::Student(r) => insert_row(&mut self.students, &mut self.sequences, r)?,
                    RecordData::Enrollment(r) => insert_row(&mut self.enrollments, &mut self.sequences, r)?,
                    RecordData::Assignment(r) => insert_row(&mut self.assignments, &mut self.sequences, r)?,
                    RecordData::Account(r) => insert_row(&mut self.accounts, &mut self.sequences, r)?,
                };
                if let Some(id) = id {
                    receipt.record_insert(kind, id);
                }
            }
            Change::Update(data, expected) => match data {
                RecordData::Department(r) => update_row(&mut self.departments, r, expected)?,
                RecordData::Course(r) => update_row(&mut self.courses, r, expected)?,
                RecordData::Instructor(r) => update_row(&mut self.instructors, r, expected)?,
                RecordData::Student(r) => update_row(&mut self.students, r, expected)?,
                RecordData::Enrollment(r) => update_row(&mut self.enrollments, r, expected)?,
                RecordData::Assignment(r) => update_row(&mut self.assignments, r, expected)?,
                RecordData::Account(r) => update_row(&mut self.accounts, r, expected)?,
            },
            Change::Delete(key, expected) => match key {
                RecordKey::Department(id) => delete_row(&mut self.departments, id, expected)?,
                RecordKey::Course(id) => delete_row(&mut self.courses, id, expected)?,
                RecordKey::Instructor(id) => delete_row(&mut self.instructors, id, expected)?,
                RecordKey::Student(id) => delete_row(&mut self.students, id, expected)?,
                RecordKey::Enrollment(id) => delete_row(&mut self.enrollments, id, expected)?,
                RecordKey::Assignment(id) => delete_row(&mut self.assignments, id, expected)?,
                RecordKey::Account(id) => delete_row(&mut self.accounts, id, expected)?,
            },
        }
        Ok(())
    }

    /// Uniqueness and reference constraints over the whole table set.
    fn check_constraints(&self) -> StoreResult<()> {
        let mut department_names = HashSet::new();
        for d in self.departments.values() {
            if !department_names.insert(fold(&d.name)) {
                return Err(StoreError::Constraint(format!("department name '{}' is already taken", d.name)));
            }
        }

        let mut course_names = HashSet::new();
        for c in self.courses.values() {
            if !self.departments.contains_key(&c.department_id) {
                return Err(StoreError::Constraint(format!(
                    "course {} references missing department {}",
                    c.num, c.department_id
                )));
            }
            if !course_names.insert((c.department_id, fold(&c.name))) {
                return Err(StoreError::Constraint(format!(
                    "course name '{}' is already taken in department {}",
                    c.name, c.department_id
                )));
            }
        }

        let mut instructor_emails = HashSet::new();
        for i in self.instructors.values() {
            if !self.departments.contains_key(&i.department_id) {
                return Err(StoreError::Constraint(format!(
                    "instructor {} references missing department {}",
                    i.id, i.department_id
                )));
            }
            if !instructor_emails.insert(fold(&i.email)) {
                return Err(StoreError::Constraint(format!("instructor email '{}' is already taken", i.email)));
            }
        }

        let mut student_emails = HashSet::new();
        for s in self.students.values() {
            if !self.departments.contains_key(&s.department_id) {
                return Err(StoreError::Constraint(format!(
                    "student {} references missing department {}",
                    s.id, s.department_id
                )));
            }
            if !student_emails.insert(fold(&s.email)) {
                return Err(StoreError::Constraint(format!("student email '{}' is already taken", s.email)));
            }
        }

        let mut enrolled = HashSet::new();
        for e in self.enrollments.values() {
            if !self.students.contains_key(&e.student_id) || !self.courses.contains_key(&e.course_num) {
                return Err(StoreError::Constraint(format!(
                    "enrollment {} references a missing student or course",
                    e.id
                )));
            }
            if !enrolled.insert((e.student_id, e.course_num)) {
                return Err(StoreError::Constraint(format!(
                    "student {} is already enrolled in course {}",
                    e.student_id, e.course_num
                )));
            }
        }

        let mut assigned = HashSet::new();
        for a in self.assignments.values() {
            if !self.instructors.contains_key(&a.instructor_id) || !self.courses.contains_key(&a.course_num) {
                return Err(StoreError::Constraint(format!(
                    "assignment {} references a missing instructor or course",
                    a.id
                )));
            }
            if !assigned.insert((a.instructor_id, a.course_num)) {
                return Err(StoreError::Constraint(format!(
                    "instructor {} is already assigned to course {}",
                    a.instructor_id, a.course_num
                )));
            }
        }

        let mut account_emails = HashSet::new();
        for a in self.accounts.values() {
            if !account_emails.insert(fold(&a.email)) {
                return Err(StoreError::Constraint(format!("account email '{}' is already registered", a.email)));
            }
        }

        Ok(())
    }
}

fn insert_row<R>(
    table: &mut BTreeMap<R::Id, R>,
    sequences: &mut HashMap<RecordKind, u64>,
    mut row: R,
) -> StoreResult<Option<u64>>
where
    R: Row,
    R::Id: Ord + core::fmt::Display,
{
    let seq = sequences.entry(R::KIND).or_insert(0);
    match row.numeric_id() {
        Some(0) => {
            *seq += 1;
            row.assign_id(*seq);
        }
        Some(explicit) => *seq = (*seq).max(explicit),
        None => {}
    }

    let id = row.id();
    if table.contains_key(&id) {
        return Err(StoreError::Constraint(format!("{} {id} already exists", R::KIND)));
    }
    row.set_version(1);
    let numeric = row.numeric_id();
    table.insert(id, row);
    Ok(numeric)
}

fn update_row<R>(table: &mut BTreeMap<R::Id, R>, mut row: R, expected: ExpectedVersion) -> StoreResult<()>
where
    R: Row,
    R::Id: Ord + core::fmt::Display,
{
    let id = row.id();
    let current = table
        .get(&id)
        .map(|r| r.version())
        .ok_or_else(|| StoreError::not_found(R::KIND, id))?;
    if !expected.matches(current) {
        return Err(StoreError::Concurrency(format!(
            "{} {id}: expected {expected:?}, found {current}",
            R::KIND
        )));
    }
    row.set_version(current + 1);
    table.insert(id, row);
    Ok(())
}

fn delete_row<R>(table: &mut BTreeMap<R::Id, R>, id: R::Id, expected: ExpectedVersion) -> StoreResult<()>
where
    R: Row,
    R::Id: Ord + core::fmt::Display,
{
    let current = table
        .get(&id)
        .map(|r| r.version())
        .ok_or_else(|| StoreError::not_found(R::KIND, id))?;
    if !expected.matches(current) {
        return Err(StoreError::Concurrency(format!(
            "{} {id}: expected {expected:?}, found {current}",
            R::KIND
        )));
    }
    table.remove(&id);
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Store
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory record store.
///
/// Intended for tests/dev. Every commit applies to a copy of the tables under
/// the write lock and swaps it in only when all changes and constraints pass.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    tables: RwLock<Tables>,
    fail_next_commit: AtomicBool,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next commit fail with `StoreError::Unavailable` without
    /// applying anything.
    pub fn poison_next_commit(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }

    fn read<T>(&self, f: impl FnOnce(&Tables) -> T) -> StoreResult<T> {
        let tables = self
            .tables
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;
        Ok(f(&tables))
    }
}

impl RecordStore for InMemoryRecordStore {
    fn commit(&self, unit: UnitOfWork) -> StoreResult<CommitReceipt> {
        if self.fail_next_commit.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Unavailable("simulated store failure".to_string()));
        }
        if unit.is_empty() {
            return Ok(CommitReceipt::default());
        }

        let mut tables = self
            .tables
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;

        let mut next = tables.clone();
        let mut receipt = CommitReceipt::default();
        for change in unit.into_changes() {
            next.apply(change, &mut receipt)?;
        }
        next.check_constraints()?;

        *tables = next;
        Ok(receipt)
    }

    fn reserve_id(&self, kind: RecordKind) -> StoreResult<u64> {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;
        Ok(tables.next_id(kind))
    }
}

impl DepartmentReader for InMemoryRecordStore {
    fn department(&self, id: DepartmentId) -> StoreResult<Option<Department>> {
        self.read(|t| t.departments.get(&id).cloned())
    }

    fn departments(&self) -> StoreResult<Vec<Department>> {
        self.read(|t| t.departments.values().cloned().collect())
    }

    fn department_by_name(&self, name: &str) -> StoreResult<Vec<Department>> {
        let key = fold(name);
        self.read(|t| t.departments.values().filter(|d| fold(&d.name) == key).cloned().collect())
    }

    fn department_dependents(&self, id: DepartmentId) -> StoreResult<DepartmentDependents> {
        self.read(|t| DepartmentDependents {
            courses: t.courses.values().filter(|c| c.department_id == id).count(),
            instructors: t.instructors.values().filter(|i| i.department_id == id).count(),
            students: t.students.values().filter(|s| s.department_id == id).count(),
        })
    }
}

impl CourseReader for InMemoryRecordStore {
    fn course(&self, num: CourseNum) -> StoreResult<Option<Course>> {
        self.read(|t| t.courses.get(&num).cloned())
    }

    fn courses(&self) -> StoreResult<Vec<Course>> {
        self.read(|t| t.courses.values().cloned().collect())
    }

    fn courses_in_department(&self, department_id: DepartmentId) -> StoreResult<Vec<Course>> {
        self.read(|t| {
            t.courses
                .values()
                .filter(|c| c.department_id == department_id)
                .cloned()
                .collect()
        })
    }

    fn course_has_relations(&self, num: CourseNum) -> StoreResult<bool> {
        self.read(|t| {
            t.enrollments.values().any(|e| e.course_num == num) || t.assignments.values().any(|a| a.course_num == num)
        })
    }
}

impl InstructorReader for InMemoryRecordStore {
    fn instructor(&self, id: InstructorId) -> StoreResult<Option<Instructor>> {
        self.read(|t| t.instructors.get(&id).cloned())
    }

    fn instructors(&self) -> StoreResult<Vec<Instructor>> {
        self.read(|t| t.instructors.values().cloned().collect())
    }

    fn instructors_by_email(&self, email: &str) -> StoreResult<Vec<Instructor>> {
        let key = fold(email);
        self.read(|t| t.instructors.values().filter(|i| fold(&i.email) == key).cloned().collect())
    }

    fn instructors_in_department(&self, department_id: DepartmentId) -> StoreResult<Vec<Instructor>> {
        self.read(|t| {
            t.instructors
                .values()
                .filter(|i| i.department_id == department_id)
                .cloned()
                .collect()
        })
    }
}

impl StudentReader for InMemoryRecordStore {
    fn student(&self, id: StudentId) -> StoreResult<Option<Student>> {
        self.read(|t| t.students.get(&id).cloned())
    }

    fn students(&self) -> StoreResult<Vec<Student>> {
        self.read(|t| t.students.values().cloned().collect())
    }

    fn students_by_email(&self, email: &str) -> StoreResult<Vec<Student>> {
        let key = fold(email);
        self.read(|t| t.students.values().filter(|s| fold(&s.email) == key).cloned().collect())
    }

    fn students_in_department(&self, department_id: DepartmentId) -> StoreResult<Vec<Student>> {
        self.read(|t| {
            t.students
                .values()
                .filter(|s| s.department_id == department_id)
                .cloned()
                .collect()
        })
    }
}

impl EnrollmentReader for InMemoryRecordStore {
    fn enrollment(&self, id: EnrollmentId) -> StoreResult<Option<Enrollment>> {
        self.read(|t| t.enrollments.get(&id).cloned())
    }

    fn enrollments(&self) -> StoreResult<Vec<Enrollment>> {
        self.read(|t| t.enrollments.values().cloned().collect())
    }

    fn enrollment_for(&self, student_id: StudentId, course_num: CourseNum) -> StoreResult<Option<Enrollment>> {
        self.read(|t| {
            t.enrollments
                .values()
                .find(|e| e.student_id == student_id && e.course_num == course_num)
                .cloned()
        })
    }

    fn enrollments_for_student(&self, student_id: StudentId) -> StoreResult<Vec<Enrollment>> {
        self.read(|t| {
            t.enrollments
                .values()
                .filter(|e| e.student_id == student_id)
                .cloned()
                .collect()
        })
    }

    fn enrollments_for_course(&self, course_num: CourseNum) -> StoreResult<Vec<Enrollment>> {
        self.read(|t| {
            t.enrollments
                .values()
                .filter(|e| e.course_num == course_num)
                .cloned()
                .collect()
        })
    }
}

impl AssignmentReader for InMemoryRecordStore {
    fn assignment(&self, id: AssignmentId) -> StoreResult<Option<Assignment>> {
        self.read(|t| t.assignments.get(&id).cloned())
    }

    fn assignments(&self) -> StoreResult<Vec<Assignment>> {
        self.read(|t| t.assignments.values().cloned().collect())
    }

    fn assignment_for(&self, instructor_id: InstructorId, course_num: CourseNum) -> StoreResult<Option<Assignment>> {
        self.read(|t| {
            t.assignments
                .values()
                .find(|a| a.instructor_id == instructor_id && a.course_num == course_num)
                .cloned()
        })
    }

    fn assignments_for_instructor(&self, instructor_id: InstructorId) -> StoreResult<Vec<Assignment>> {
        self.read(|t| {
            t.assignments
                .values()
                .filter(|a| a.instructor_id == instructor_id)
                .cloned()
                .collect()
        })
    }

    fn assignments_for_course(&self, course_num: CourseNum) -> StoreResult<Vec<Assignment>> {
        self.read(|t| {
            t.assignments
                .values()
                .filter(|a| a.course_num == course_num)
                .cloned()
                .collect()
        })
    }
}

impl AccountReader for InMemoryRecordStore {
    fn account(&self, id: AccountId) -> StoreResult<Option<UserAccount>> {
        self.read(|t| t.accounts.get(&id).cloned())
    }

    fn account_by_email(&self, email: &str) -> StoreResult<Option<UserAccount>> {
        let key = fold(email);
        self.read(|t| t.accounts.values().find(|a| fold(&a.email) == key).cloned())
    }
}
