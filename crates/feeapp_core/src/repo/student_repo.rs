//! Student store contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist students and assign stable ids on first save.
//! - Rebuild persisted students in insertion order.
//!
//! # Invariants
//! - A saved student's id never changes.
//! - `save` on a student with an id is a full overwrite of mutable fields.
//! - `load_all` fails the whole load on the first malformed row.

use crate::db::DbError;
use crate::model::student::{
    AdmissionDateError, Student, StudentError, StudentId, StudentValidationError,
};
use log::{debug, warn};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const STUDENT_SELECT_SQL: &str = "SELECT
    id,
    name,
    phone,
    admission_date
FROM students";

pub type RepoResult<T> = Result<T, RepoError>;

/// Student store error.
#[derive(Debug)]
pub enum RepoError {
    /// Write rejected before touching storage.
    Validation(StudentValidationError),
    /// A stored admission date could not be parsed.
    Parse {
        id: StudentId,
        source: AdmissionDateError,
    },
    /// Backing storage failure.
    Db(DbError),
    NotFound(StudentId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Parse { id, source } => write!(f, "student {id}: {source}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "student not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted student data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Parse { source, .. } => Some(source),
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<StudentValidationError> for RepoError {
    fn from(value: StudentValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl RepoError {
    /// Whether this error describes one bad row rather than the store itself.
    pub fn is_row_level(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::InvalidData(_))
    }
}

/// A stored row left out of a lenient load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub id: StudentId,
    pub reason: String,
}

/// Result of [`StudentRepository::load_all_lenient`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LenientLoad {
    pub students: Vec<Student>,
    pub skipped: Vec<SkippedRow>,
}

/// Repository interface for the student store.
pub trait StudentRepository {
    /// Inserts a new student or overwrites an existing one by id.
    ///
    /// Returns the stored copy, with the assigned id on first insert.
    fn save(&self, student: &Student) -> RepoResult<Student>;
    /// Returns every stored student ordered by id.
    fn load_all(&self) -> RepoResult<Vec<Student>>;
    /// Like `load_all`, but skips and reports malformed rows.
    fn load_all_lenient(&self) -> RepoResult<LenientLoad>;
    fn get(&self, id: StudentId) -> RepoResult<Option<Student>>;
    fn count(&self) -> RepoResult<u64>;
}

/// SQLite-backed student store.
pub struct SqliteStudentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStudentRepository<'conn> {
    /// Wraps a connection returned by `db::open_db` / `db::open_db_in_memory`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn insert(&self, student: &Student) -> RepoResult<Student> {
        self.conn.execute(
            "INSERT INTO students (name, phone, admission_date) VALUES (?1, ?2, ?3);",
            params![
                student.name.as_str(),
                student.phone.as_str(),
                student.admission_date_iso(),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!("event=student_save module=repo status=ok op=insert id={id}");
        Ok(student.with_id(id))
    }

    fn update(&self, id: StudentId, student: &Student) -> RepoResult<Student> {
        let changed = self.conn.execute(
            "UPDATE students
             SET
                name = ?1,
                phone = ?2,
                admission_date = ?3
             WHERE id = ?4;",
            params![
                student.name.as_str(),
                student.phone.as_str(),
                student.admission_date_iso(),
                id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        debug!("event=student_save module=repo status=ok op=update id={id}");
        Ok(student.clone())
    }

    fn for_each_row(
        &self,
        mut visit: impl FnMut(StudentId, RepoResult<Student>) -> RepoResult<()>,
    ) -> RepoResult<()> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STUDENT_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;

        while let Some(row) = rows.next()? {
            let id: StudentId = row.get("id")?;
            visit(id, parse_student_row(id, row))?;
        }

        Ok(())
    }
}

impl StudentRepository for SqliteStudentRepository<'_> {
    fn save(&self, student: &Student) -> RepoResult<Student> {
        student.validate()?;

        match student.id {
            None => self.insert(student),
            Some(id) => self.update(id, student),
        }
    }

    fn load_all(&self) -> RepoResult<Vec<Student>> {
        let mut students = Vec::new();
        self.for_each_row(|_, parsed| {
            students.push(parsed?);
            Ok(())
        })?;

        debug!(
            "event=student_load module=repo status=ok count={}",
            students.len()
        );
        Ok(students)
    }

    fn load_all_lenient(&self) -> RepoResult<LenientLoad> {
        let mut loaded = LenientLoad::default();
        self.for_each_row(|id, parsed| {
            match parsed {
                Ok(student) => loaded.students.push(student),
                Err(err) if err.is_row_level() => {
                    warn!("event=student_load module=repo status=skipped id={id} error={err}");
                    loaded.skipped.push(SkippedRow {
                        id,
                        reason: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
            Ok(())
        })?;

        debug!(
            "event=student_load module=repo status=ok mode=lenient count={} skipped={}",
            loaded.students.len(),
            loaded.skipped.len()
        );
        Ok(loaded)
    }

    fn get(&self, id: StudentId) -> RepoResult<Option<Student>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STUDENT_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_student_row(id, row)?));
        }

        Ok(None)
    }

    fn count(&self) -> RepoResult<u64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM students;", [], |row| row.get::<_, i64>(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative student count {count}")))
    }
}

fn parse_student_row(id: StudentId, row: &Row<'_>) -> RepoResult<Student> {
    let name = required_text(id, row, "name")?;
    let phone = required_text(id, row, "phone")?;
    let admission_date = required_text(id, row, "admission_date")?;

    Student::from_stored(id, name, phone, &admission_date).map_err(|err| match err {
        StudentError::Parse(source) => RepoError::Parse { id, source },
        StudentError::Validation(err) => {
            RepoError::InvalidData(format!("student {id}: {err}"))
        }
    })
}

fn required_text(id: StudentId, row: &Row<'_>, column: &str) -> RepoResult<String> {
    row.get::<_, Option<String>>(column)?
        .ok_or_else(|| RepoError::InvalidData(format!("student {id}: students.{column} is NULL")))
}
