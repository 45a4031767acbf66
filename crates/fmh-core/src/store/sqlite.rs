use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{generate_token, hash_token, CatalogStore, IdentityStore, LogStore, StagingStore};
use crate::error::LogbookError;
use crate::model::{
    Identity, ImportRun, ImportSource, ImportStatus, NewProcedureLog, Procedure, ProcedureLog,
    ProcedureRecord, StagedProcedure, StagedStatus,
};

/// SQLite-backed store for runs, staged rows, the catalog, logs and tokens.
///
/// Statements are serialized on one connection; callers that need
/// concurrency issue blocking tasks and let the mutex order them.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path and run migrations.
    pub fn open(path: &Path) -> Result<Self, LogbookError> {
        Self::from_connection(Connection::open(path)?)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, LogbookError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, LogbookError> {
        configure_pragmas(&conn)?;
        run_migrations(&conn)?;
        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, LogbookError> {
        self.conn.lock().map_err(|_| LogbookError::LockPoisoned)
    }

    /// All log rows of a user, oldest first.
    pub fn logs_for_user(&self, user_id: &str) -> Result<Vec<ProcedureLog>, LogbookError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, procedure_id, role_in_surgery, performed_date, notes, hospital
             FROM procedure_logs WHERE user_id = ?1 ORDER BY id",
        )?;
        let rows = stmt
            .query_map(params![user_id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, NaiveDate>(4)?,
                    row.get::<_, Option<String>>(5)?,
                    row.get::<_, Option<String>>(6)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(
                |(id, user_id, procedure_id, role, performed_date, notes, hospital)| {
                    Ok(ProcedureLog {
                        id,
                        user_id,
                        procedure_id,
                        role_in_surgery: role.parse()?,
                        performed_date,
                        notes,
                        hospital,
                    })
                },
            )
            .collect()
    }

    /// Runs of a user, newest first.
    pub fn runs_for_user(&self, user_id: &str) -> Result<Vec<ImportRun>, LogbookError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, pdf_filename, source, status, created_at
             FROM import_runs WHERE user_id = ?1 ORDER BY created_at DESC",
        )?;
        let raw = stmt
            .query_map(params![user_id], RawRun::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        raw.into_iter().map(RawRun::into_run).collect()
    }
}

fn configure_pragmas(conn: &Connection) -> Result<(), LogbookError> {
    conn.execute_batch(
        "PRAGMA journal_mode=DELETE;
         PRAGMA foreign_keys=ON;",
    )?;
    Ok(())
}

/// Run all pending migrations.
pub fn run_migrations(conn: &Connection) -> Result<(), LogbookError> {
    let current_version = get_current_version(conn);

    let migrations: Vec<(i64, &str)> = vec![(1, include_str!("../../migrations/001_initial.sql"))];

    for (version, sql) in migrations {
        if version > current_version {
            tracing::info!("Running migration v{version}");
            conn.execute_batch(sql)
                .map_err(|e| LogbookError::MigrationFailed {
                    version,
                    reason: e.to_string(),
                })?;
        }
    }

    Ok(())
}

/// Get the current schema version (0 if no schema exists yet).
fn get_current_version(conn: &Connection) -> i64 {
    conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
        row.get::<_, i64>(0)
    })
    .unwrap_or(0)
}

fn parse_uuid(field: &str, value: &str) -> Result<Uuid, LogbookError> {
    Uuid::parse_str(value).map_err(|_| LogbookError::InvalidValue {
        field: field.into(),
        value: value.into(),
    })
}

/// Column values of an `import_runs` row before enum/uuid decoding.
struct RawRun {
    id: String,
    user_id: String,
    pdf_filename: String,
    source: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl RawRun {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(RawRun {
            id: row.get(0)?,
            user_id: row.get(1)?,
            pdf_filename: row.get(2)?,
            source: row.get(3)?,
            status: row.get(4)?,
            created_at: row.get(5)?,
        })
    }

    fn into_run(self) -> Result<ImportRun, LogbookError> {
        Ok(ImportRun {
            id: parse_uuid("import_runs.id", &self.id)?,
            user_id: self.user_id,
            pdf_filename: self.pdf_filename,
            source: self.source.parse()?,
            status: self.status.parse()?,
            created_at: self.created_at,
        })
    }
}

/// Column values of a `staged_procedures` row before enum/uuid decoding.
struct RawStaged {
    id: i64,
    run_id: String,
    position: u32,
    proc_name: String,
    module_name: String,
    counts: [u32; 5],
    status: String,
}

impl RawStaged {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(RawStaged {
            id: row.get(0)?,
            run_id: row.get(1)?,
            position: row.get(2)?,
            proc_name: row.get(3)?,
            module_name: row.get(4)?,
            counts: [
                row.get(5)?,
                row.get(6)?,
                row.get(7)?,
                row.get(8)?,
                row.get(9)?,
            ],
            status: row.get(10)?,
        })
    }

    fn into_staged(self) -> Result<StagedProcedure, LogbookError> {
        let [minimum, responsible, instructing, assistant, total] = self.counts;
        Ok(StagedProcedure {
            id: self.id,
            run_id: parse_uuid("staged_procedures.run_id", &self.run_id)?,
            position: self.position,
            proc_name: self.proc_name,
            module_name: self.module_name,
            minimum,
            responsible,
            instructing,
            assistant,
            total,
            status: self.status.parse()?,
        })
    }
}

impl StagingStore for SqliteStore {
    fn create_run(
        &self,
        user_id: &str,
        pdf_filename: &str,
        source: ImportSource,
    ) -> Result<ImportRun, LogbookError> {
        let run = ImportRun {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            pdf_filename: pdf_filename.to_string(),
            source,
            status: ImportStatus::Running,
            created_at: Utc::now(),
        };

        self.conn()?.execute(
            "INSERT INTO import_runs (id, user_id, pdf_filename, source, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                run.id.to_string(),
                run.user_id,
                run.pdf_filename,
                run.source.as_str(),
                run.status.as_str(),
                run.created_at,
            ],
        )?;

        Ok(run)
    }

    fn get_run(&self, run_id: Uuid) -> Result<Option<ImportRun>, LogbookError> {
        let raw = self
            .conn()?
            .query_row(
                "SELECT id, user_id, pdf_filename, source, status, created_at
                 FROM import_runs WHERE id = ?1",
                params![run_id.to_string()],
                RawRun::from_row,
            )
            .optional()?;
        raw.map(RawRun::into_run).transpose()
    }

    fn set_run_status(&self, run_id: Uuid, status: ImportStatus) -> Result<(), LogbookError> {
        let changed = self.conn()?.execute(
            "UPDATE import_runs SET status = ?1 WHERE id = ?2",
            params![status.as_str(), run_id.to_string()],
        )?;
        if changed == 0 {
            return Err(LogbookError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn insert_staged(
        &self,
        run_id: Uuid,
        position: u32,
        record: &ProcedureRecord,
    ) -> Result<StagedProcedure, LogbookError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO staged_procedures
                (run_id, position, proc_name, module_name, minimum, responsible, instructing,
                 assistant, total, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                run_id.to_string(),
                position,
                record.name,
                record.module_name,
                record.minimum,
                record.responsible,
                record.instructing,
                record.assistant,
                record.total,
                StagedStatus::Pending.as_str(),
            ],
        )?;

        Ok(StagedProcedure {
            id: conn.last_insert_rowid(),
            run_id,
            position,
            proc_name: record.name.clone(),
            module_name: record.module_name.clone(),
            minimum: record.minimum,
            responsible: record.responsible,
            instructing: record.instructing,
            assistant: record.assistant,
            total: record.total,
            status: StagedStatus::Pending,
        })
    }

    fn staged_for_run(&self, run_id: Uuid) -> Result<Vec<StagedProcedure>, LogbookError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, run_id, position, proc_name, module_name, minimum, responsible,
                    instructing, assistant, total, status
             FROM staged_procedures WHERE run_id = ?1 ORDER BY position, id",
        )?;
        let raw = stmt
            .query_map(params![run_id.to_string()], RawStaged::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        raw.into_iter().map(RawStaged::into_staged).collect()
    }

    fn set_staged_status(&self, staged_id: i64, status: StagedStatus) -> Result<(), LogbookError> {
        self.conn()?.execute(
            "UPDATE staged_procedures SET status = ?1 WHERE id = ?2",
            params![status.as_str(), staged_id],
        )?;
        Ok(())
    }
}

impl CatalogStore for SqliteStore {
    fn load_catalog(&self) -> Result<Vec<Procedure>, LogbookError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, title_de, title_en, code FROM procedures ORDER BY position, rowid",
        )?;
        let catalog = stmt
            .query_map([], |row| {
                Ok(Procedure {
                    id: row.get(0)?,
                    title_de: row.get(1)?,
                    title_en: row.get(2)?,
                    code: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(catalog)
    }

    fn upsert_procedures(&self, procedures: &[Procedure]) -> Result<usize, LogbookError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO procedures (id, title_de, title_en, code, position)
                 VALUES (?1, ?2, ?3, ?4, (SELECT COALESCE(MAX(position), 0) + 1 FROM procedures))
                 ON CONFLICT(id) DO UPDATE SET
                    title_de = excluded.title_de,
                    title_en = excluded.title_en,
                    code = excluded.code",
            )?;
            for p in procedures {
                stmt.execute(params![p.id, p.title_de, p.title_en, p.code])?;
            }
        }
        tx.commit()?;
        Ok(procedures.len())
    }
}

impl LogStore for SqliteStore {
    fn insert_log(&self, log: &NewProcedureLog) -> Result<ProcedureLog, LogbookError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO procedure_logs
                (user_id, procedure_id, role_in_surgery, performed_date, notes, hospital)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                log.user_id,
                log.procedure_id,
                log.role_in_surgery.as_str(),
                log.performed_date,
                log.notes,
                log.hospital,
            ],
        )?;

        Ok(ProcedureLog {
            id: conn.last_insert_rowid(),
            user_id: log.user_id.clone(),
            procedure_id: log.procedure_id.clone(),
            role_in_surgery: log.role_in_surgery,
            performed_date: log.performed_date,
            notes: log.notes.clone(),
            hospital: log.hospital.clone(),
        })
    }

    fn count_logs(&self, user_id: &str) -> Result<usize, LogbookError> {
        let count: i64 = self.conn()?.query_row(
            "SELECT COUNT(*) FROM procedure_logs WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

impl IdentityStore for SqliteStore {
    fn issue_token(&self, identity: &Identity) -> Result<String, LogbookError> {
        let token = generate_token();
        let hash = hash_token(&token);
        self.conn()?.execute(
            "INSERT INTO api_tokens (token_hash, user_id, email, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![&hash[..], identity.user_id, identity.email, Utc::now()],
        )?;
        Ok(token)
    }

    fn resolve_token(&self, token: &str) -> Result<Option<Identity>, LogbookError> {
        let hash = hash_token(token);
        let identity = self
            .conn()?
            .query_row(
                "SELECT user_id, email FROM api_tokens WHERE token_hash = ?1",
                params![&hash[..]],
                |row| {
                    Ok(Identity {
                        user_id: row.get(0)?,
                        email: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(identity)
    }
}
