use serde::{Deserialize, Serialize};

use crate::model::{ImportOptions, NewProcedureLog, RoleInSurgery, StagedProcedure};
use crate::store::LogStore;

/// Result of expanding one staged record into log rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterializeOutcome {
    pub attempted: usize,
    pub imported: usize,
}

impl MaterializeOutcome {
    pub fn failed(&self) -> usize {
        self.attempted - self.imported
    }
}

/// Write one log row per unit of each role count of a matched staged record.
///
/// A record with `responsible = 8` yields eight separate `responsible` rows,
/// all dated `options.import_date`. Inserts are issued one at a time; a
/// failed insert is logged and the remaining inserts still run.
pub fn materialize(
    logs: &dyn LogStore,
    staged: &StagedProcedure,
    procedure_id: &str,
    user_id: &str,
    options: &ImportOptions,
) -> MaterializeOutcome {
    let notes = format!("PDF import {} ({})", staged.run_id, staged.module_name);
    let mut outcome = MaterializeOutcome::default();

    for role in RoleInSurgery::ALL {
        let count = staged.count_for(role);
        if count == 0 {
            continue;
        }

        let row = NewProcedureLog {
            user_id: user_id.to_string(),
            procedure_id: procedure_id.to_string(),
            role_in_surgery: role,
            performed_date: options.import_date,
            notes: Some(notes.clone()),
            hospital: options.hospital.clone(),
        };

        for unit in 0..count {
            outcome.attempted += 1;
            match logs.insert_log(&row) {
                Ok(_) => outcome.imported += 1,
                Err(e) => tracing::warn!(
                    procedure = %staged.proc_name,
                    role = %role,
                    unit,
                    error = %e,
                    "failed to write procedure log row"
                ),
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LogbookError;
    use crate::model::{ProcedureLog, StagedStatus};
    use chrono::NaiveDate;
    use std::sync::Mutex;
    use uuid::Uuid;

    /// Records every insert attempt; fails the attempts whose index is listed.
    struct RecordingLogs {
        fail_on: Vec<usize>,
        attempts: Mutex<Vec<NewProcedureLog>>,
    }

    impl RecordingLogs {
        fn new(fail_on: Vec<usize>) -> Self {
            RecordingLogs {
                fail_on,
                attempts: Mutex::new(Vec::new()),
            }
        }

        fn roles(&self) -> Vec<RoleInSurgery> {
            self.attempts
                .lock()
                .unwrap()
                .iter()
                .map(|l| l.role_in_surgery)
                .collect()
        }
    }

    impl LogStore for RecordingLogs {
        fn insert_log(&self, log: &NewProcedureLog) -> Result<ProcedureLog, LogbookError> {
            let mut attempts = self.attempts.lock().unwrap();
            let index = attempts.len();
            attempts.push(log.clone());
            if self.fail_on.contains(&index) {
                return Err(LogbookError::Task("simulated insert failure".into()));
            }
            Ok(ProcedureLog {
                id: index as i64 + 1,
                user_id: log.user_id.clone(),
                procedure_id: log.procedure_id.clone(),
                role_in_surgery: log.role_in_surgery,
                performed_date: log.performed_date,
                notes: log.notes.clone(),
                hospital: log.hospital.clone(),
            })
        }

        fn count_logs(&self, _user_id: &str) -> Result<usize, LogbookError> {
            Ok(self.attempts.lock().unwrap().len())
        }
    }

    fn staged(responsible: u32, instructing: u32, assistant: u32) -> StagedProcedure {
        StagedProcedure {
            id: 1,
            run_id: Uuid::nil(),
            position: 0,
            proc_name: "Appendektomie".into(),
            module_name: "Basis Allgemeinchirurgie".into(),
            minimum: 10,
            responsible,
            instructing,
            assistant,
            total: responsible + instructing + assistant,
            status: StagedStatus::Pending,
        }
    }

    fn options() -> ImportOptions {
        ImportOptions {
            import_date: NaiveDate::from_ymd_opt(2025, 8, 23).unwrap(),
            hospital: Some("Kantonsspital".into()),
        }
    }

    #[test]
    fn test_unit_expansion_per_role() {
        let logs = RecordingLogs::new(vec![]);
        let outcome = materialize(&logs, &staged(3, 0, 2), "p1", "user-1", &options());

        assert_eq!(outcome, MaterializeOutcome { attempted: 5, imported: 5 });
        assert_eq!(
            logs.roles(),
            vec![
                RoleInSurgery::Responsible,
                RoleInSurgery::Responsible,
                RoleInSurgery::Responsible,
                RoleInSurgery::Assistant,
                RoleInSurgery::Assistant,
            ]
        );
    }

    #[test]
    fn test_failed_insert_does_not_stop_the_rest() {
        let logs = RecordingLogs::new(vec![1]);
        let outcome = materialize(&logs, &staged(3, 0, 2), "p1", "user-1", &options());

        assert_eq!(outcome.attempted, 5);
        assert_eq!(outcome.imported, 4);
        assert_eq!(outcome.failed(), 1);
        assert_eq!(logs.roles().len(), 5);
    }

    #[test]
    fn test_rows_carry_date_hospital_and_note() {
        let logs = RecordingLogs::new(vec![]);
        materialize(&logs, &staged(0, 1, 0), "p1", "user-1", &options());

        let attempts = logs.attempts.lock().unwrap();
        assert_eq!(attempts.len(), 1);
        let row = &attempts[0];
        assert_eq!(row.role_in_surgery, RoleInSurgery::Instructing);
        assert_eq!(row.user_id, "user-1");
        assert_eq!(row.procedure_id, "p1");
        assert_eq!(row.performed_date, options().import_date);
        assert_eq!(row.hospital.as_deref(), Some("Kantonsspital"));
        assert!(row
            .notes
            .as_deref()
            .unwrap()
            .contains("Basis Allgemeinchirurgie"));
    }

    #[test]
    fn test_zero_counts_write_nothing() {
        let logs = RecordingLogs::new(vec![]);
        let outcome = materialize(&logs, &staged(0, 0, 0), "p1", "user-1", &options());
        assert_eq!(outcome, MaterializeOutcome::default());
    }
}
