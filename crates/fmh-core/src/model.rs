use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::LogbookError;

/// One procedure row recognised in a logbook PDF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureRecord {
    pub name: String,
    pub module_name: String,
    pub minimum: u32,
    pub responsible: u32,
    pub instructing: u32,
    pub assistant: u32,
    pub total: u32,
}

impl ProcedureRecord {
    /// Build a record from the numeric block that followed a procedure name.
    ///
    /// Missing positions default to 0. `total` is the fifth number when the
    /// block has one, otherwise the sum of the three role counts.
    pub fn from_counts(name: &str, module_name: &str, nums: &[u32]) -> Self {
        let at = |i: usize| nums.get(i).copied().unwrap_or(0);
        let responsible = at(1);
        let instructing = at(2);
        let assistant = at(3);
        let total = nums.get(4).copied().unwrap_or_else(|| {
            responsible
                .saturating_add(instructing)
                .saturating_add(assistant)
        });

        ProcedureRecord {
            name: name.to_string(),
            module_name: module_name.to_string(),
            minimum: at(0),
            responsible,
            instructing,
            assistant,
            total,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleInSurgery {
    Responsible,
    Instructing,
    Assistant,
}

impl RoleInSurgery {
    pub const ALL: [RoleInSurgery; 3] = [
        RoleInSurgery::Responsible,
        RoleInSurgery::Instructing,
        RoleInSurgery::Assistant,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoleInSurgery::Responsible => "responsible",
            RoleInSurgery::Instructing => "instructing",
            RoleInSurgery::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportStatus {
    Running,
    Completed,
    Failed,
}

impl ImportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportStatus::Running => "running",
            ImportStatus::Completed => "completed",
            ImportStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportSource {
    /// Parsed from a PDF by the uploading client and staged for review.
    ClientAiParse,
    /// Uploaded to the HTTP import endpoint and imported immediately.
    ServerUpload,
    /// Imported from a local file with `fmh import`.
    CliImport,
}

impl ImportSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportSource::ClientAiParse => "client_ai_parse",
            ImportSource::ServerUpload => "server_upload",
            ImportSource::CliImport => "cli_import",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StagedStatus {
    Pending,
    Imported,
    Unmatched,
}

impl StagedStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StagedStatus::Pending => "pending",
            StagedStatus::Imported => "imported",
            StagedStatus::Unmatched => "unmatched",
        }
    }
}

macro_rules! impl_str_enum {
    ($ty:ty, $field:literal, [$($variant:expr),+ $(,)?]) => {
        impl FromStr for $ty {
            type Err = LogbookError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                [$($variant),+]
                    .into_iter()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| LogbookError::InvalidValue {
                        field: $field.into(),
                        value: s.into(),
                    })
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

impl_str_enum!(
    RoleInSurgery,
    "role_in_surgery",
    [
        RoleInSurgery::Responsible,
        RoleInSurgery::Instructing,
        RoleInSurgery::Assistant,
    ]
);
impl_str_enum!(
    ImportStatus,
    "import_runs.status",
    [
        ImportStatus::Running,
        ImportStatus::Completed,
        ImportStatus::Failed,
    ]
);
impl_str_enum!(
    ImportSource,
    "import_runs.source",
    [
        ImportSource::ClientAiParse,
        ImportSource::ServerUpload,
        ImportSource::CliImport,
    ]
);
impl_str_enum!(
    StagedStatus,
    "staged_procedures.status",
    [
        StagedStatus::Pending,
        StagedStatus::Imported,
        StagedStatus::Unmatched,
    ]
);

/// One upload attempt, owned by the uploading user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportRun {
    pub id: Uuid,
    pub user_id: String,
    pub pdf_filename: String,
    pub source: ImportSource,
    pub status: ImportStatus,
    pub created_at: DateTime<Utc>,
}

/// A parsed-but-unverified procedure awaiting reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagedProcedure {
    pub id: i64,
    pub run_id: Uuid,
    /// Index of the record in the parsed document.
    pub position: u32,
    pub proc_name: String,
    pub module_name: String,
    pub minimum: u32,
    pub responsible: u32,
    pub instructing: u32,
    pub assistant: u32,
    pub total: u32,
    pub status: StagedStatus,
}

impl StagedProcedure {
    pub fn count_for(&self, role: RoleInSurgery) -> u32 {
        match role {
            RoleInSurgery::Responsible => self.responsible,
            RoleInSurgery::Instructing => self.instructing,
            RoleInSurgery::Assistant => self.assistant,
        }
    }
}

/// Canonical catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Procedure {
    pub id: String,
    pub title_de: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_en: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// A single performed procedure occurrence, ready to be written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProcedureLog {
    pub user_id: String,
    pub procedure_id: String,
    pub role_in_surgery: RoleInSurgery,
    pub performed_date: NaiveDate,
    pub notes: Option<String>,
    pub hospital: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcedureLog {
    pub id: i64,
    pub user_id: String,
    pub procedure_id: String,
    pub role_in_surgery: RoleInSurgery,
    pub performed_date: NaiveDate,
    pub notes: Option<String>,
    pub hospital: Option<String>,
}

/// Authenticated user on whose behalf an import runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub email: Option<String>,
}

impl Identity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Identity {
            user_id: user_id.into(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Settings applied to every log row written by one import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOptions {
    pub import_date: NaiveDate,
    pub hospital: Option<String>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        ImportOptions {
            import_date: Utc::now().date_naive(),
            hospital: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_five_numbers_take_explicit_total() {
        let r = ProcedureRecord::from_counts("Appendektomie", "Basis Chirurgie", &[10, 8, 0, 8, 8]);
        assert_eq!(r.minimum, 10);
        assert_eq!(r.responsible, 8);
        assert_eq!(r.instructing, 0);
        assert_eq!(r.assistant, 8);
        assert_eq!(r.total, 8);
    }

    #[test]
    fn test_four_numbers_sum_roles() {
        let r = ProcedureRecord::from_counts("Hernie", "Modul Viszeral", &[5, 2, 1, 1]);
        assert_eq!(r.total, 4);
    }

    #[test]
    fn test_single_number_is_minimum_only() {
        let r = ProcedureRecord::from_counts("Hernie", "Modul Viszeral", &[3]);
        assert_eq!(r.minimum, 3);
        assert_eq!(r.responsible, 0);
        assert_eq!(r.total, 0);
    }

    #[test]
    fn test_enum_round_trip_through_str() {
        for role in RoleInSurgery::ALL {
            assert_eq!(role.as_str().parse::<RoleInSurgery>().unwrap(), role);
        }
        assert_eq!(
            "client_ai_parse".parse::<ImportSource>().unwrap(),
            ImportSource::ClientAiParse
        );
        assert_eq!(
            ImportSource::CliImport.as_str().parse::<ImportSource>().unwrap(),
            ImportSource::CliImport
        );
        assert!("done".parse::<ImportStatus>().is_err());
    }

    #[test]
    fn test_procedure_json_field_names() {
        let json = r#"{"id":"p1","titleDe":"Appendektomie","titleEn":"Appendectomy"}"#;
        let p: Procedure = serde_json::from_str(json).unwrap();
        assert_eq!(p.title_de, "Appendektomie");
        assert_eq!(p.title_en.as_deref(), Some("Appendectomy"));
        assert!(p.code.is_none());
    }
}
