use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named bundle of courses a student is enrolled in as a unit.
///
/// Auxiliary relations are weak references (program codes resolved through
/// the catalog), never embedded child programs: `sample_content` programs are
/// cascaded unconditionally alongside this one, `support_programs` only when
/// the student's declared source matches the support program's own
/// `support_sources` list. `specialization_for` points back at the general
/// program this one specializes, if any.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Program {
    pub code: String,
    pub name: String,
    /// Ordered course ids making up the program.
    pub courses: Vec<String>,
    pub sample_content: Vec<String>,
    pub support_programs: Vec<String>,
    /// Comma-separated student sources eligible for this program when it is
    /// attached as a support program. Empty or absent means unrestricted.
    pub support_sources: Option<String>,
    pub specialization_for: Option<String>,
    /// Directory name under the email templates root holding this program's
    /// branded enrollment emails.
    pub email_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub email: String,
    pub full_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnrollmentKind {
    Enrollment,
    Unenrollment,
    Reenrollment,
    Upgrade,
    Specialization,
}

/// Immutable audit row describing the outcome of processing one roster
/// record. Append-only; rows are never mutated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentAttempt {
    pub email: String,
    pub program: String,
    pub kind: EnrollmentKind,
    pub registered: bool,
    pub enrolled: bool,
    pub email_sent: bool,
    pub attempted_at: DateTime<Utc>,
}

impl EnrollmentAttempt {
    pub fn new(
        email: &str,
        program: &str,
        kind: EnrollmentKind,
        registered: bool,
        enrolled: bool,
        email_sent: bool,
    ) -> Self {
        Self {
            email: email.to_string(),
            program: program.to_string(),
            kind,
            registered,
            enrolled,
            email_sent,
            attempted_at: Utc::now(),
        }
    }
}

/// Per-course enrollment state for one user. The `active` flag is the unit
/// of unenroll; rows are flagged inactive, never deleted, so the history
/// survives for audit and idempotency checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseEnrollmentRecord {
    pub email: String,
    pub course_id: String,
    pub active: bool,
    pub auto_enroll: bool,
}

/// One row from the CRM describing a student's desired enrollment state.
/// Field names follow the CRM schema verbatim; everything is optional
/// because the source system is inconsistent about which columns it fills.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RosterRecord {
    #[serde(rename = "Email", default)]
    pub email: Option<String>,
    #[serde(rename = "Full_Name", default)]
    pub full_name: Option<String>,
    #[serde(rename = "Programme_ID", default)]
    pub programme_id: Option<String>,
    #[serde(rename = "Student_Source", default)]
    pub student_source: Option<String>,
    #[serde(rename = "Specialisation_programme_id", default)]
    pub specialization_programme_id: Option<String>,
    #[serde(rename = "Specialization_Enrollment_Date", default)]
    pub specialization_enrollment_date: Option<String>,
    #[serde(rename = "Specialisation_Change_Requested_Within_7_Days", default)]
    pub specialization_change_requested: Option<bool>,
}

impl RosterRecord {
    /// The record's email, or `None` when the CRM left the column blank.
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref().filter(|e| !e.is_empty())
    }
}

/// Outcome of a fire-and-forget push to the roster source. Captured for the
/// audit trail; orchestrators never branch on it.
#[derive(Debug, Clone)]
pub struct NotificationResult {
    pub ok: bool,
    pub error: Option<String>,
}

impl NotificationResult {
    pub fn delivered() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(error.into()),
        }
    }
}

/// Which status-changing webhook a push is destined for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusPurpose {
    Enrolled,
    Unenrolled,
    SpecializationEnrolled,
    CareersModuleEnrolled,
}

/// Structured exception event reported back to the roster source when a
/// record cannot be processed (unknown program code, unknown email, ...).
#[derive(Debug, Clone, Serialize)]
pub struct ExceptionReport {
    pub email: String,
    pub crm_field: String,
    pub unexpected_value: String,
    pub attempted_action: String,
    pub message: String,
}

impl ExceptionReport {
    pub fn new(
        email: &str,
        crm_field: &str,
        unexpected_value: &str,
        attempted_action: &str,
        message: &str,
    ) -> Self {
        Self {
            email: email.to_string(),
            crm_field: crm_field.to_string(),
            unexpected_value: unexpected_value.to_string(),
            attempted_action: attempted_action.to_string(),
            message: message.to_string(),
        }
    }
}
