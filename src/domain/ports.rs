use crate::domain::model::{
    CourseEnrollmentRecord, EnrollmentAttempt, EnrollmentKind, ExceptionReport,
    NotificationResult, Program, RosterRecord, StatusPurpose, UserAccount,
};
use crate::utils::error::Result;
use async_trait::async_trait;

/// The external CRM holding the desired enrollment state.
///
/// Fetches are paginated snapshots: implementations keep requesting pages
/// until the source reports no more records or answers non-200, returning
/// whatever accumulated rather than raising. Pushes are fire-and-forget;
/// their outcome is reported as a [`NotificationResult`], never an `Err`.
#[async_trait]
pub trait RosterSource: Send + Sync {
    async fn students_to_enroll(&self) -> Result<Vec<RosterRecord>>;
    async fn students_to_unenroll(&self) -> Result<Vec<RosterRecord>>;
    async fn students_for_specialization(&self) -> Result<Vec<RosterRecord>>;
    async fn students_for_careers_module(&self) -> Result<Vec<RosterRecord>>;

    async fn push_status(&self, purpose: StatusPurpose, email: &str) -> NotificationResult;
    async fn push_exception(&self, report: &ExceptionReport) -> NotificationResult;
}

/// The learning platform's storage layer: accounts, the program catalog,
/// course enrollment rows, program membership, and the audit log.
///
/// Membership is an explicit `(email, program code)` table; a user counts as
/// enrolled in a program iff they hold at least one active course record for
/// it and the membership row exists. Orchestrators keep both in step within
/// one record's processing. Writes are idempotent so that concurrent passes
/// over the same user degrade to safe no-ops.
#[async_trait]
pub trait Platform: Send + Sync {
    async fn find_user(&self, email: &str) -> Result<Option<UserAccount>>;
    /// Creates and persists the account immediately, so a failure later in
    /// the same record's processing does not lose the registration.
    async fn register_user(
        &self,
        email: &str,
        full_name: &str,
        password: &str,
    ) -> Result<UserAccount>;

    /// Exact, case-sensitive lookup by program code.
    async fn get_program(&self, code: &str) -> Result<Option<Program>>;

    /// Create-or-activate the course enrollment row and its allow-list entry,
    /// marked for auto-enrollment. Re-enrolling an existing row must not
    /// error or duplicate.
    async fn enroll_in_course(&self, email: &str, course_id: &str) -> Result<()>;
    /// Set the course row inactive. The row itself is never deleted.
    async fn deactivate_course_enrollment(&self, email: &str, course_id: &str) -> Result<()>;
    async fn course_enrollments(&self, email: &str) -> Result<Vec<CourseEnrollmentRecord>>;

    /// Errs when the program code is unknown to the store.
    async fn add_member(&self, email: &str, program_code: &str) -> Result<()>;
    async fn is_member(&self, email: &str, program_code: &str) -> Result<bool>;
    async fn remove_member(&self, email: &str, program_code: &str) -> Result<()>;
    /// Programs the user currently belongs to, in membership order.
    async fn programs_of(&self, email: &str) -> Result<Vec<Program>>;

    /// Legacy access gate: get-or-create, then set and save when it already
    /// existed.
    async fn set_platform_access(&self, email: &str, allowed: bool) -> Result<()>;

    async fn record_attempt(&self, attempt: EnrollmentAttempt) -> Result<()>;
}

/// Outbound enrollment email. Returns whether the send succeeded; failures
/// are captured in the audit row, never raised.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_enrollment_email(
        &self,
        user: &UserAccount,
        program: &Program,
        kind: EnrollmentKind,
        password: Option<&str>,
    ) -> bool;
}
