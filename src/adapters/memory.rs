use crate::domain::{
    CourseEnrollmentRecord, EnrollmentAttempt, Platform, Program, UserAccount,
};
use crate::utils::error::{Result, SyncError};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
struct StoredUser {
    account: UserAccount,
    #[allow(dead_code)]
    password: String,
}

#[derive(Default)]
struct State {
    programs: HashMap<String, Program>,
    users: HashMap<String, StoredUser>,
    course_rows: Vec<CourseEnrollmentRecord>,
    /// `(email, program code)` membership rows, in insertion order.
    memberships: Vec<(String, String)>,
    access: HashMap<String, bool>,
    attempts: Vec<EnrollmentAttempt>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    programs: Vec<Program>,
}

/// In-memory platform store holding the program catalog, accounts, course
/// rows, program membership and the audit log.
#[derive(Clone, Default)]
pub struct InMemoryPlatform {
    state: Arc<Mutex<State>>,
}

impl InMemoryPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a platform whose catalog is loaded from a TOML file with a
    /// `[[programs]]` table per program.
    pub fn from_catalog_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let catalog: CatalogFile =
            toml::from_str(&raw).map_err(|e| SyncError::ConfigError {
                message: format!("Invalid catalog file {}: {}", path.display(), e),
            })?;
        let mut state = State::default();
        for program in catalog.programs {
            state.programs.insert(program.code.clone(), program);
        }
        Ok(Self {
            state: Arc::new(Mutex::new(state)),
        })
    }

    pub async fn insert_program(&self, program: Program) {
        let mut state = self.state.lock().await;
        state.programs.insert(program.code.clone(), program);
    }

    pub async fn attempts(&self) -> Vec<EnrollmentAttempt> {
        self.state.lock().await.attempts.clone()
    }

    pub async fn course_record(
        &self,
        email: &str,
        course_id: &str,
    ) -> Option<CourseEnrollmentRecord> {
        let state = self.state.lock().await;
        state
            .course_rows
            .iter()
            .find(|r| r.email == email && r.course_id == course_id)
            .cloned()
    }

    pub async fn has_platform_access(&self, email: &str) -> bool {
        self.state
            .lock()
            .await
            .access
            .get(email)
            .copied()
            .unwrap_or(false)
    }
}

#[async_trait]
impl Platform for InMemoryPlatform {
    async fn find_user(&self, email: &str) -> Result<Option<UserAccount>> {
        let state = self.state.lock().await;
        Ok(state.users.get(email).map(|u| u.account.clone()))
    }

    async fn register_user(
        &self,
        email: &str,
        full_name: &str,
        password: &str,
    ) -> Result<UserAccount> {
        let account = UserAccount {
            email: email.to_string(),
            full_name: full_name.to_string(),
        };
        let mut state = self.state.lock().await;
        state.users.insert(
            email.to_string(),
            StoredUser {
                account: account.clone(),
                password: password.to_string(),
            },
        );
        Ok(account)
    }

    async fn get_program(&self, code: &str) -> Result<Option<Program>> {
        let state = self.state.lock().await;
        Ok(state.programs.get(code).cloned())
    }

    async fn enroll_in_course(&self, email: &str, course_id: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        if let Some(row) = state
            .course_rows
            .iter_mut()
            .find(|r| r.email == email && r.course_id == course_id)
        {
            row.active = true;
            row.auto_enroll = true;
            return Ok(());
        }
        state.course_rows.push(CourseEnrollmentRecord {
            email: email.to_string(),
            course_id: course_id.to_string(),
            active: true,
            auto_enroll: true,
        });
        Ok(())
    }

    async fn deactivate_course_enrollment(&self, email: &str, course_id: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        if let Some(row) = state
            .course_rows
            .iter_mut()
            .find(|r| r.email == email && r.course_id == course_id)
        {
            row.active = false;
        }
        Ok(())
    }

    async fn course_enrollments(&self, email: &str) -> Result<Vec<CourseEnrollmentRecord>> {
        let state = self.state.lock().await;
        Ok(state
            .course_rows
            .iter()
            .filter(|r| r.email == email)
            .cloned()
            .collect())
    }

    async fn add_member(&self, email: &str, program_code: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        if !state.programs.contains_key(program_code) {
            return Err(SyncError::PlatformError {
                message: format!("unknown program code: {}", program_code),
            });
        }
        let key = (email.to_string(), program_code.to_string());
        if !state.memberships.contains(&key) {
            state.memberships.push(key);
        }
        Ok(())
    }

    async fn is_member(&self, email: &str, program_code: &str) -> Result<bool> {
        let state = self.state.lock().await;
        Ok(state
            .memberships
            .iter()
            .any(|(e, c)| e == email && c == program_code))
    }

    async fn remove_member(&self, email: &str, program_code: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        state
            .memberships
            .retain(|(e, c)| !(e == email && c == program_code));
        Ok(())
    }

    async fn programs_of(&self, email: &str) -> Result<Vec<Program>> {
        let state = self.state.lock().await;
        Ok(state
            .memberships
            .iter()
            .filter(|(e, _)| e == email)
            .filter_map(|(_, code)| state.programs.get(code).cloned())
            .collect())
    }

    async fn set_platform_access(&self, email: &str, allowed: bool) -> Result<()> {
        let mut state = self.state.lock().await;
        state.access.insert(email.to_string(), allowed);
        Ok(())
    }

    async fn record_attempt(&self, attempt: EnrollmentAttempt) -> Result<()> {
        let mut state = self.state.lock().await;
        state.attempts.push(attempt);
        Ok(())
    }
}
