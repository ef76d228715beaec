pub mod cli;

use crate::utils::error::{Result, SyncError};
use crate::utils::validation::{validate_positive_number, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub crm: CrmConfig,
    pub webhooks: WebhookConfig,
    pub mail: MailConfig,
    pub catalog: CatalogConfig,
    pub enrollment: EnrollmentConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrmConfig {
    pub coql_endpoint: String,
    pub refresh_endpoint: String,
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page_size() -> usize {
    200
}

/// One webhook URL per status-changing purpose, plus the exception reporting
/// hook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    pub enrollment: String,
    pub unenrollment: String,
    pub specialization_enrollment: String,
    pub careers_module_enrollment: String,
    pub exception: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    pub relay_endpoint: String,
    pub from_address: String,
    pub templates_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// TOML file with a `[[programs]]` table per program.
    pub file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentConfig {
    /// Courses kept out of initial onboarding, like the careers module.
    #[serde(default)]
    pub excluded_onboarding_courses: Vec<String>,
    #[serde(default = "default_upgrade_program_code")]
    pub upgrade_program_code: String,
    pub careers_program_code: String,
    pub careers_course_id: String,
}

fn default_upgrade_program_code() -> String {
    "5DCC".to_string()
}

impl SyncConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| SyncError::ConfigError {
            message: format!("Invalid config file {}: {}", path.display(), e),
        })
    }
}

impl Validate for SyncConfig {
    fn validate(&self) -> Result<()> {
        validate_url("crm.coql_endpoint", &self.crm.coql_endpoint)?;
        validate_url("crm.refresh_endpoint", &self.crm.refresh_endpoint)?;
        validate_positive_number("crm.page_size", self.crm.page_size, 1)?;

        validate_url("webhooks.enrollment", &self.webhooks.enrollment)?;
        validate_url("webhooks.unenrollment", &self.webhooks.unenrollment)?;
        validate_url(
            "webhooks.specialization_enrollment",
            &self.webhooks.specialization_enrollment,
        )?;
        validate_url(
            "webhooks.careers_module_enrollment",
            &self.webhooks.careers_module_enrollment,
        )?;
        validate_url("webhooks.exception", &self.webhooks.exception)?;

        validate_url("mail.relay_endpoint", &self.mail.relay_endpoint)?;
        if self.mail.from_address.is_empty() {
            return Err(SyncError::ConfigError {
                message: "mail.from_address cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}
