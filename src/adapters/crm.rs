use crate::config::{CrmConfig, WebhookConfig};
use crate::domain::{
    ExceptionReport, NotificationResult, RosterRecord, RosterSource, StatusPurpose,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

// COQL roster queries. Pagination is appended per page as
// `LIMIT {offset},{page_size}`.
const ENROLL_QUERY: &str = "SELECT Email, Full_Name, Programme_ID, Student_Source \
     FROM Contacts \
     WHERE (Lead_Status = 'Enroll') AND (Programme_ID is not null)";

const UNENROLL_QUERY: &str = "SELECT Email, Full_Name, Programme_ID \
     FROM Contacts \
     WHERE (LMS_Access_Status = 'To be removed') \
     AND (Reason_for_Unenrollment is not null) AND (Programme_ID is not null)";

const SPECIALIZATION_QUERY: &str = "SELECT Email, Full_Name, Programme_ID, Specialisation_programme_id, \
     Specialization_Enrollment_Date, Specialisation_Change_Requested_Within_7_Days \
     FROM Contacts \
     WHERE (Specialisation_Enrollment_Status = 'Approved') \
     AND (Specialisation_programme_id is not null)";

const CAREERS_QUERY: &str = "SELECT Email, Full_Name, Programme_ID \
     FROM Contacts \
     WHERE (Access_to_Careers_Module = 'Enroll') AND (Programme_ID is not null)";

#[derive(Debug, Deserialize)]
struct CoqlResponse {
    #[serde(default)]
    data: Vec<RosterRecord>,
    #[serde(default)]
    info: CoqlInfo,
}

#[derive(Debug, Default, Deserialize)]
struct CoqlInfo {
    #[serde(default)]
    more_records: bool,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Roster source backed by the CRM's COQL query endpoint and per-purpose
/// webhook URLs.
#[derive(Clone)]
pub struct CrmClient {
    client: Client,
    crm: CrmConfig,
    webhooks: WebhookConfig,
}

impl CrmClient {
    pub fn new(crm: CrmConfig, webhooks: WebhookConfig) -> Self {
        Self {
            client: Client::new(),
            crm,
            webhooks,
        }
    }

    async fn auth_header(&self) -> Result<String> {
        let resp = self
            .client
            .post(&self.crm.refresh_endpoint)
            .query(&[
                ("refresh_token", self.crm.refresh_token.as_str()),
                ("client_id", self.crm.client_id.as_str()),
                ("client_secret", self.crm.client_secret.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await?
            .error_for_status()?;
        let token: TokenResponse = resp.json().await?;
        Ok(format!("Zoho-oauthtoken {}", token.access_token))
    }

    /// Fetch sequential pages until the CRM reports no more records. A
    /// non-200 or unreadable page terminates the fetch with whatever has
    /// accumulated; pagination never raises mid-way.
    async fn fetch_all(&self, base_query: &str) -> Result<Vec<RosterRecord>> {
        let auth = self.auth_header().await?;
        let mut records = Vec::new();
        let mut page = 0usize;

        loop {
            let query = format!(
                "{} LIMIT {},{}",
                base_query,
                page * self.crm.page_size,
                self.crm.page_size
            );
            let resp = self
                .client
                .post(&self.crm.coql_endpoint)
                .header("Authorization", &auth)
                .json(&serde_json::json!({ "select_query": query }))
                .send()
                .await;

            let resp = match resp {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!("Roster fetch failed on page {}: {}", page, e);
                    return Ok(records);
                }
            };
            if !resp.status().is_success() {
                tracing::warn!("Roster fetch returned {} on page {}", resp.status(), page);
                return Ok(records);
            }

            let body: CoqlResponse = match resp.json().await {
                Ok(b) => b,
                Err(e) => {
                    tracing::warn!("Unreadable roster page {}: {}", page, e);
                    return Ok(records);
                }
            };

            records.extend(body.data);
            if !body.info.more_records {
                return Ok(records);
            }
            page += 1;
        }
    }

    fn status_url(&self, purpose: StatusPurpose) -> &str {
        match purpose {
            StatusPurpose::Enrolled => &self.webhooks.enrollment,
            StatusPurpose::Unenrolled => &self.webhooks.unenrollment,
            StatusPurpose::SpecializationEnrolled => &self.webhooks.specialization_enrollment,
            StatusPurpose::CareersModuleEnrolled => &self.webhooks.careers_module_enrollment,
        }
    }

    async fn post_form<T: serde::Serialize + ?Sized>(
        &self,
        url: &str,
        payload: &T,
    ) -> NotificationResult {
        match self.client.post(url).form(payload).send().await {
            Ok(resp) if resp.status().is_success() => NotificationResult::delivered(),
            Ok(resp) => NotificationResult::failed(format!("status {}", resp.status())),
            Err(e) => NotificationResult::failed(e.to_string()),
        }
    }
}

#[async_trait]
impl RosterSource for CrmClient {
    async fn students_to_enroll(&self) -> Result<Vec<RosterRecord>> {
        self.fetch_all(ENROLL_QUERY).await
    }

    async fn students_to_unenroll(&self) -> Result<Vec<RosterRecord>> {
        self.fetch_all(UNENROLL_QUERY).await
    }

    async fn students_for_specialization(&self) -> Result<Vec<RosterRecord>> {
        self.fetch_all(SPECIALIZATION_QUERY).await
    }

    async fn students_for_careers_module(&self) -> Result<Vec<RosterRecord>> {
        self.fetch_all(CAREERS_QUERY).await
    }

    async fn push_status(&self, purpose: StatusPurpose, email: &str) -> NotificationResult {
        let result = self
            .post_form(self.status_url(purpose), &[("email", email)])
            .await;
        if !result.ok {
            tracing::warn!("Status push for {} failed: {:?}", email, result.error);
        }
        result
    }

    async fn push_exception(&self, report: &ExceptionReport) -> NotificationResult {
        let result = self.post_form(&self.webhooks.exception, report).await;
        if !result.ok {
            tracing::warn!(
                "Exception push for {} failed: {:?}",
                report.email,
                result.error
            );
        }
        result
    }
}
