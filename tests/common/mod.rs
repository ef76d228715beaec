#![allow(dead_code)]

use httpmock::prelude::*;
use roster_sync::config::{CrmConfig, MailConfig, WebhookConfig};
use roster_sync::domain::{Platform, Program};
use roster_sync::{CrmClient, InMemoryPlatform, PassSettings, SyncEngine, TemplateMailer};
use tempfile::TempDir;

pub const CAREERS_COURSE: &str = "course-v1:test+cc_101+2018_T1";

// Query markers used to tell the four roster fetches apart at the mock
// server; each COQL query contains exactly one of them.
pub const ENROLL_MARKER: &str = "Lead_Status = 'Enroll'";
pub const UNENROLL_MARKER: &str = "LMS_Access_Status";
pub const SPECIALIZATION_MARKER: &str = "Specialisation_Enrollment_Status";
pub const CAREERS_MARKER: &str = "Access_to_Careers_Module";

pub fn course_for(code: &str) -> String {
    format!("course-v1:test+{}+2020", code)
}

fn base_program(code: &str, name: &str) -> Program {
    Program {
        code: code.to_string(),
        name: name.to_string(),
        courses: vec![course_for(code)],
        ..Program::default()
    }
}

pub struct Harness {
    pub server: MockServer,
    pub platform: InMemoryPlatform,
    _templates: TempDir,
    templates_dir: std::path::PathBuf,
}

impl Harness {
    pub async fn new() -> Self {
        let server = MockServer::start();

        server.mock(|when, then| {
            when.method(POST).path("/oauth/token");
            then.status(200)
                .json_body(serde_json::json!({"access_token": "12345"}));
        });
        server.mock(|when, then| {
            when.method(POST).path("/mail/send");
            then.status(200);
        });

        let templates = TempDir::new().unwrap();
        std::fs::create_dir_all(templates.path().join("default")).unwrap();
        std::fs::write(
            templates.path().join("default/enrollment_email.html"),
            "<p>Welcome to {{ program_name }}, {{ email }}. Password: {{ password }}</p>",
        )
        .unwrap();
        let templates_dir = templates.path().to_path_buf();

        let platform = InMemoryPlatform::new();
        seed_catalog(&platform).await;

        Self {
            server,
            platform,
            _templates: templates,
            templates_dir,
        }
    }

    fn settings(&self, dry_run: bool) -> PassSettings {
        PassSettings {
            excluded_onboarding_courses: vec![CAREERS_COURSE.to_string()],
            upgrade_program_code: "5DCC".to_string(),
            careers_program_code: "disd".to_string(),
            careers_course_id: CAREERS_COURSE.to_string(),
            dry_run,
        }
    }

    pub fn engine(&self) -> SyncEngine<CrmClient, InMemoryPlatform, TemplateMailer> {
        self.build_engine(false)
    }

    pub fn dry_run_engine(&self) -> SyncEngine<CrmClient, InMemoryPlatform, TemplateMailer> {
        self.build_engine(true)
    }

    fn build_engine(&self, dry_run: bool) -> SyncEngine<CrmClient, InMemoryPlatform, TemplateMailer> {
        let crm = CrmClient::new(
            CrmConfig {
                coql_endpoint: self.server.url("/coql"),
                refresh_endpoint: self.server.url("/oauth/token"),
                client_id: "id".to_string(),
                client_secret: "secret".to_string(),
                refresh_token: "refresh".to_string(),
                page_size: 200,
            },
            WebhookConfig {
                enrollment: self.server.url("/zap/enrolled"),
                unenrollment: self.server.url("/zap/unenrolled"),
                specialization_enrollment: self.server.url("/zap/specialized"),
                careers_module_enrollment: self.server.url("/zap/careers"),
                exception: self.server.url("/zap/exception"),
            },
        );
        let mailer = TemplateMailer::new(MailConfig {
            relay_endpoint: self.server.url("/mail/send"),
            from_address: "learning@example.com".to_string(),
            templates_dir: self.templates_dir.clone(),
        });
        SyncEngine::new(crm, self.platform.clone(), mailer, self.settings(dry_run))
    }

    /// Mock one roster query (picked by its marker) to return the given
    /// records as a single page.
    pub fn mock_roster(&self, marker: &str, records: serde_json::Value) {
        self.server.mock(|when, then| {
            when.method(POST).path("/coql").body_contains(marker);
            then.status(200).json_body(serde_json::json!({
                "data": records,
                "info": {"more_records": false}
            }));
        });
    }

    pub async fn member(&self, email: &str, code: &str) -> bool {
        self.platform.is_member(email, code).await.unwrap()
    }

    /// Directly place a user into a program, the way an earlier enrollment
    /// pass would have: active course rows plus the membership row.
    pub async fn seed_enrollment(&self, email: &str, code: &str) {
        let program = self.platform.get_program(code).await.unwrap().unwrap();
        for course in &program.courses {
            self.platform.enroll_in_course(email, course).await.unwrap();
        }
        self.platform.add_member(email, code).await.unwrap();
    }

    pub async fn seed_user(&self, email: &str, full_name: &str) {
        self.platform
            .register_user(email, full_name, "seeded")
            .await
            .unwrap();
    }
}

async fn seed_catalog(platform: &InMemoryPlatform) {
    platform
        .insert_program(base_program("spsc", "Sample Content"))
        .await;
    platform
        .insert_program(base_program("diwadspsc", "Sample Content Diwad"))
        .await;

    let mut ls = base_program("diwadls", "Web App Development Learning Supports 1");
    // Intentional whitespace and single quotes, as seen in CRM data.
    ls.support_sources = Some("   ' Eligible College 1', Eligible College 2  ".to_string());
    platform.insert_program(ls).await;

    let mut ls2 = base_program("diwadls2", "Web App Development Learning Supports 2");
    ls2.support_sources = Some("Eligible College 3  , \r\n\"Eligible College 1 \"".to_string());
    platform.insert_program(ls2).await;

    let mut ls3 = base_program("diwadls3", "Web App Development Learning Supports 3");
    ls3.support_sources = Some("  Eligible College 3   ".to_string());
    platform.insert_program(ls3).await;

    let mut open_ls = base_program("diwadlsopen", "Web App Development Open Learning Supports");
    open_ls.support_sources = Some("".to_string());
    platform.insert_program(open_ls).await;

    let mut cc = base_program("disdcc", "Common Curriculum");
    cc.sample_content = vec!["spsc".to_string()];
    platform.insert_program(cc).await;

    let mut disd = base_program("disd", "Diploma in Software Development");
    disd.courses.push(CAREERS_COURSE.to_string());
    platform.insert_program(disd).await;

    let mut advfe = base_program("spadvfe", "Advanced Frontend");
    advfe.specialization_for = Some("disdcc".to_string());
    platform.insert_program(advfe).await;

    let mut predan = base_program("sppredan", "Predictive Analytics");
    predan.specialization_for = Some("disdcc".to_string());
    platform.insert_program(predan).await;

    platform
        .insert_program(base_program("diwad", "Diploma in Web Application Development"))
        .await;

    let mut diwad_new = base_program("diwad220407", "Diploma in Web App Development");
    diwad_new.support_programs = vec!["diwadls".to_string()];
    platform.insert_program(diwad_new).await;

    let mut diwad221005 = base_program("diwad221005", "L5 Diploma in Web App Development");
    diwad221005.support_programs = vec![
        "diwadls".to_string(),
        "diwadls2".to_string(),
        "diwadls3".to_string(),
    ];
    platform.insert_program(diwad221005).await;

    let mut diwad_exp = base_program("diwadexp", "Test Diploma in Web App Development");
    diwad_exp.support_programs = vec![
        "diwadls".to_string(),
        "diwadls2".to_string(),
        "diwadls3".to_string(),
        "diwadlsopen".to_string(),
    ];
    diwad_exp.sample_content = vec!["diwadspsc".to_string()];
    platform.insert_program(diwad_exp).await;

    platform
        .insert_program(base_program("5DCC", "Five Day Coding Challenge"))
        .await;
}
