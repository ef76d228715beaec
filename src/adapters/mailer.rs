use crate::config::MailConfig;
use crate::domain::{EnrollmentKind, Mailer, Program, UserAccount};
use async_trait::async_trait;
use reqwest::Client;
use std::path::PathBuf;

// Each program keeps its own branded email files in a directory named after
// the program; the `default` directory serves any program (or kind) without
// one of its own.
const FALLBACK_DIR: &str = "default";
const FALLBACK_TEMPLATE_FILE: &str = "enrollment_email.html";
const FALLBACK_SUBJECT: &str = "You have been enrolled in your {} program";

struct TemplateParts {
    file: &'static str,
    subject: &'static str,
}

fn template_parts(kind: EnrollmentKind) -> TemplateParts {
    match kind {
        EnrollmentKind::Enrollment => TemplateParts {
            file: "enrollment_email.html",
            subject: "You have been enrolled in your {} program",
        },
        EnrollmentKind::Reenrollment => TemplateParts {
            file: "reenrollment_email.html",
            subject: "You have been re-enrolled!",
        },
        EnrollmentKind::Upgrade => TemplateParts {
            file: "upgrade_enrollment_email.html",
            subject: "You have been enrolled in your {} program",
        },
        EnrollmentKind::Specialization => TemplateParts {
            file: "specialization_enrollment_email.html",
            subject: "You have been enrolled in your {} specialization",
        },
        EnrollmentKind::Unenrollment => TemplateParts {
            file: "unenrollment_email.html",
            subject: "Unenrollment",
        },
    }
}

/// Sends templated enrollment emails through an HTTP mail relay.
///
/// Templates are resolved per `(program directory, enrollment kind)`; when
/// the program-specific file does not exist on disk, the default template and
/// subject pair is used instead.
#[derive(Clone)]
pub struct TemplateMailer {
    client: Client,
    config: MailConfig,
}

impl TemplateMailer {
    pub fn new(config: MailConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// The template path and subject for this program and kind, falling back
    /// to the default pair when the program-specific file is missing.
    fn resolve_template(&self, program: &Program, kind: EnrollmentKind) -> (PathBuf, String) {
        let parts = template_parts(kind);
        let dir = program.email_dir.as_deref().unwrap_or(&program.code);
        let path = self.config.templates_dir.join(dir).join(parts.file);
        if path.exists() {
            return (path, parts.subject.replace("{}", &program.name));
        }

        let fallback = self
            .config
            .templates_dir
            .join(FALLBACK_DIR)
            .join(FALLBACK_TEMPLATE_FILE);
        (fallback, FALLBACK_SUBJECT.replace("{}", &program.name))
    }

    fn render(template: &str, user: &UserAccount, program: &Program, password: Option<&str>) -> String {
        template
            .replace("{{ email }}", &user.email)
            .replace("{{ program_name }}", &program.name)
            .replace("{{ password }}", password.unwrap_or_default())
    }
}

#[async_trait]
impl Mailer for TemplateMailer {
    async fn send_enrollment_email(
        &self,
        user: &UserAccount,
        program: &Program,
        kind: EnrollmentKind,
        password: Option<&str>,
    ) -> bool {
        let (path, subject) = self.resolve_template(program, kind);
        let template = match std::fs::read_to_string(&path) {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!("Could not read email template {}: {}", path.display(), e);
                return false;
            }
        };
        let html = Self::render(&template, user, program, password);

        let payload = serde_json::json!({
            "to": user.email,
            "from": self.config.from_address,
            "subject": subject,
            "html": html,
        });

        match self
            .client
            .post(&self.config.relay_endpoint)
            .json(&payload)
            .send()
            .await
        {
            Ok(resp) if resp.status().is_success() => {
                tracing::info!("Email successfully sent to {}", user.email);
                true
            }
            Ok(resp) => {
                tracing::warn!(
                    "Failed to send email to {}: relay returned {}",
                    user.email,
                    resp.status()
                );
                false
            }
            Err(e) => {
                tracing::warn!("Failed to send email to {}: {}", user.email, e);
                false
            }
        }
    }
}
