use crate::core::{careers, enrollment, specialization, unenrollment};
use crate::domain::{Mailer, Platform, RosterSource};
use crate::utils::error::Result;

/// Knobs shared by every pass.
#[derive(Debug, Clone)]
pub struct PassSettings {
    /// Course ids kept out of initial onboarding (e.g. the careers module).
    pub excluded_onboarding_courses: Vec<String>,
    /// Legacy entry-product code; a first program matching it makes a
    /// re-enrollment an upgrade.
    pub upgrade_program_code: String,
    pub careers_program_code: String,
    pub careers_course_id: String,
    /// Log what would happen without writing anything.
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPass {
    Enrollment,
    Unenrollment,
    Specializations,
    CareersModule,
}

/// Runs the selected synchronization passes, one after the other, each as a
/// single-threaded sweep over its own roster snapshot.
pub struct SyncEngine<R, P, M> {
    roster: R,
    platform: P,
    mailer: M,
    settings: PassSettings,
}

impl<R, P, M> SyncEngine<R, P, M>
where
    R: RosterSource,
    P: Platform,
    M: Mailer,
{
    pub fn new(roster: R, platform: P, mailer: M, settings: PassSettings) -> Self {
        Self {
            roster,
            platform,
            mailer,
            settings,
        }
    }

    pub async fn run(&self, passes: &[SyncPass]) -> Result<()> {
        for pass in passes {
            match pass {
                SyncPass::Enrollment => {
                    tracing::info!("Starting enrollment pass");
                    enrollment::enroll_all(&self.roster, &self.platform, &self.mailer, &self.settings)
                        .await?;
                }
                SyncPass::Unenrollment => {
                    tracing::info!("Starting unenrollment pass");
                    unenrollment::unenroll_all(&self.roster, &self.platform, &self.settings).await?;
                }
                SyncPass::Specializations => {
                    tracing::info!("Starting specialization pass");
                    specialization::enroll_specializations(
                        &self.roster,
                        &self.platform,
                        &self.mailer,
                        &self.settings,
                    )
                    .await?;
                }
                SyncPass::CareersModule => {
                    tracing::info!("Starting careers module pass");
                    careers::enroll_careers_module(&self.roster, &self.platform, &self.settings)
                        .await?;
                }
            }
        }
        Ok(())
    }
}
