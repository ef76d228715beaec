use crate::core::engine::PassSettings;
use crate::domain::{ExceptionReport, Platform, RosterSource, StatusPurpose};
use crate::utils::error::Result;

/// Enroll students cleared by the CRM into the late-unlocking careers module.
///
/// The module lives in the main program but is excluded from initial
/// onboarding; students gain access here once the CRM flags them, after
/// their qualifying project submission.
pub async fn enroll_careers_module<R, P>(
    roster: &R,
    platform: &P,
    settings: &PassSettings,
) -> Result<()>
where
    R: RosterSource,
    P: Platform,
{
    let records = roster.students_for_careers_module().await?;
    tracing::info!("Fetched {} careers module records", records.len());

    let Some(program) = platform.get_program(&settings.careers_program_code).await? else {
        tracing::error!(
            "Careers program {} does not exist on the platform",
            settings.careers_program_code
        );
        return Ok(());
    };

    for record in &records {
        let Some(email) = record.email() else {
            continue;
        };
        if settings.dry_run {
            tracing::info!("** dryrun attempting careers module enrollment of student: {}", email);
            continue;
        }

        if platform.find_user(email).await?.is_none() {
            tracing::error!("Email {} not found on platform", email);
            roster
                .push_exception(&ExceptionReport::new(
                    email,
                    "Email",
                    email,
                    "enroll in careers module",
                    "Email on student's CRM profile not found on the platform",
                ))
                .await;
            continue;
        }

        for course in &program.courses {
            if course != &settings.careers_course_id {
                continue;
            }
            platform.enroll_in_course(email, course).await?;
            platform.add_member(email, &program.code).await?;
            tracing::info!("{} was enrolled in the careers module", email);

            let push = roster
                .push_status(StatusPurpose::CareersModuleEnrolled, email)
                .await;
            if !push.ok {
                tracing::warn!(
                    "Careers module status push for {} failed: {:?}",
                    email,
                    push.error
                );
            }
        }
    }
    Ok(())
}
