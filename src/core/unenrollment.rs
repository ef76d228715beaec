use crate::core::engine::PassSettings;
use crate::domain::{
    EnrollmentAttempt, EnrollmentKind, ExceptionReport, Platform, RosterRecord, RosterSource,
    StatusPurpose,
};
use crate::utils::error::Result;

/// Unenroll every roster record flagged for removal.
///
/// Course rows are deactivated, never deleted, and the membership row is
/// dropped in the same logical step. Already-unenrolled users are an
/// idempotent no-op that still confirms the state back to the roster source.
pub async fn unenroll_all<R, P>(roster: &R, platform: &P, settings: &PassSettings) -> Result<()>
where
    R: RosterSource,
    P: Platform,
{
    let records = roster.students_to_unenroll().await?;
    tracing::info!("Fetched {} unenrollment records", records.len());

    for record in &records {
        if let Err(e) = process_record(record, roster, platform, settings).await {
            tracing::error!(
                "Skipping unenrollment record for {:?}: {}",
                record.email(),
                e
            );
        }
    }
    Ok(())
}

async fn process_record<R, P>(
    record: &RosterRecord,
    roster: &R,
    platform: &P,
    settings: &PassSettings,
) -> Result<()>
where
    R: RosterSource,
    P: Platform,
{
    let Some(email) = record.email() else {
        return Ok(());
    };
    if settings.dry_run {
        tracing::info!("** dryrun attempting unenrollment of student: {}", email);
        return Ok(());
    }

    if platform.find_user(email).await?.is_none() {
        tracing::error!("Email {} not found on platform", email);
        roster
            .push_exception(&ExceptionReport::new(
                email,
                "Email",
                email,
                "unenroll",
                "Email on student's CRM profile not found on the platform",
            ))
            .await;
        return Ok(());
    }

    let program_code = record.programme_id.as_deref().unwrap_or_default();
    let Some(program) = platform.get_program(program_code).await? else {
        tracing::error!("Could not find program: {}", program_code);
        roster
            .push_exception(&ExceptionReport::new(
                email,
                "Programme_ID",
                program_code,
                "unenroll",
                "Programme ID does not exist on the platform",
            ))
            .await;
        return Ok(());
    };

    if !platform.is_member(email, &program.code).await? {
        // Likely unenrolled manually; just reflect the state in the CRM.
        tracing::info!("{} is already unenrolled from {}", email, program.code);
        roster.push_status(StatusPurpose::Unenrolled, email).await;
        return Ok(());
    }

    for course in &program.courses {
        platform.deactivate_course_enrollment(email, course).await?;
    }
    platform.remove_member(email, &program.code).await?;

    let push = roster.push_status(StatusPurpose::Unenrolled, email).await;
    if !push.ok {
        tracing::warn!(
            "Unenrollment status push for {} failed: {:?}",
            email,
            push.error
        );
    }

    // Unenrollment emails are the CRM's responsibility, so email_sent stays
    // false on the audit row.
    platform
        .record_attempt(EnrollmentAttempt::new(
            email,
            &program.code,
            EnrollmentKind::Unenrollment,
            true,
            true,
            false,
        ))
        .await?;
    Ok(())
}
