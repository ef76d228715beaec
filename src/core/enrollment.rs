use crate::core::catalog;
use crate::core::engine::PassSettings;
use crate::core::identity;
use crate::domain::{
    EnrollmentAttempt, ExceptionReport, Mailer, Platform, Program, RosterRecord, RosterSource,
    StatusPurpose,
};
use crate::utils::error::Result;

/// Enroll every roster record flagged for enrollment, in roster order.
///
/// Each record is processed independently: a record that cannot be handled is
/// reported and skipped, never fatal to the batch.
pub async fn enroll_all<R, P, M>(
    roster: &R,
    platform: &P,
    mailer: &M,
    settings: &PassSettings,
) -> Result<()>
where
    R: RosterSource,
    P: Platform,
    M: Mailer,
{
    let records = roster.students_to_enroll().await?;
    tracing::info!("Fetched {} enrollment records", records.len());

    for record in &records {
        if let Err(e) = process_record(record, roster, platform, mailer, settings).await {
            tracing::error!(
                "Skipping enrollment record for {:?}: {}",
                record.email(),
                e
            );
        }
    }
    Ok(())
}

async fn process_record<R, P, M>(
    record: &RosterRecord,
    roster: &R,
    platform: &P,
    mailer: &M,
    settings: &PassSettings,
) -> Result<()>
where
    R: RosterSource,
    P: Platform,
    M: Mailer,
{
    let Some(email) = record.email() else {
        return Ok(());
    };
    if settings.dry_run {
        tracing::info!("** dryrun attempting enrollment of student: {}", email);
        return Ok(());
    }

    let full_name = record.full_name.as_deref().unwrap_or(email);
    let (user, password, kind) =
        identity::resolve_or_register(platform, email, full_name, &settings.upgrade_program_code)
            .await?;

    let program_code = record.programme_id.as_deref().unwrap_or_default();
    let Some(program) = platform.get_program(program_code).await? else {
        tracing::error!("Could not find program: {}", program_code);
        roster
            .push_exception(&ExceptionReport::new(
                email,
                "Programme_ID",
                program_code,
                "enroll",
                "Programme ID does not exist on the platform",
            ))
            .await;
        return Ok(());
    };

    let enrolled = enroll_with_auxiliaries(
        platform,
        &program,
        email,
        record.student_source.as_deref(),
        &settings.excluded_onboarding_courses,
    )
    .await?;

    let email_sent = mailer
        .send_enrollment_email(&user, &program, kind, password.as_deref())
        .await;

    platform.set_platform_access(email, true).await?;

    let push = roster.push_status(StatusPurpose::Enrolled, email).await;
    if !push.ok {
        tracing::warn!(
            "Enrollment status push for {} failed: {:?}",
            email,
            push.error
        );
    }

    platform
        .record_attempt(EnrollmentAttempt::new(
            email,
            &program.code,
            kind,
            true,
            enrolled,
            email_sent,
        ))
        .await?;
    Ok(())
}

/// A user counts as enrolled in a program iff they hold an active course row
/// for one of its courses and the membership row exists.
pub(crate) async fn is_enrolled<P: Platform>(
    platform: &P,
    email: &str,
    program: &Program,
) -> Result<bool> {
    if !platform.is_member(email, &program.code).await? {
        return Ok(false);
    }
    let rows = platform.course_enrollments(email).await?;
    Ok(rows
        .iter()
        .any(|r| r.active && program.courses.contains(&r.course_id)))
}

/// Enroll `email` into every course of `program` except the excluded ones,
/// then add the membership row. Success is decided by re-checking the
/// enrolled condition afterwards, not by the course loop completing.
pub(crate) async fn enroll_into_program<P: Platform>(
    platform: &P,
    program: &Program,
    email: &str,
    exclude_courses: &[String],
) -> Result<bool> {
    for course in &program.courses {
        if exclude_courses.iter().any(|c| c == course) {
            continue;
        }
        platform.enroll_in_course(email, course).await?;
    }

    platform.add_member(email, &program.code).await?;
    let enrolled = is_enrolled(platform, email, program).await?;

    if enrolled {
        tracing::info!("{} was enrolled in {}", email, program.name);
    } else {
        tracing::info!("Failed to enroll {} in {}", email, program.name);
    }
    Ok(enrolled)
}

/// Enroll into the main program, then cascade: sample-content programs
/// unconditionally, support programs by source eligibility. Cascade failures
/// are logged and do not affect the main result or the remaining cascades.
pub(crate) async fn enroll_with_auxiliaries<P: Platform>(
    platform: &P,
    program: &Program,
    email: &str,
    student_source: Option<&str>,
    exclude_courses: &[String],
) -> Result<bool> {
    let enrolled = enroll_into_program(platform, program, email, exclude_courses).await?;
    if !enrolled {
        return Ok(false);
    }

    for code in &program.sample_content {
        match platform.get_program(code).await {
            Ok(Some(sample)) => {
                if let Err(e) =
                    enroll_into_program(platform, &sample, email, exclude_courses).await
                {
                    tracing::warn!(
                        "Sample content cascade into {} failed for {}: {}",
                        sample.code,
                        email,
                        e
                    );
                }
            }
            Ok(None) => {
                tracing::warn!(
                    "Sample content program {} attached to {} does not exist",
                    code,
                    program.code
                );
            }
            Err(e) => {
                tracing::warn!("Sample content lookup for {} failed: {}", code, e);
            }
        }
    }

    match catalog::eligible_support_programs(platform, program, student_source).await {
        Ok(supports) => {
            for support in supports {
                if let Err(e) =
                    enroll_into_program(platform, &support, email, exclude_courses).await
                {
                    tracing::warn!(
                        "Support cascade into {} failed for {}: {}",
                        support.code,
                        email,
                        e
                    );
                }
            }
        }
        Err(e) => {
            tracing::warn!("Support program lookup for {} failed: {}", program.code, e);
        }
    }

    Ok(true)
}
