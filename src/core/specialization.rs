use crate::core::engine::PassSettings;
use crate::core::enrollment::enroll_with_auxiliaries;
use crate::core::identity;
use crate::domain::{
    EnrollmentAttempt, EnrollmentKind, ExceptionReport, Mailer, Platform, RosterRecord,
    RosterSource, StatusPurpose,
};
use crate::utils::error::Result;
use chrono::{NaiveDate, Utc};

/// Switch students into their approved specialization, unenrolling them from
/// the previous (general or specialization) program once the new enrollment
/// has succeeded. The roster is pre-filtered upstream to approved records.
pub async fn enroll_specializations<R, P, M>(
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
    let records = roster.students_for_specialization().await?;
    tracing::info!("Fetched {} specialization records", records.len());

    let today = Utc::now().date_naive();
    for record in &records {
        if let Err(e) = process_record(record, roster, platform, mailer, settings, today).await {
            tracing::error!(
                "Skipping specialization record for {:?}: {}",
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
    today: NaiveDate,
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
        tracing::info!("** dryrun attempting specialization enrollment of student: {}", email);
        return Ok(());
    }

    // Pure date guard: absent, unparseable or strictly-future enrollment
    // dates defer the record to a later run. No audit row, no exception.
    let Some(date_raw) = record
        .specialization_enrollment_date
        .as_deref()
        .filter(|d| !d.is_empty())
    else {
        tracing::info!("Skipping {}: no specialization enrollment date", email);
        return Ok(());
    };
    let enrollment_date = match NaiveDate::parse_from_str(date_raw, "%Y-%m-%d") {
        Ok(d) => d,
        Err(_) => {
            tracing::info!(
                "Skipping {}: unparseable specialization enrollment date {:?}",
                email,
                date_raw
            );
            return Ok(());
        }
    };
    if enrollment_date > today {
        tracing::info!(
            "Skipping {}: specialization enrollment date {} is in the future",
            email,
            enrollment_date
        );
        return Ok(());
    }

    let full_name = record.full_name.as_deref().unwrap_or(email);
    let (user, password, _kind) =
        identity::resolve_or_register(platform, email, full_name, &settings.upgrade_program_code)
            .await?;

    let current_code = record.programme_id.as_deref().unwrap_or_default();
    let target_code = record
        .specialization_programme_id
        .as_deref()
        .unwrap_or_default();

    if current_code == target_code {
        report_already_enrolled(roster, email, target_code).await;
        return Ok(());
    }

    let Some(specialization) = platform.get_program(target_code).await? else {
        tracing::error!("Could not find specialisation: {}", target_code);
        roster
            .push_exception(&ExceptionReport::new(
                email,
                "Specialisation_programme_id",
                target_code,
                "enroll specialisation",
                "Specialisation programme ID does not exist on the platform",
            ))
            .await;
        return Ok(());
    };

    // The CRM's stated current program can be stale after an earlier switch.
    // When a change was requested, the program to leave is whichever of the
    // user's current programs is itself a specialization (last match wins;
    // at most one is assumed to exist).
    let mut unenroll_code = current_code.to_string();
    if record.specialization_change_requested.unwrap_or(false) {
        let mut previous = None;
        for program in platform.programs_of(email).await? {
            if program.specialization_for.is_some() {
                previous = Some(program.code);
            }
        }
        if let Some(previous) = previous {
            if previous == target_code {
                report_already_enrolled(roster, email, target_code).await;
                return Ok(());
            }
            unenroll_code = previous;
        }
    }

    let enrolled = enroll_with_auxiliaries(
        platform,
        &specialization,
        email,
        record.student_source.as_deref(),
        &settings.excluded_onboarding_courses,
    )
    .await?;

    let mut email_sent = false;
    if enrolled {
        // Courses overlap the general curriculum, so only the membership row
        // of the previous program is dropped.
        if !unenroll_code.is_empty() {
            if let Err(e) = platform.remove_member(email, &unenroll_code).await {
                tracing::warn!(
                    "Failed to unenroll {} from previous program {}: {}",
                    email,
                    unenroll_code,
                    e
                );
            }
        }

        email_sent = mailer
            .send_enrollment_email(
                &user,
                &specialization,
                EnrollmentKind::Specialization,
                password.as_deref(),
            )
            .await;

        let push = roster
            .push_status(StatusPurpose::SpecializationEnrolled, email)
            .await;
        if !push.ok {
            tracing::warn!(
                "Specialization status push for {} failed: {:?}",
                email,
                push.error
            );
        }
    }

    platform
        .record_attempt(EnrollmentAttempt::new(
            email,
            &specialization.code,
            EnrollmentKind::Specialization,
            true,
            enrolled,
            email_sent,
        ))
        .await?;
    Ok(())
}

async fn report_already_enrolled<R: RosterSource>(roster: &R, email: &str, target_code: &str) {
    tracing::info!(
        "**Student {} already enrolled in this specialization: {}**",
        email,
        target_code
    );
    roster
        .push_exception(&ExceptionReport::new(
            email,
            "Specialisation_programme_id",
            target_code,
            "enroll specialisation",
            "Student already enrolled in this specialization",
        ))
        .await;
}
