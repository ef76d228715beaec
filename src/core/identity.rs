use crate::domain::{EnrollmentKind, Platform, UserAccount};
use crate::utils::error::Result;
use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};

const GENERATED_PASSWORD_LEN: usize = 16;

fn generate_password() -> String {
    (0..GENERATED_PASSWORD_LEN)
        .map(|_| OsRng.sample(Alphanumeric) as char)
        .collect()
}

/// Find the platform account for `email`, registering one when it does not
/// exist.
///
/// A new account gets a randomly generated password which is returned so the
/// enrollment email can carry it; the account is persisted immediately, so a
/// failure later in the same record's processing does not lose the
/// registration. For an existing account no password is returned, and the
/// kind is `Upgrade` when the user's first known program is the legacy
/// short-program product, `Reenrollment` otherwise.
pub async fn resolve_or_register<P: Platform>(
    platform: &P,
    email: &str,
    full_name: &str,
    upgrade_program_code: &str,
) -> Result<(UserAccount, Option<String>, EnrollmentKind)> {
    if let Some(user) = platform.find_user(email).await? {
        let first_program = platform.programs_of(email).await?.into_iter().next();
        let kind = match first_program {
            Some(p) if p.code == upgrade_program_code => EnrollmentKind::Upgrade,
            _ => EnrollmentKind::Reenrollment,
        };
        return Ok((user, None, kind));
    }

    let password = generate_password();
    let user = platform.register_user(email, full_name, &password).await?;
    Ok((user, Some(password), EnrollmentKind::Enrollment))
}
