mod common;

use common::{course_for, Harness, CAREERS_COURSE, ENROLL_MARKER};
use httpmock::prelude::*;
use roster_sync::domain::{EnrollmentKind, Platform};
use roster_sync::SyncPass;
use serde_json::json;

fn record(email: &str, program: &str) -> serde_json::Value {
    json!({"Email": email, "Full_Name": "Test Student", "Programme_ID": program})
}

#[tokio::test]
async fn enrolls_into_program_and_its_sample_content() {
    let h = Harness::new().await;
    h.mock_roster(ENROLL_MARKER, json!([record("a@x.com", "disdcc")]));

    h.engine().run(&[SyncPass::Enrollment]).await.unwrap();

    assert!(h.member("a@x.com", "disdcc").await);
    assert!(h.member("a@x.com", "spsc").await);
    assert!(!h.member("a@x.com", "disd").await);
    assert!(h
        .platform
        .course_record("a@x.com", &course_for("disdcc"))
        .await
        .unwrap()
        .active);
    assert!(h.platform.find_user("a@x.com").await.unwrap().is_some());
    assert!(h.platform.has_platform_access("a@x.com").await);

    let attempts = h.platform.attempts().await;
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].kind, EnrollmentKind::Enrollment);
    assert!(attempts[0].registered);
    assert!(attempts[0].enrolled);
    assert!(attempts[0].email_sent);
}

#[tokio::test]
async fn program_without_sample_content_enrolls_alone() {
    let h = Harness::new().await;
    h.mock_roster(ENROLL_MARKER, json!([record("a@x.com", "disd")]));

    h.engine().run(&[SyncPass::Enrollment]).await.unwrap();

    assert!(h.member("a@x.com", "disd").await);
    assert!(!h.member("a@x.com", "spsc").await);
}

#[tokio::test]
async fn unknown_program_code_reports_exception_and_changes_nothing() {
    let h = Harness::new().await;
    h.mock_roster(ENROLL_MARKER, json!([record("a@x.com", "dddd")]));
    let exception_hook = h.server.mock(|when, then| {
        when.method(POST)
            .path("/zap/exception")
            .body_contains("crm_field=Programme_ID")
            .body_contains("unexpected_value=dddd");
        then.status(200);
    });

    h.engine().run(&[SyncPass::Enrollment]).await.unwrap();

    exception_hook.assert();
    assert!(!h.member("a@x.com", "dddd").await);
    assert!(h.platform.attempts().await.is_empty());
}

#[tokio::test]
async fn excluded_course_stays_out_of_onboarding() {
    let h = Harness::new().await;
    h.mock_roster(ENROLL_MARKER, json!([record("a@x.com", "disd")]));

    h.engine().run(&[SyncPass::Enrollment]).await.unwrap();

    assert!(h.member("a@x.com", "disd").await);
    assert!(h
        .platform
        .course_record("a@x.com", CAREERS_COURSE)
        .await
        .is_none());
    assert!(h
        .platform
        .course_record("a@x.com", &course_for("disd"))
        .await
        .unwrap()
        .active);
}

#[tokio::test]
async fn eligible_source_gets_the_support_program() {
    let h = Harness::new().await;
    h.mock_roster(
        ENROLL_MARKER,
        json!([{
            "Email": "a@x.com",
            "Full_Name": "Test Student",
            "Programme_ID": "diwad220407",
            "Student_Source": "'Eligible College 1 '"
        }]),
    );

    h.engine().run(&[SyncPass::Enrollment]).await.unwrap();

    assert!(h.member("a@x.com", "diwad220407").await);
    assert!(h.member("a@x.com", "diwadls").await);
}

#[tokio::test]
async fn ineligible_source_gets_only_the_main_program() {
    let h = Harness::new().await;
    h.mock_roster(
        ENROLL_MARKER,
        json!([{
            "Email": "a@x.com",
            "Full_Name": "Test Student",
            "Programme_ID": "diwad220407",
            "Student_Source": "Some Other College"
        }]),
    );

    h.engine().run(&[SyncPass::Enrollment]).await.unwrap();

    assert!(h.member("a@x.com", "diwad220407").await);
    assert!(!h.member("a@x.com", "diwadls").await);
}

#[tokio::test]
async fn source_matching_is_unaffected_by_quotes_and_whitespace() {
    let h = Harness::new().await;
    h.mock_roster(
        ENROLL_MARKER,
        json!([{
            "Email": "a@x.com",
            "Full_Name": "Test Student",
            "Programme_ID": "diwad221005",
            "Student_Source": " \"Eligible College 3 \""
        }]),
    );

    h.engine().run(&[SyncPass::Enrollment]).await.unwrap();

    // College 3 appears in diwadls2 and diwadls3 but not diwadls.
    assert!(h.member("a@x.com", "diwad221005").await);
    assert!(!h.member("a@x.com", "diwadls").await);
    assert!(h.member("a@x.com", "diwadls2").await);
    assert!(h.member("a@x.com", "diwadls3").await);
}

#[tokio::test]
async fn unrestricted_support_and_sample_content_apply_without_a_source() {
    let h = Harness::new().await;
    h.mock_roster(
        ENROLL_MARKER,
        json!([{
            "Email": "a@x.com",
            "Full_Name": "Test Student",
            "Programme_ID": "diwadexp"
        }]),
    );

    h.engine().run(&[SyncPass::Enrollment]).await.unwrap();

    assert!(h.member("a@x.com", "diwadexp").await);
    assert!(h.member("a@x.com", "diwadspsc").await);
    // Empty source list means unrestricted; the others all require a source.
    assert!(h.member("a@x.com", "diwadlsopen").await);
    assert!(!h.member("a@x.com", "diwadls").await);
    assert!(!h.member("a@x.com", "diwadls2").await);
    assert!(!h.member("a@x.com", "diwadls3").await);
}

#[tokio::test]
async fn existing_user_is_recorded_as_reenrollment() {
    let h = Harness::new().await;
    h.seed_user("a@x.com", "Test Student").await;
    h.mock_roster(ENROLL_MARKER, json!([record("a@x.com", "disd")]));

    h.engine().run(&[SyncPass::Enrollment]).await.unwrap();

    let attempts = h.platform.attempts().await;
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].kind, EnrollmentKind::Reenrollment);
}

#[tokio::test]
async fn coding_challenge_alumni_are_recorded_as_upgrade() {
    let h = Harness::new().await;
    h.seed_user("a@x.com", "Test Student").await;
    h.seed_enrollment("a@x.com", "5DCC").await;
    h.mock_roster(ENROLL_MARKER, json!([record("a@x.com", "disd")]));

    h.engine().run(&[SyncPass::Enrollment]).await.unwrap();

    let attempts = h.platform.attempts().await;
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].kind, EnrollmentKind::Upgrade);
    assert!(h.member("a@x.com", "disd").await);
}

#[tokio::test]
async fn enrollment_status_is_pushed_back() {
    let h = Harness::new().await;
    h.mock_roster(ENROLL_MARKER, json!([record("a@x.com", "disd")]));
    let status_hook = h.server.mock(|when, then| {
        when.method(POST)
            .path("/zap/enrolled")
            .body_contains("email=a%40x.com");
        then.status(200);
    });

    h.engine().run(&[SyncPass::Enrollment]).await.unwrap();

    status_hook.assert();
}

#[tokio::test]
async fn records_without_an_email_are_skipped() {
    let h = Harness::new().await;
    h.mock_roster(
        ENROLL_MARKER,
        json!([
            {"Full_Name": "No Email", "Programme_ID": "disd"},
            {"Email": "", "Full_Name": "Blank Email", "Programme_ID": "disd"},
            record("b@x.com", "disd")
        ]),
    );

    h.engine().run(&[SyncPass::Enrollment]).await.unwrap();

    assert!(h.member("b@x.com", "disd").await);
    assert_eq!(h.platform.attempts().await.len(), 1);
}

#[tokio::test]
async fn dry_run_writes_nothing() {
    let h = Harness::new().await;
    h.mock_roster(ENROLL_MARKER, json!([record("a@x.com", "disdcc")]));

    h.dry_run_engine().run(&[SyncPass::Enrollment]).await.unwrap();

    assert!(!h.member("a@x.com", "disdcc").await);
    assert!(h.platform.find_user("a@x.com").await.unwrap().is_none());
    assert!(h.platform.attempts().await.is_empty());
}
