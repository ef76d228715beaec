use anyhow::Context;
use clap::Parser;
use roster_sync::config::cli::{Cli, Command};
use roster_sync::utils::{logger, validation::Validate};
use roster_sync::{
    CrmClient, InMemoryPlatform, PassSettings, SyncConfig, SyncEngine, SyncPass, TemplateMailer,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting roster-sync");

    let config = SyncConfig::from_file(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    config.validate().context("validating config")?;

    let platform = InMemoryPlatform::from_catalog_file(&config.catalog.file)
        .with_context(|| format!("loading catalog from {}", config.catalog.file.display()))?;
    let roster = CrmClient::new(config.crm.clone(), config.webhooks.clone());
    let mailer = TemplateMailer::new(config.mail.clone());

    let settings = PassSettings {
        excluded_onboarding_courses: config.enrollment.excluded_onboarding_courses.clone(),
        upgrade_program_code: config.enrollment.upgrade_program_code.clone(),
        careers_program_code: config.enrollment.careers_program_code.clone(),
        careers_course_id: config.enrollment.careers_course_id.clone(),
        dry_run: cli.dry_run,
    };
    if settings.dry_run {
        tracing::info!("Dry run: no writes will be performed");
    }

    let passes = match cli.command {
        Command::Enroll => vec![SyncPass::Enrollment],
        Command::Unenroll => vec![SyncPass::Unenrollment],
        Command::Specializations => vec![SyncPass::Specializations],
        Command::Careers => vec![SyncPass::CareersModule],
        Command::All => vec![
            SyncPass::Enrollment,
            SyncPass::Unenrollment,
            SyncPass::Specializations,
            SyncPass::CareersModule,
        ],
    };

    let engine = SyncEngine::new(roster, platform, mailer, settings);
    engine.run(&passes).await.context("running sync passes")?;

    tracing::info!("roster-sync completed");
    Ok(())
}
