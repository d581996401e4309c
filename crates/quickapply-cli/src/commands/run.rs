use anyhow::{Context, Result, bail};
use console::style;
use quickapply_browser::CdpSession;
use quickapply_core::applicant::ApplicantProfile;
use quickapply_driver::{ApplicationDriver, DriverSettings, OpenAiResponder};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::Instrument;

/// Options from the command line that override the config file
#[derive(Debug, Default)]
pub struct RunOverrides {
    pub chrome_path: Option<PathBuf>,
    pub profile: Option<String>,
    pub headless: bool,
    pub skip_login: bool,
}

pub fn execute(config_path: Option<&Path>, overrides: RunOverrides) -> Result<()> {
    let skip_login = overrides.skip_login;
    let mut config = super::load_config(config_path)?;
    if overrides.chrome_path.is_some() {
        config.browser.chrome_path = overrides.chrome_path;
    }
    if overrides.profile.is_some() {
        config.browser.profile = overrides.profile;
    }
    config.browser.headless |= overrides.headless;
    config.validate().context("Invalid configuration")?;

    let resume_text = quickapply_core::resume::load(&config.resume_path)
        .with_context(|| format!("Failed to read resume {}", config.resume_path.display()))?;
    tracing::info!(
        "Loaded resume {} ({} characters)",
        config.resume_path.display(),
        resume_text.len()
    );

    let responder = OpenAiResponder::new(
        config.api_key.clone(),
        resume_text.clone(),
        config.llm.clone(),
    )?;
    let profile = ApplicantProfile::from_config(&config, resume_text);
    let settings = DriverSettings::from_config(&config);

    // One thread of control: the driver and the CDP handler share it
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let span = tracing::info_span!("run", job_title = %config.job_title);
    let summary = runtime.block_on(
        async {
            println!("{}", style("Launching browser...").cyan());
            let session = CdpSession::launch(&config.browser)
                .await
                .context("Failed to start the browser")?;

            let summary = ApplicationDriver::new(session, responder, profile, settings)
                .skip_login(skip_login)
                .run()
                .await;
            anyhow::Ok(summary)
        }
        .instrument(span),
    );

    runtime.shutdown_timeout(Duration::from_secs(2));
    let summary = summary?;

    println!();
    println!("{}", style("Run summary").bold());
    println!("  Discovered: {}", summary.discovered);
    println!("  Applied:    {}", style(summary.submitted).green());
    println!("  Skipped:    {}", summary.skipped);
    println!("  Abandoned:  {}", summary.abandoned);
    println!("  Stopped:    {}", summary.stop_reason);

    if summary.is_fatal() {
        bail!("Run ended early: {}", summary.stop_reason);
    }
    Ok(())
}
