use anyhow::{Result, bail};
use quickapply_core::applicant::SearchCriteria;
use std::path::Path;

/// Print the search URL the run would open
pub fn execute(config_path: Option<&Path>) -> Result<()> {
    let config = super::load_config(config_path)?;
    if config.job_title.trim().is_empty() || config.location.trim().is_empty() {
        bail!("job_title and location must be set to build a search URL");
    }

    let url = config.search.search_url(&SearchCriteria {
        job_title: config.job_title.clone(),
        location: config.location.clone(),
    })?;
    println!("{}", url);
    Ok(())
}
