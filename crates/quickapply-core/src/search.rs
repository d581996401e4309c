use crate::applicant::SearchCriteria;
use crate::Result;
use serde::{Deserialize, Serialize};
use url::Url;

/// Where and how the job search runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub base_url: String,
    pub login_url: String,
    /// Restrict results to quick-apply listings (`f_AL`)
    pub easy_apply_only: bool,
    /// Work-type filter (`f_WT`)
    pub work_type: Option<String>,
    /// Sort order (`sortBy`), `DD` is most recent first
    pub sort_by: String,
    /// Posting-age window (`f_TPR`), `r86400` is the last 24 hours
    pub time_posted: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.linkedin.com/jobs/search/".to_string(),
            login_url: "https://www.linkedin.com/login".to_string(),
            easy_apply_only: true,
            work_type: Some("2".to_string()),
            sort_by: "DD".to_string(),
            time_posted: Some("r86400".to_string()),
        }
    }
}

impl SearchConfig {
    /// Build the results URL for the given criteria
    pub fn search_url(&self, criteria: &SearchCriteria) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("keywords", &criteria.job_title);
            query.append_pair("location", &criteria.location);
            if self.easy_apply_only {
                query.append_pair("f_AL", "true");
            }
            if let Some(work_type) = &self.work_type {
                query.append_pair("f_WT", work_type);
            }
            query.append_pair("sortBy", &self.sort_by);
            query.append_pair("position", "1");
            query.append_pair("pageNum", "0");
            if let Some(window) = &self.time_posted {
                query.append_pair("f_TPR", window);
            }
        }
        Ok(url)
    }

    pub fn login_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.login_url)?)
    }
}
