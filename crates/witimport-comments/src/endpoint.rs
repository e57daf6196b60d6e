//! Work item comments endpoint

use crate::record::WorkItemId;

/// Comments API version the request body shape belongs to
pub const DEFAULT_API_VERSION: &str = "6.0-preview.3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base_url: String,
    project: String,
    api_version: String,
}

impl Endpoint {
    /// `base_url` is the organization URL; a trailing `/` is added if missing.
    pub fn new(base_url: impl Into<String>, project: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            base_url,
            project: project.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn comments_url(&self, id: WorkItemId) -> String {
        format!(
            "{}{}/_apis/wit/workItems/{id}/comments?api-version={}",
            self.base_url, self.project, self.api_version
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_comments_url() {
        let ep = Endpoint::new("https://dev.azure.com/org/", "Proj");
        assert_eq!(
            ep.comments_url(WorkItemId(12)),
            "https://dev.azure.com/org/Proj/_apis/wit/workItems/12/comments?api-version=6.0-preview.3"
        );
    }

    #[test]
    fn adds_trailing_slash() {
        let ep = Endpoint::new("https://dev.azure.com/org", "Proj");
        assert_eq!(ep.base_url(), "https://dev.azure.com/org/");
        assert!(ep.comments_url(WorkItemId(1)).starts_with("https://dev.azure.com/org/Proj/"));
    }

    #[test]
    fn custom_api_version() {
        let ep = Endpoint::new("http://h/", "P").with_api_version("7.1-preview.4");
        assert!(ep.comments_url(WorkItemId(3)).ends_with("?api-version=7.1-preview.4"));
    }
}
