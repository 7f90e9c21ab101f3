//! GCP Projects
//!
//! Lists the projects the credentials can see, used when no project is
//! configured explicitly.

use super::client::GcpClient;
use anyhow::Result;
use serde::Deserialize;

/// Project information
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub project_id: String,
    #[serde(default)]
    pub lifecycle_state: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListProjectsResponse {
    #[serde(default)]
    projects: Vec<Project>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// List all ACTIVE projects, following pagination
pub async fn list_projects(client: &GcpClient) -> Result<Vec<Project>> {
    let mut projects = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        let url = match &page_token {
            Some(token) => client.resourcemanager_url(&format!(
                "projects?pageToken={}",
                urlencoding::encode(token)
            )),
            None => client.resourcemanager_url("projects"),
        };

        let page: ListProjectsResponse = client.get(&url).await?;
        projects.extend(
            page.projects
                .into_iter()
                .filter(|p| p.lifecycle_state == "ACTIVE"),
        );

        match page.next_page_token {
            Some(token) if !token.is_empty() => page_token = Some(token),
            _ => break,
        }
    }

    Ok(projects)
}

/// Get project IDs as a simple list
pub async fn list_project_ids(client: &GcpClient) -> Result<Vec<String>> {
    let projects = list_projects(client).await?;
    Ok(projects.into_iter().map(|p| p.project_id).collect())
}
