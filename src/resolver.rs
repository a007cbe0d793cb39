use crate::git::repository::RepositoryName;
use crate::store::{Project, Store, StoreError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(Project),
    /// No project links this repository. Expected for most pushes.
    NotTracked,
}

pub async fn resolve_project(store: &dyn Store, full_name: &str) -> Result<Resolution, StoreError> {
    let Some(name) = RepositoryName::parse(full_name) else {
        tracing::info!(repository = %full_name, "Repository name is not owner/repo");
        return Ok(Resolution::NotTracked);
    };

    match store.find_project(&name.owner, &name.repo).await? {
        Some(project) => {
            tracing::debug!(repository = %name, project_id = %project.id, "Resolved project");
            Ok(Resolution::Resolved(project))
        }
        None => {
            tracing::info!(repository = %name, "No project matches repo");
            Ok(Resolution::NotTracked)
        }
    }
}
