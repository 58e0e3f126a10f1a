/// In-memory workflow storage
///
/// Keyed storage of workflow definitions behind a reader/writer lock: many
/// concurrent `get`/`list` calls proceed together, while `create`, `update` and
/// `delete` exclude all other access for their duration. Callers only ever get
/// cloned snapshots, never references into the guarded map.

use crate::workflow::{
    error::StoreError,
    types::{Workflow, WorkflowStatus},
};
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Concurrency-safe workflow store
#[derive(Debug, Default)]
pub struct WorkflowStore {
    /// Key: workflow_id, Value: workflow definition
    workflows: RwLock<HashMap<String, Workflow>>,
}

impl WorkflowStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new workflow
    ///
    /// Assigns a UUID when the ID is empty, stamps both timestamps and resets the
    /// status to inactive. Returns the stored snapshot.
    pub async fn create(&self, mut workflow: Workflow) -> Result<Workflow, StoreError> {
        if workflow.id.is_empty() {
            workflow.id = Uuid::new_v4().to_string();
        }
        let now = Utc::now();
        workflow.created_at = now;
        workflow.updated_at = now;
        workflow.status = WorkflowStatus::Inactive;

        let mut workflows = self.workflows.write().await;
        if workflows.contains_key(&workflow.id) {
            return Err(StoreError::AlreadyExists(workflow.id));
        }
        workflows.insert(workflow.id.clone(), workflow.clone());

        tracing::info!("📋 Stored workflow: {} ({})", workflow.id, workflow.name);
        Ok(workflow)
    }

    /// Retrieve a snapshot of a workflow by ID
    pub async fn get(&self, id: &str) -> Result<Workflow, StoreError> {
        self.workflows
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Replace an existing workflow
    ///
    /// The stored ID and creation time win over whatever the caller sent.
    pub async fn update(&self, id: &str, mut workflow: Workflow) -> Result<Workflow, StoreError> {
        let mut workflows = self.workflows.write().await;
        let existing = workflows
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        workflow.id = existing.id.clone();
        workflow.created_at = existing.created_at;
        workflow.updated_at = Utc::now();
        *existing = workflow.clone();

        tracing::info!("🔄 Updated workflow: {} ({})", workflow.id, workflow.name);
        Ok(workflow)
    }

    /// Remove a workflow by ID
    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        match self.workflows.write().await.remove(id) {
            Some(_) => {
                tracing::info!("🗑️ Deleted workflow: {}", id);
                Ok(())
            }
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }

    /// Snapshots of every workflow, oldest first
    pub async fn list(&self) -> Vec<Workflow> {
        let mut workflows: Vec<Workflow> = self.workflows.read().await.values().cloned().collect();
        workflows.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        workflows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_assigns_id_and_resets_status() {
        let store = WorkflowStore::new();
        let mut workflow = Workflow::new("", "Nightly report");
        workflow.status = WorkflowStatus::Active;

        let stored = store.create(workflow).await.unwrap();
        assert!(Uuid::parse_str(&stored.id).is_ok());
        assert_eq!(stored.status, WorkflowStatus::Inactive);
        assert_eq!(stored.created_at, stored.updated_at);
        assert_eq!(store.get(&stored.id).await.unwrap(), stored);
    }

    #[tokio::test]
    async fn create_rejects_duplicate_id() {
        let store = WorkflowStore::new();
        store.create(Workflow::new("wf-1", "First")).await.unwrap();
        assert_eq!(
            store.create(Workflow::new("wf-1", "Second")).await,
            Err(StoreError::AlreadyExists("wf-1".to_string()))
        );
    }

    #[tokio::test]
    async fn update_keeps_identity_and_creation_time() {
        let store = WorkflowStore::new();
        let created = store.create(Workflow::new("wf-1", "Before")).await.unwrap();

        let updated = store
            .update("wf-1", Workflow::new("something-else", "After"))
            .await
            .unwrap();
        assert_eq!(updated.id, "wf-1");
        assert_eq!(updated.name, "After");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);

        assert_eq!(
            store.update("missing", Workflow::new("", "x")).await,
            Err(StoreError::NotFound("missing".to_string()))
        );
    }

    #[tokio::test]
    async fn delete_and_list() {
        let store = WorkflowStore::new();
        store.create(Workflow::new("wf-a", "A")).await.unwrap();
        store.create(Workflow::new("wf-b", "B")).await.unwrap();

        let ids: Vec<String> = store.list().await.into_iter().map(|w| w.id).collect();
        assert_eq!(ids, vec!["wf-a", "wf-b"]);

        store.delete("wf-a").await.unwrap();
        assert_eq!(store.delete("wf-a").await, Err(StoreError::NotFound("wf-a".to_string())));
        assert_eq!(store.get("wf-a").await, Err(StoreError::NotFound("wf-a".to_string())));
        assert_eq!(store.list().await.len(), 1);
    }
}
