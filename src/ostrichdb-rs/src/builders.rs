//! Fluent handles over [`Client`].
//!
//! Each builder is an immutable snapshot of the identifiers above it plus a
//! client handle. Descending (`collection`, `cluster`, `record`) returns a
//! new builder and leaves the parent untouched. Lifecycle methods delegate
//! to the matching `Client` call with the captured identifiers.

use crate::{Client, RecordId, Result, SearchOptions};

/// Manages a single project
#[derive(Debug, Clone)]
pub struct ProjectBuilder {
    client: Client,
    project: String,
    id: Option<String>,
}

impl ProjectBuilder {
    pub(crate) fn new(client: Client, project: String, id: Option<String>) -> Self {
        Self {
            client,
            project,
            id,
        }
    }

    pub fn name(&self) -> &str {
        &self.project
    }

    /// Identifier supplied through [`Client::project_with_id`]; never sent
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn collection(&self, name: impl Into<String>) -> CollectionBuilder {
        CollectionBuilder {
            client: self.client.clone(),
            project: self.project.clone(),
            collection: name.into(),
        }
    }

    pub async fn create(&self) -> Result<()> {
        self.client.create_project(&self.project).await
    }

    pub async fn delete(&self) -> Result<()> {
        self.client.delete_project(&self.project).await
    }

    pub async fn list_collections(&self) -> Result<Vec<String>> {
        self.client.list_collections(&self.project).await
    }
}

/// Manages a collection within a project
#[derive(Debug, Clone)]
pub struct CollectionBuilder {
    client: Client,
    project: String,
    collection: String,
}

impl CollectionBuilder {
    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn name(&self) -> &str {
        &self.collection
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn cluster(&self, name: impl Into<String>) -> ClusterBuilder {
        ClusterBuilder {
            client: self.client.clone(),
            project: self.project.clone(),
            collection: self.collection.clone(),
            cluster: name.into(),
        }
    }

    pub async fn create(&self) -> Result<()> {
        self.client
            .create_collection(&self.project, &self.collection)
            .await
    }

    pub async fn get(&self) -> Result<String> {
        self.client
            .get_collection(&self.project, &self.collection)
            .await
    }

    pub async fn delete(&self) -> Result<()> {
        self.client
            .delete_collection(&self.project, &self.collection)
            .await
    }

    pub async fn list_clusters(&self) -> Result<Vec<String>> {
        self.client
            .list_clusters(&self.project, &self.collection)
            .await
    }
}

/// Manages a cluster within a collection
#[derive(Debug, Clone)]
pub struct ClusterBuilder {
    client: Client,
    project: String,
    collection: String,
    cluster: String,
}

impl ClusterBuilder {
    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn name(&self) -> &str {
        &self.cluster
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Handle for a record in this cluster. Nothing is sent until a
    /// lifecycle method is called on it.
    pub fn record(
        &self,
        name: impl Into<String>,
        record_type: impl Into<String>,
        value: impl Into<String>,
    ) -> RecordBuilder {
        RecordBuilder {
            client: self.client.clone(),
            project: self.project.clone(),
            collection: self.collection.clone(),
            cluster: self.cluster.clone(),
            name: name.into(),
            record_type: record_type.into(),
            value: value.into(),
        }
    }

    pub async fn create(&self) -> Result<()> {
        self.client
            .create_cluster(&self.project, &self.collection, &self.cluster)
            .await
    }

    pub async fn get(&self) -> Result<String> {
        self.client
            .get_cluster(&self.project, &self.collection, &self.cluster)
            .await
    }

    pub async fn delete(&self) -> Result<()> {
        self.client
            .delete_cluster(&self.project, &self.collection, &self.cluster)
            .await
    }

    pub async fn list_records(&self) -> Result<Vec<String>> {
        self.client
            .list_records(&self.project, &self.collection, &self.cluster)
            .await
    }

    pub async fn search_records(&self, options: &SearchOptions) -> Result<Vec<String>> {
        self.client
            .search_records(&self.project, &self.collection, &self.cluster, options)
            .await
    }
}

/// Manages records within a cluster.
///
/// The name/type/value given to [`ClusterBuilder::record`] are what
/// [`RecordBuilder::create`] sends. [`RecordBuilder::create_with`] sends an
/// explicit triple instead and ignores the captured one.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    client: Client,
    project: String,
    collection: String,
    cluster: String,
    name: String,
    record_type: String,
    value: String,
}

impl RecordBuilder {
    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn cluster(&self) -> &str {
        &self.cluster
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn record_type(&self) -> &str {
        &self.record_type
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Create the record captured by this builder
    pub async fn create(&self) -> Result<()> {
        self.create_with(&self.name, &self.record_type, &self.value)
            .await
    }

    pub async fn create_with(&self, name: &str, record_type: &str, value: &str) -> Result<()> {
        self.client
            .create_record(
                &self.project,
                &self.collection,
                &self.cluster,
                name,
                record_type,
                value,
            )
            .await
    }

    /// Fetch any record of this cluster by name or id
    pub async fn get(&self, identifier: impl Into<RecordId>) -> Result<String> {
        self.client
            .get_record(&self.project, &self.collection, &self.cluster, identifier)
            .await
    }

    pub async fn delete(&self, name: &str) -> Result<()> {
        self.client
            .delete_record(&self.project, &self.collection, &self.cluster, name)
            .await
    }
}
