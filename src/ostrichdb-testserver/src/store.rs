//! In-memory project → collection → cluster → record tree.

use ostrichdb_core::{Record, RecordType, SearchOptions, SortField, SortOrder};
use std::cmp::Ordering;
use std::collections::BTreeMap;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error("invalid record: {0}")]
    Invalid(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub id: u64,
    pub record: Record,
}

#[derive(Debug, Default)]
struct Cluster {
    records: Vec<StoredRecord>,
    next_id: u64,
}

#[derive(Debug, Default)]
struct Collection {
    clusters: BTreeMap<String, Cluster>,
}

#[derive(Debug, Default)]
struct Project {
    collections: BTreeMap<String, Collection>,
}

#[derive(Debug, Default)]
pub struct Store {
    projects: BTreeMap<String, Project>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    // ----- lookups -----

    fn project(&self, project: &str) -> StoreResult<&Project> {
        self.projects
            .get(project)
            .ok_or_else(|| StoreError::NotFound(format!("project '{project}'")))
    }

    fn project_mut(&mut self, project: &str) -> StoreResult<&mut Project> {
        self.projects
            .get_mut(project)
            .ok_or_else(|| StoreError::NotFound(format!("project '{project}'")))
    }

    fn collection(&self, project: &str, collection: &str) -> StoreResult<&Collection> {
        self.project(project)?
            .collections
            .get(collection)
            .ok_or_else(|| StoreError::NotFound(format!("collection '{collection}'")))
    }

    fn collection_mut(&mut self, project: &str, collection: &str) -> StoreResult<&mut Collection> {
        self.project_mut(project)?
            .collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::NotFound(format!("collection '{collection}'")))
    }

    fn cluster(&self, project: &str, collection: &str, cluster: &str) -> StoreResult<&Cluster> {
        self.collection(project, collection)?
            .clusters
            .get(cluster)
            .ok_or_else(|| StoreError::NotFound(format!("cluster '{cluster}'")))
    }

    fn cluster_mut(
        &mut self,
        project: &str,
        collection: &str,
        cluster: &str,
    ) -> StoreResult<&mut Cluster> {
        self.collection_mut(project, collection)?
            .clusters
            .get_mut(cluster)
            .ok_or_else(|| StoreError::NotFound(format!("cluster '{cluster}'")))
    }

    // ----- projects -----

    pub fn list_projects(&self) -> Vec<String> {
        self.projects.keys().cloned().collect()
    }

    pub fn create_project(&mut self, project: &str) -> StoreResult<()> {
        if self.projects.contains_key(project) {
            return Err(StoreError::AlreadyExists(format!("project '{project}'")));
        }
        self.projects.insert(project.to_string(), Project::default());
        Ok(())
    }

    pub fn delete_project(&mut self, project: &str) -> StoreResult<()> {
        self.projects
            .remove(project)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("project '{project}'")))
    }

    // ----- collections -----

    pub fn list_collections(&self, project: &str) -> StoreResult<Vec<String>> {
        Ok(self.project(project)?.collections.keys().cloned().collect())
    }

    pub fn create_collection(&mut self, project: &str, collection: &str) -> StoreResult<()> {
        let collections = &mut self.project_mut(project)?.collections;
        if collections.contains_key(collection) {
            return Err(StoreError::AlreadyExists(format!(
                "collection '{collection}'"
            )));
        }
        collections.insert(collection.to_string(), Collection::default());
        Ok(())
    }

    /// Every cluster name followed by its indented record lines
    pub fn render_collection(&self, project: &str, collection: &str) -> StoreResult<String> {
        let collection = self.collection(project, collection)?;
        let mut out = String::new();
        for (name, cluster) in &collection.clusters {
            out.push_str(name);
            out.push('\n');
            for stored in &cluster.records {
                out.push_str("    ");
                out.push_str(&stored.record.to_string());
                out.push('\n');
            }
        }
        Ok(out)
    }

    pub fn delete_collection(&mut self, project: &str, collection: &str) -> StoreResult<()> {
        self.project_mut(project)?
            .collections
            .remove(collection)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("collection '{collection}'")))
    }

    // ----- clusters -----

    pub fn list_clusters(&self, project: &str, collection: &str) -> StoreResult<Vec<String>> {
        Ok(self
            .collection(project, collection)?
            .clusters
            .keys()
            .cloned()
            .collect())
    }

    pub fn create_cluster(&mut self, project: &str, collection: &str, cluster: &str) -> StoreResult<()> {
        let clusters = &mut self.collection_mut(project, collection)?.clusters;
        if clusters.contains_key(cluster) {
            return Err(StoreError::AlreadyExists(format!("cluster '{cluster}'")));
        }
        clusters.insert(cluster.to_string(), Cluster::default());
        Ok(())
    }

    /// Record lines of a cluster
    pub fn render_cluster(&self, project: &str, collection: &str, cluster: &str) -> StoreResult<String> {
        let cluster = self.cluster(project, collection, cluster)?;
        Ok(render_records(cluster.records.iter()))
    }

    pub fn delete_cluster(&mut self, project: &str, collection: &str, cluster: &str) -> StoreResult<()> {
        self.collection_mut(project, collection)?
            .clusters
            .remove(cluster)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("cluster '{cluster}'")))
    }

    // ----- records -----

    pub fn create_record(
        &mut self,
        project: &str,
        collection: &str,
        cluster: &str,
        record: Record,
    ) -> StoreResult<u64> {
        record
            .typed()
            .map_err(|e| StoreError::Invalid(e.to_string()))?;

        let cluster = self.cluster_mut(project, collection, cluster)?;
        if cluster.records.iter().any(|r| r.record.name == record.name) {
            return Err(StoreError::AlreadyExists(format!("record '{}'", record.name)));
        }

        cluster.next_id += 1;
        let id = cluster.next_id;
        cluster.records.push(StoredRecord { id, record });
        Ok(id)
    }

    /// Look a record up by name, then by numeric id
    pub fn get_record(
        &self,
        project: &str,
        collection: &str,
        cluster: &str,
        identifier: &str,
    ) -> StoreResult<&StoredRecord> {
        let cluster = self.cluster(project, collection, cluster)?;
        let by_name = cluster.records.iter().find(|r| r.record.name == identifier);
        let by_id = || {
            let id = identifier.parse::<u64>().ok()?;
            cluster.records.iter().find(|r| r.id == id)
        };
        by_name
            .or_else(by_id)
            .ok_or_else(|| StoreError::NotFound(format!("record '{identifier}'")))
    }

    pub fn delete_record(
        &mut self,
        project: &str,
        collection: &str,
        cluster: &str,
        name: &str,
    ) -> StoreResult<()> {
        let cluster = self.cluster_mut(project, collection, cluster)?;
        let before = cluster.records.len();
        cluster.records.retain(|r| r.record.name != name);
        if cluster.records.len() == before {
            return Err(StoreError::NotFound(format!("record '{name}'")));
        }
        Ok(())
    }

    pub fn search_records(
        &self,
        project: &str,
        collection: &str,
        cluster: &str,
        options: &SearchOptions,
    ) -> StoreResult<Vec<&StoredRecord>> {
        let cluster = self.cluster(project, collection, cluster)?;

        let mut found: Vec<&StoredRecord> = cluster
            .records
            .iter()
            .filter(|r| matches_filter(&r.record, options))
            .collect();

        if let Some(field) = options.sort_by {
            found.sort_by(|a, b| compare_by(field, a, b));
        }
        if options.sort_order == Some(SortOrder::Desc) {
            found.reverse();
        }

        let offset = options.offset.unwrap_or(0);
        let limit = options.limit.unwrap_or(usize::MAX);
        Ok(found.into_iter().skip(offset).take(limit).collect())
    }
}

pub fn render_records<'a>(records: impl Iterator<Item = &'a StoredRecord>) -> String {
    records
        .map(|r| format!("{}\n", r.record))
        .collect::<String>()
}

fn matches_filter(record: &Record, options: &SearchOptions) -> bool {
    if let Some(wanted) = &options.record_type {
        let same = match (wanted.parse::<RecordType>(), record.typed()) {
            (Ok(a), Ok(b)) => a == b,
            _ => wanted.eq_ignore_ascii_case(&record.record_type),
        };
        if !same {
            return false;
        }
    }
    if let Some(text) = &options.search {
        if !record.name.to_lowercase().contains(&text.to_lowercase()) {
            return false;
        }
    }
    if let Some(text) = &options.value_contains {
        if !record.value.contains(text.as_str()) {
            return false;
        }
    }
    if let Some(min) = &options.min_value {
        if compare_values(&record.value, min) == Ordering::Less {
            return false;
        }
    }
    if let Some(max) = &options.max_value {
        if compare_values(&record.value, max) == Ordering::Greater {
            return false;
        }
    }
    true
}

/// Numeric comparison when both sides parse as numbers, text otherwise
fn compare_values(a: &str, b: &str) -> Ordering {
    match (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.cmp(b),
    }
}

fn compare_by(field: SortField, a: &StoredRecord, b: &StoredRecord) -> Ordering {
    match field {
        SortField::Name => a.record.name.cmp(&b.record.name),
        SortField::Value => compare_values(&a.record.value, &b.record.value),
        SortField::Type => a.record.record_type.cmp(&b.record.record_type),
        SortField::Id => a.id.cmp(&b.id),
    }
}
