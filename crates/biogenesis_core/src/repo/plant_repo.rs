//! Plant repository contract and in-memory implementation.
//!
//! # Responsibility
//! - Provide snapshot reads of the full dataset.
//! - Replace the dataset atomically after validation.
//!
//! # Invariants
//! - Readers holding a snapshot never observe a later replace.
//! - Ids are unique within every stored snapshot.

use crate::model::plant::{PlantRecord, PlantValidationError};
use parking_lot::RwLock;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for dataset reads and replacement.
#[derive(Debug)]
pub enum RepoError {
    Validation(PlantValidationError),
    DuplicateId(String),
    /// Backing store cannot serve requests right now.
    Unavailable(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::DuplicateId(id) => write!(f, "duplicate plant id: {id}"),
            Self::Unavailable(message) => write!(f, "plant repository unavailable: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::DuplicateId(_) | Self::Unavailable(_) => None,
        }
    }
}

impl From<PlantValidationError> for RepoError {
    fn from(value: PlantValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Read/replace access to the working dataset.
pub trait PlantRepository: Send + Sync {
    /// Shared, immutable view of every record in insertion order.
    fn snapshot(&self) -> RepoResult<Arc<Vec<PlantRecord>>>;
    fn get_plant(&self, id: &str) -> RepoResult<Option<PlantRecord>>;
    fn replace_all(&self, records: Vec<PlantRecord>) -> RepoResult<()>;

    fn len(&self) -> RepoResult<usize> {
        Ok(self.snapshot()?.len())
    }

    fn is_empty(&self) -> RepoResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl<R: PlantRepository + ?Sized> PlantRepository for Arc<R> {
    fn snapshot(&self) -> RepoResult<Arc<Vec<PlantRecord>>> {
        (**self).snapshot()
    }

    fn get_plant(&self, id: &str) -> RepoResult<Option<PlantRecord>> {
        (**self).get_plant(id)
    }

    fn replace_all(&self, records: Vec<PlantRecord>) -> RepoResult<()> {
        (**self).replace_all(records)
    }
}

/// In-memory repository; replace swaps the whole snapshot.
#[derive(Debug, Default)]
pub struct InMemoryPlantRepository {
    records: RwLock<Arc<Vec<PlantRecord>>>,
}

impl InMemoryPlantRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a repository from validated records.
    pub fn with_records(records: Vec<PlantRecord>) -> RepoResult<Self> {
        let repo = Self::new();
        repo.replace_all(records)?;
        Ok(repo)
    }
}

impl PlantRepository for InMemoryPlantRepository {
    fn snapshot(&self) -> RepoResult<Arc<Vec<PlantRecord>>> {
        Ok(Arc::clone(&self.records.read()))
    }

    fn get_plant(&self, id: &str) -> RepoResult<Option<PlantRecord>> {
        Ok(self
            .records
            .read()
            .iter()
            .find(|record| record.id == id)
            .cloned())
    }

    fn replace_all(&self, records: Vec<PlantRecord>) -> RepoResult<()> {
        validate_working_set(&records)?;
        let count = records.len();
        *self.records.write() = Arc::new(records);
        log::debug!("event=dataset_replaced module=repo status=ok records={count}");
        Ok(())
    }
}

fn validate_working_set(records: &[PlantRecord]) -> RepoResult<()> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        record.validate()?;
        if !seen.insert(record.id.as_str()) {
            return Err(RepoError::DuplicateId(record.id.clone()));
        }
    }
    Ok(())
}
