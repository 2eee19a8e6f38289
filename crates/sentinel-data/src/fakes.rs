//! In-memory data source (fixtures and testing)
//!
//! Provides `MemoryDataSource`, which satisfies the [`DataSource`] contract
//! without any external dependencies. It can be populated programmatically
//! or decoded from a JSON [`Dataset`], and individual resources can be made
//! to fail to exercise the engine's abort path.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{FetchError, FetchResult};
use crate::records::*;
use crate::source::{DataSource, Resource};

/// History records for a single subject.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubjectHistory {
    #[serde(default)]
    pub affiliations: Vec<AffiliationRecord>,
    #[serde(default)]
    pub financial_events: Vec<FinancialEvent>,
    #[serde(default)]
    pub agreements: Vec<AgreementRecord>,
    #[serde(default)]
    pub relationships: Vec<RelationshipRecord>,
}

/// Serializable dataset fixture: identities, per-subject history, groups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub identities: Vec<Identity>,
    #[serde(default)]
    pub histories: BTreeMap<IdentityId, SubjectHistory>,
    #[serde(default)]
    pub groups: Vec<GroupInfo>,
}

impl Dataset {
    /// Decode a dataset from JSON text and validate every record in it.
    pub fn from_json(json: &str) -> FetchResult<Self> {
        let dataset: Self = serde_json::from_str(json)?;
        dataset.validate()?;
        Ok(dataset)
    }

    /// Boundary validation of every identity and history record.
    pub fn validate(&self) -> FetchResult<()> {
        validate_all(&self.identities)?;
        for history in self.histories.values() {
            validate_all(&history.affiliations)?;
            validate_all(&history.financial_events)?;
            validate_all(&history.agreements)?;
            validate_all(&history.relationships)?;
        }
        Ok(())
    }

    /// Read and decode a dataset file.
    pub fn load(path: &Path) -> FetchResult<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| FetchError::Backend(format!("read {}: {e}", path.display())))?;
        Self::from_json(&json)
    }
}

/// In-memory data source backed by hash maps.
#[derive(Debug, Default)]
pub struct MemoryDataSource {
    identities: HashMap<IdentityId, Identity>,
    histories: HashMap<IdentityId, SubjectHistory>,
    groups: HashMap<GroupId, GroupInfo>,
    failing: HashSet<Resource>,
}

impl MemoryDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_dataset(dataset: Dataset) -> Self {
        let mut source = Self::new();
        for identity in dataset.identities {
            source = source.with_identity(identity);
        }
        for (id, history) in dataset.histories {
            source = source.with_history(id, history);
        }
        for group in dataset.groups {
            source = source.with_group(group);
        }
        source
    }

    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.identities.insert(identity.id, identity);
        self
    }

    pub fn with_history(mut self, subject: IdentityId, history: SubjectHistory) -> Self {
        self.histories.insert(subject, history);
        self
    }

    pub fn with_group(mut self, group: GroupInfo) -> Self {
        self.groups.insert(group.id, group);
        self
    }

    /// Make every request for `resource` fail with [`FetchError::Unavailable`].
    pub fn with_failure(mut self, resource: Resource) -> Self {
        self.failing.insert(resource);
        self
    }

    fn check(&self, resource: Resource) -> FetchResult<()> {
        if self.failing.contains(&resource) {
            tracing::debug!(%resource, "injected fetch failure");
            return Err(FetchError::Unavailable { resource });
        }
        Ok(())
    }

    fn history(&self, subject: IdentityId) -> Option<&SubjectHistory> {
        self.histories.get(&subject)
    }
}

/// Keep the `limit` most recent records, newest first.
fn most_recent<T: Clone, K: Ord>(
    records: &[T],
    limit: Option<usize>,
    key: impl Fn(&T) -> K,
) -> Vec<T> {
    let mut out = records.to_vec();
    if let Some(limit) = limit {
        out.sort_by(|a, b| key(b).cmp(&key(a)));
        out.truncate(limit);
    }
    out
}

#[async_trait]
impl DataSource for MemoryDataSource {
    async fn identity(&self, subject: IdentityId) -> FetchResult<Option<Identity>> {
        self.check(Resource::Identity)?;
        Ok(self.identities.get(&subject).cloned())
    }

    async fn affiliations(&self, subject: IdentityId) -> FetchResult<Vec<AffiliationRecord>> {
        self.check(Resource::Affiliations)?;
        Ok(self
            .history(subject)
            .map(|h| h.affiliations.clone())
            .unwrap_or_default())
    }

    async fn financial_events(
        &self,
        subject: IdentityId,
        limit: Option<usize>,
    ) -> FetchResult<Vec<FinancialEvent>> {
        self.check(Resource::FinancialEvents)?;
        Ok(self
            .history(subject)
            .map(|h| most_recent(&h.financial_events, limit, |e| e.timestamp))
            .unwrap_or_default())
    }

    async fn agreements(
        &self,
        subject: IdentityId,
        limit: Option<usize>,
    ) -> FetchResult<Vec<AgreementRecord>> {
        self.check(Resource::Agreements)?;
        Ok(self
            .history(subject)
            .map(|h| most_recent(&h.agreements, limit, |a| a.issued))
            .unwrap_or_default())
    }

    async fn relationships(&self, subject: IdentityId) -> FetchResult<Vec<RelationshipRecord>> {
        self.check(Resource::Relationships)?;
        Ok(self
            .history(subject)
            .map(|h| h.relationships.clone())
            .unwrap_or_default())
    }

    async fn group(&self, group: GroupId) -> FetchResult<Option<GroupInfo>> {
        self.check(Resource::Groups)?;
        Ok(self.groups.get(&group).cloned())
    }

    async fn search_identities(&self, fragment: &str) -> FetchResult<Vec<Identity>> {
        self.check(Resource::NameSearch)?;
        let needle = fragment.to_lowercase();
        let mut hits: Vec<Identity> = self
            .identities
            .values()
            .filter(|i| i.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        hits.sort_by_key(|i| i.id);
        Ok(hits)
    }
}
