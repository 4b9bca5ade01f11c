//! Fork upstream resolution.

use std::collections::HashSet;

use crate::github::{ApiRepository, GitHubClient, GitHubError};

use super::types::{Relationship, RepositoryRecord};

/// Injects the upstream of forks as synthetic records.
///
/// One resolver lives for a single category fetcher invocation. Its
/// "already added" set only guarantees uniqueness within that invocation;
/// the final dedup pass remains the authoritative uniqueness guarantee
/// across fetchers.
#[derive(Debug)]
pub struct ForkResolver {
    relationship: Relationship,
    added: HashSet<String>,
}

impl ForkResolver {
    /// Resolver for forks found among the user's own repositories.
    pub fn for_owned() -> Self {
        Self::new(Relationship::BaseOfFork)
    }

    /// Resolver for forks found among collaborator repositories.
    pub fn for_collaborator() -> Self {
        Self::new(Relationship::BaseOfCollaboratorFork)
    }

    fn new(relationship: Relationship) -> Self {
        Self {
            relationship,
            added: HashSet::new(),
        }
    }

    /// Resolve the upstream of `fork` into a record, unless it was already
    /// added by this resolver.
    ///
    /// Uses upstream information embedded in the response when present and
    /// otherwise issues one detail lookup for the fork. Yields `None` for
    /// non-forks, failed lookups, forks without an upstream, and upstreams
    /// already added. Only an exhausted rate limit is an error.
    pub async fn resolve(
        &mut self,
        client: &GitHubClient,
        fork: &ApiRepository,
        username: &str,
    ) -> Result<Option<RepositoryRecord>, GitHubError> {
        if !fork.fork {
            return Ok(None);
        }

        let upstream = match fork.upstream() {
            Some(upstream) => upstream.clone(),
            None => {
                let Some(details) = client.get_repo(&fork.full_name).await? else {
                    return Ok(None);
                };
                match details.upstream() {
                    Some(upstream) => upstream.clone(),
                    None => {
                        tracing::debug!(repo = %fork.full_name, "Fork has no upstream in details");
                        return Ok(None);
                    }
                }
            }
        };

        if !self.added.insert(upstream.full_name.clone()) {
            return Ok(None);
        }

        tracing::debug!(
            fork = %fork.full_name,
            base = %upstream.full_name,
            relationship = %self.relationship,
            "Adding fork base"
        );
        Ok(Some(RepositoryRecord::from_api(
            &upstream,
            username,
            self.relationship,
        )))
    }

    /// Number of distinct upstreams added so far.
    pub fn added_count(&self) -> usize {
        self.added.len()
    }
}
