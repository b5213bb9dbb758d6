//! In-memory storage backends
//!
//! Used by tests and by host applications during bring-up, before a real
//! database layer is wired in.

use super::{OwnershipRecord, ResourceStore, UserRecord, UserStore};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// In-memory user store keyed by email
#[derive(Debug, Clone, Default)]
pub struct MemoryUserStore {
    users: HashMap<String, UserRecord>,
}

impl MemoryUserStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a set of users
    pub fn with_users(users: impl IntoIterator<Item = UserRecord>) -> Self {
        Self {
            users: users
                .into_iter()
                .map(|u| (u.email.clone(), u))
                .collect(),
        }
    }

    /// Add a user, replacing any existing record with the same email
    pub fn insert(&mut self, user: UserRecord) {
        self.users.insert(user.email.clone(), user);
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        Ok(self.users.get(email).cloned())
    }
}

/// In-memory resource store keyed by resource id
#[derive(Debug, Clone, Default)]
pub struct MemoryResourceStore {
    resources: HashMap<String, OwnershipRecord>,
}

impl MemoryResourceStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a set of ownership records
    pub fn with_resources(resources: impl IntoIterator<Item = OwnershipRecord>) -> Self {
        Self {
            resources: resources
                .into_iter()
                .map(|r| (r.id.clone(), r))
                .collect(),
        }
    }

    /// Add a resource, replacing any existing record with the same id
    pub fn insert(&mut self, resource: OwnershipRecord) {
        self.resources.insert(resource.id.clone(), resource);
    }
}

#[async_trait]
impl ResourceStore for MemoryResourceStore {
    async fn find_resource_by_id(&self, id: &str) -> Result<Option<OwnershipRecord>> {
        Ok(self.resources.get(id).cloned())
    }
}
