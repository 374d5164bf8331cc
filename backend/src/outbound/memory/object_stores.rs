//! In-memory avatar and identity stores.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::MemberId;
use crate::domain::ports::{
    AvatarStorage, AvatarStorageError, IdentityDirectory, IdentityDirectoryError,
};

/// Avatar objects keyed by owning member.
#[derive(Debug, Default)]
pub struct InMemoryAvatarStorage {
    objects: Mutex<BTreeMap<MemberId, Vec<String>>>,
}

impl InMemoryAvatarStorage {
    /// Record an uploaded avatar object.
    pub fn store(&self, owner: MemberId, object: impl Into<String>) -> Result<(), AvatarStorageError> {
        let mut objects = self
            .objects
            .lock()
            .map_err(|_| AvatarStorageError::operation("avatar store lock poisoned"))?;
        objects.entry(owner).or_default().push(object.into());
        Ok(())
    }

    /// Number of objects held for `owner`.
    pub fn count(&self, owner: &MemberId) -> Result<usize, AvatarStorageError> {
        let objects = self
            .objects
            .lock()
            .map_err(|_| AvatarStorageError::operation("avatar store lock poisoned"))?;
        Ok(objects.get(owner).map_or(0, Vec::len))
    }
}

#[async_trait]
impl AvatarStorage for InMemoryAvatarStorage {
    async fn remove_avatars(&self, id: &MemberId) -> Result<usize, AvatarStorageError> {
        let mut objects = self
            .objects
            .lock()
            .map_err(|_| AvatarStorageError::operation("avatar store lock poisoned"))?;
        Ok(objects.remove(id).map_or(0, |removed| removed.len()))
    }
}

/// Sign-in identities known to the provider.
#[derive(Debug, Default)]
pub struct InMemoryIdentityDirectory {
    identities: Mutex<BTreeSet<MemberId>>,
}

impl InMemoryIdentityDirectory {
    /// Register an identity.
    pub fn register(&self, id: MemberId) -> Result<(), IdentityDirectoryError> {
        let mut identities = self
            .identities
            .lock()
            .map_err(|_| IdentityDirectoryError::rejected("identity store lock poisoned"))?;
        identities.insert(id);
        Ok(())
    }

    /// Whether an identity exists for `id`.
    pub fn contains(&self, id: &MemberId) -> Result<bool, IdentityDirectoryError> {
        let identities = self
            .identities
            .lock()
            .map_err(|_| IdentityDirectoryError::rejected("identity store lock poisoned"))?;
        Ok(identities.contains(id))
    }
}

#[async_trait]
impl IdentityDirectory for InMemoryIdentityDirectory {
    async fn delete_identity(&self, id: &MemberId) -> Result<(), IdentityDirectoryError> {
        let mut identities = self
            .identities
            .lock()
            .map_err(|_| IdentityDirectoryError::rejected("identity store lock poisoned"))?;
        if identities.remove(id) {
            Ok(())
        } else {
            Err(IdentityDirectoryError::rejected(format!("no identity for member {id}")))
        }
    }
}
