//! Contact resolution: every signed-in identity maps to exactly one
//! contact record.
//!
//! All member data hangs off the contact, so every data-touching request
//! resolves the contact first. The resolver is idempotent: a second call
//! for the same identity returns the same contact and creates nothing,
//! and the link upsert is keyed on the unique `auth_user_id` constraint
//! so concurrent first calls collapse into one row.
//!
//! Resolution order:
//! 1. Fast path: an existing link row with a contact.
//! 2. Provision: find the contact by the identity's email, or create a
//!    placeholder ("Mobile User") when there is no email to match.
//! 3. Upsert the link.
//! 4. Last resort for legacy rows: treat the identity id itself as a
//!    contact id and look it up directly.
//! 5. Give up with a support-contact error.

use async_trait::async_trait;
use thiserror::Error;

use sqlx::PgPool;
use wayside_core::{ContactId, Email, IdentityId};

use crate::db::{AppUserRepository, ContactRepository, RepositoryError};

/// Message shown to the member when resolution fails entirely.
pub const SUPPORT_MESSAGE: &str =
    "We couldn't load your account. Please contact support so we can fix it.";

/// Errors from contact resolution.
#[derive(Debug, Error)]
pub enum ContactResolutionError {
    /// Every resolution step failed for this identity.
    #[error("{SUPPORT_MESSAGE}")]
    Unresolvable,

    /// A storage operation failed before resolution could finish.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Storage operations the resolver needs, seam for in-memory tests.
#[async_trait]
pub trait ContactDirectory: Send + Sync {
    /// The contact currently linked to the identity, if any.
    async fn linked_contact(
        &self,
        identity: IdentityId,
    ) -> Result<Option<ContactId>, RepositoryError>;

    /// Find a contact by email.
    async fn find_by_email(&self, email: &Email) -> Result<Option<ContactId>, RepositoryError>;

    /// Create a contact for this identity, placeholder-named when no
    /// email is available.
    async fn create_contact(&self, email: Option<&Email>) -> Result<ContactId, RepositoryError>;

    /// Whether a contact row exists.
    async fn contact_exists(&self, id: ContactId) -> Result<bool, RepositoryError>;

    /// Upsert the identity-to-contact link; returns the winning contact
    /// (an existing link is never overwritten).
    async fn link(
        &self,
        identity: IdentityId,
        contact: ContactId,
    ) -> Result<ContactId, RepositoryError>;
}

/// [`ContactDirectory`] over the shared database.
#[derive(Clone)]
pub struct PgContactDirectory {
    pool: PgPool,
}

impl PgContactDirectory {
    /// Wrap a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContactDirectory for PgContactDirectory {
    async fn linked_contact(
        &self,
        identity: IdentityId,
    ) -> Result<Option<ContactId>, RepositoryError> {
        AppUserRepository::new(&self.pool).linked_contact(identity).await
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<ContactId>, RepositoryError> {
        let profile = ContactRepository::new(&self.pool).find_by_email(email).await?;
        Ok(profile.map(|p| p.id))
    }

    async fn create_contact(&self, email: Option<&Email>) -> Result<ContactId, RepositoryError> {
        let profile = ContactRepository::new(&self.pool)
            .create(email, "Mobile", "User")
            .await?;
        Ok(profile.id)
    }

    async fn contact_exists(&self, id: ContactId) -> Result<bool, RepositoryError> {
        ContactRepository::new(&self.pool).exists(id).await
    }

    async fn link(
        &self,
        identity: IdentityId,
        contact: ContactId,
    ) -> Result<ContactId, RepositoryError> {
        AppUserRepository::new(&self.pool).upsert_link(identity, contact).await
    }
}

/// Resolves an auth identity to its contact.
pub struct ContactResolver<D = PgContactDirectory> {
    directory: D,
}

impl<D: ContactDirectory> ContactResolver<D> {
    /// Create a resolver over a directory.
    pub const fn new(directory: D) -> Self {
        Self { directory }
    }

    /// Resolve the contact for an identity, provisioning if needed.
    ///
    /// # Errors
    ///
    /// Returns `ContactResolutionError::Unresolvable` when every step
    /// fails; routes surface [`SUPPORT_MESSAGE`] for it.
    pub async fn resolve(
        &self,
        identity: IdentityId,
        email: Option<&Email>,
    ) -> Result<ContactId, ContactResolutionError> {
        if let Some(contact) = self.directory.linked_contact(identity).await? {
            return Ok(contact);
        }

        match self.provision(email).await {
            Ok(candidate) => match self.directory.link(identity, candidate).await {
                Ok(winner) => return Ok(winner),
                Err(e) => {
                    tracing::warn!(error = %e, %identity, "Contact link upsert failed");
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, %identity, "Contact provisioning failed");
            }
        }

        // Legacy data: early imports used the identity id as the contact id.
        let legacy = identity.as_contact_id();
        if self.directory.contact_exists(legacy).await? {
            return match self.directory.link(identity, legacy).await {
                Ok(winner) => Ok(winner),
                Err(_) => Ok(legacy),
            };
        }

        Err(ContactResolutionError::Unresolvable)
    }

    async fn provision(&self, email: Option<&Email>) -> Result<ContactId, RepositoryError> {
        let Some(email) = email else {
            return self.directory.create_contact(None).await;
        };

        if let Some(existing) = self.directory.find_by_email(email).await? {
            return Ok(existing);
        }

        match self.directory.create_contact(Some(email)).await {
            Ok(created) => Ok(created),
            // Lost a create race: the contact exists now.
            Err(RepositoryError::Conflict(_)) => self
                .directory
                .find_by_email(email)
                .await?
                .ok_or(RepositoryError::NotFound),
            Err(other) => Err(other),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// In-memory directory mirroring the database constraints: unique
    /// link per identity, unique email per contact.
    #[derive(Default)]
    struct MemoryDirectory {
        contacts: Mutex<HashMap<ContactId, Option<Email>>>,
        links: Mutex<HashMap<IdentityId, ContactId>>,
        contacts_created: Mutex<u32>,
        fail_link: bool,
    }

    impl MemoryDirectory {
        fn with_contact(email: Option<Email>) -> (Self, ContactId) {
            let dir = Self::default();
            let id = ContactId::generate();
            dir.contacts.lock().unwrap().insert(id, email);
            (dir, id)
        }
    }

    #[async_trait]
    impl ContactDirectory for MemoryDirectory {
        async fn linked_contact(
            &self,
            identity: IdentityId,
        ) -> Result<Option<ContactId>, RepositoryError> {
            Ok(self.links.lock().unwrap().get(&identity).copied())
        }

        async fn find_by_email(
            &self,
            email: &Email,
        ) -> Result<Option<ContactId>, RepositoryError> {
            Ok(self
                .contacts
                .lock()
                .unwrap()
                .iter()
                .find(|(_, e)| e.as_ref() == Some(email))
                .map(|(id, _)| *id))
        }

        async fn create_contact(
            &self,
            email: Option<&Email>,
        ) -> Result<ContactId, RepositoryError> {
            if let Some(email) = email
                && self.find_by_email(email).await?.is_some()
            {
                return Err(RepositoryError::Conflict("email exists".into()));
            }
            let id = ContactId::generate();
            self.contacts.lock().unwrap().insert(id, email.cloned());
            *self.contacts_created.lock().unwrap() += 1;
            Ok(id)
        }

        async fn contact_exists(&self, id: ContactId) -> Result<bool, RepositoryError> {
            Ok(self.contacts.lock().unwrap().contains_key(&id))
        }

        async fn link(
            &self,
            identity: IdentityId,
            contact: ContactId,
        ) -> Result<ContactId, RepositoryError> {
            if self.fail_link {
                return Err(RepositoryError::Database(sqlx::Error::PoolClosed));
            }
            // COALESCE semantics: first link wins.
            Ok(*self.links.lock().unwrap().entry(identity).or_insert(contact))
        }
    }

    fn email(s: &str) -> Email {
        Email::parse(s).unwrap()
    }

    #[tokio::test]
    async fn fast_path_returns_existing_link() {
        let (dir, contact) = MemoryDirectory::with_contact(Some(email("a@example.com")));
        let identity = IdentityId::generate();
        dir.links.lock().unwrap().insert(identity, contact);

        let resolver = ContactResolver::new(dir);
        let resolved = resolver.resolve(identity, None).await.unwrap();
        assert_eq!(resolved, contact);
        assert_eq!(*resolver.directory.contacts_created.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn provisions_by_email_match_without_creating() {
        let (dir, contact) = MemoryDirectory::with_contact(Some(email("a@example.com")));
        let resolver = ContactResolver::new(dir);

        let resolved = resolver
            .resolve(IdentityId::generate(), Some(&email("a@example.com")))
            .await
            .unwrap();
        assert_eq!(resolved, contact);
        assert_eq!(*resolver.directory.contacts_created.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn creates_placeholder_without_email() {
        let resolver = ContactResolver::new(MemoryDirectory::default());
        let identity = IdentityId::generate();

        let resolved = resolver.resolve(identity, None).await.unwrap();
        assert!(resolver.directory.contact_exists(resolved).await.unwrap());
        assert_eq!(*resolver.directory.contacts_created.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn resolving_twice_is_idempotent() {
        let resolver = ContactResolver::new(MemoryDirectory::default());
        let identity = IdentityId::generate();
        let e = email("b@example.com");

        let first = resolver.resolve(identity, Some(&e)).await.unwrap();
        let second = resolver.resolve(identity, Some(&e)).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(*resolver.directory.contacts_created.lock().unwrap(), 1);
        assert_eq!(resolver.directory.links.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn existing_link_wins_over_new_email() {
        let (dir, contact) = MemoryDirectory::with_contact(Some(email("a@example.com")));
        let identity = IdentityId::generate();
        dir.links.lock().unwrap().insert(identity, contact);
        let resolver = ContactResolver::new(dir);

        // A changed email on the identity must not re-link the account.
        let resolved = resolver
            .resolve(identity, Some(&email("new@example.com")))
            .await
            .unwrap();
        assert_eq!(resolved, contact);
    }

    #[tokio::test]
    async fn legacy_identity_as_contact_id_fallback() {
        let dir = MemoryDirectory {
            fail_link: true,
            ..MemoryDirectory::default()
        };
        let identity = IdentityId::generate();
        dir.contacts
            .lock()
            .unwrap()
            .insert(identity.as_contact_id(), None);

        let resolver = ContactResolver::new(dir);
        let resolved = resolver.resolve(identity, None).await.unwrap();
        assert_eq!(resolved, identity.as_contact_id());
    }

    #[tokio::test]
    async fn everything_failing_is_unresolvable() {
        let dir = MemoryDirectory {
            fail_link: true,
            ..MemoryDirectory::default()
        };
        let resolver = ContactResolver::new(dir);

        let err = resolver
            .resolve(IdentityId::generate(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ContactResolutionError::Unresolvable));
    }
}
