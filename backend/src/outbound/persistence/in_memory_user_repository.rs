//! Process-local `UserRepository` used when no database is configured.
//!
//! Users are stored as whole documents behind one mutex. Each operation does
//! its check and its mutation inside a single lock acquisition, which gives
//! the same set semantics as the PostgreSQL adapter.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{CatalogKey, SavedItem, User, UserId, UserRecord};

/// In-memory implementation of the [`UserRepository`] port.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<Uuid, UserRecord>>,
}

impl InMemoryUserRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<Uuid, UserRecord>>, UserPersistenceError> {
        self.users
            .lock()
            .map_err(|_| UserPersistenceError::query("user store lock poisoned"))
    }

    fn find_where<P>(&self, predicate: P) -> Result<Option<UserRecord>, UserPersistenceError>
    where
        P: Fn(&UserRecord) -> bool,
    {
        let users = self.lock()?;
        Ok(users.values().find(|record| predicate(record)).cloned())
    }

    fn mutate<F>(&self, user_id: &UserId, change: F) -> Result<Option<User>, UserPersistenceError>
    where
        F: FnOnce(&mut User),
    {
        let mut users = self.lock()?;
        Ok(users.get_mut(user_id.as_uuid()).map(|record| {
            change(&mut record.user);
            record.user.clone()
        }))
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, UserPersistenceError> {
        self.find_where(|record| record.user.email().as_ref() == email)
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, UserPersistenceError> {
        self.find_where(|record| record.user.username().as_ref() == username)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserRecord>, UserPersistenceError> {
        Ok(self.lock()?.get(id.as_uuid()).cloned())
    }

    async fn create(&self, record: &UserRecord) -> Result<(), UserPersistenceError> {
        let mut users = self.lock()?;
        let new_user = &record.user;
        for existing in users.values() {
            if existing.user.email() == new_user.email() {
                return Err(UserPersistenceError::duplicate("email"));
            }
            if existing.user.username() == new_user.username() {
                return Err(UserPersistenceError::duplicate("username"));
            }
        }
        if users.contains_key(new_user.id().as_uuid()) {
            return Err(UserPersistenceError::duplicate("id"));
        }
        users.insert(*new_user.id().as_uuid(), record.clone());
        Ok(())
    }

    async fn add_to_saved_set(
        &self,
        user_id: &UserId,
        item: &SavedItem,
    ) -> Result<Option<User>, UserPersistenceError> {
        self.mutate(user_id, |user| {
            user.insert_saved_item(item.clone());
        })
    }

    async fn remove_from_saved_set(
        &self,
        user_id: &UserId,
        key: &CatalogKey,
    ) -> Result<Option<User>, UserPersistenceError> {
        self.mutate(user_id, |user| {
            user.remove_saved_item(key);
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use std::sync::Arc;

    use super::*;
    use crate::domain::{EmailAddress, PasswordHash, Username};
    use rstest::{fixture, rstest};

    fn record(username: &str, email: &str) -> UserRecord {
        UserRecord {
            user: User::new(
                UserId::random(),
                Username::new(username).expect("username"),
                EmailAddress::new(email).expect("email"),
            ),
            password_hash: PasswordHash::new("hash"),
        }
    }

    fn item(key: i64, title: &str) -> SavedItem {
        SavedItem::builder(CatalogKey::from_number(key))
            .title(title)
            .build()
    }

    #[fixture]
    fn alice() -> UserRecord {
        record("alice", "a@x.com")
    }

    #[rstest]
    #[tokio::test]
    async fn created_users_are_found_by_each_key(alice: UserRecord) {
        let repo = InMemoryUserRepository::new();
        repo.create(&alice).await.expect("create");

        let by_email = repo.find_by_email("a@x.com").await.expect("lookup");
        let by_name = repo.find_by_username("alice").await.expect("lookup");
        let by_id = repo.find_by_id(alice.user.id()).await.expect("lookup");

        assert_eq!(by_email.as_ref(), Some(&alice));
        assert_eq!(by_name.as_ref(), Some(&alice));
        assert_eq!(by_id, Some(alice));
    }

    #[rstest]
    #[case::email("bob", "a@x.com", "email")]
    #[case::username("alice", "b@x.com", "username")]
    #[tokio::test]
    async fn create_rejects_duplicates(
        alice: UserRecord,
        #[case] username: &str,
        #[case] email: &str,
        #[case] field: &str,
    ) {
        let repo = InMemoryUserRepository::new();
        repo.create(&alice).await.expect("create");

        let err = repo
            .create(&record(username, email))
            .await
            .expect_err("duplicate");
        assert_eq!(err, UserPersistenceError::duplicate(field));
    }

    #[rstest]
    #[tokio::test]
    async fn saving_an_existing_key_keeps_the_original(alice: UserRecord) {
        let repo = InMemoryUserRepository::new();
        repo.create(&alice).await.expect("create");
        let id = alice.user.id();

        repo.add_to_saved_set(id, &item(42, "First"))
            .await
            .expect("save");
        let user = repo
            .add_to_saved_set(id, &item(42, "Second"))
            .await
            .expect("save")
            .expect("user exists");

        assert_eq!(user.saved_count(), 1);
        assert_eq!(user.saved_items()[0].title(), Some("First"));
    }

    #[rstest]
    #[tokio::test]
    async fn removing_a_missing_key_is_a_no_op(alice: UserRecord) {
        let repo = InMemoryUserRepository::new();
        repo.create(&alice).await.expect("create");
        let id = alice.user.id();
        repo.add_to_saved_set(id, &item(1, "Kept"))
            .await
            .expect("save");

        let user = repo
            .remove_from_saved_set(id, &CatalogKey::from_number(2))
            .await
            .expect("remove")
            .expect("user exists");

        assert_eq!(user.saved_count(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn mutations_for_unknown_users_return_none() {
        let repo = InMemoryUserRepository::new();
        let stranger = UserId::random();

        assert_eq!(
            repo.add_to_saved_set(&stranger, &item(1, "x"))
                .await
                .expect("save"),
            None
        );
        assert_eq!(
            repo.remove_from_saved_set(&stranger, &CatalogKey::from_number(1))
                .await
                .expect("remove"),
            None
        );
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_saves_of_one_key_yield_one_entry(alice: UserRecord) {
        let repo = Arc::new(InMemoryUserRepository::new());
        repo.create(&alice).await.expect("create");
        let id = alice.user.id().clone();

        let tasks: Vec<_> = (0..32)
            .map(|n| {
                let repo = Arc::clone(&repo);
                let id = id.clone();
                tokio::spawn(async move {
                    repo.add_to_saved_set(&id, &item(42, &format!("copy {n}")))
                        .await
                })
            })
            .collect();
        for task in tasks {
            task.await.expect("join").expect("save");
        }

        let stored = repo
            .find_by_id(&id)
            .await
            .expect("lookup")
            .expect("user exists");
        assert_eq!(stored.user.saved_count(), 1);
    }
}
