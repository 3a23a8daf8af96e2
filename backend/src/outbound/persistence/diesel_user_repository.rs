//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Saved items live in their own table keyed by `(user_id, item_key)`, so a
//! set-add is an `INSERT ... ON CONFLICT DO NOTHING` and a set-remove is a
//! single `DELETE`. Each mutation runs in a transaction that locks the user
//! row and reloads the resulting saved set.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::warn;
use uuid::Uuid;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{
    CatalogKey, EmailAddress, PasswordHash, SavedItem, User, UserId, UserRecord, Username,
};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewSavedItemRow, NewUserRow, SavedItemRow, UserRow};
use super::pool::DbPool;
use super::schema::{saved_items, users};

/// Diesel-backed implementation of the [`UserRepository`] port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

type StoredUser = (UserRow, Vec<SavedItemRow>);

fn row_to_item(row: SavedItemRow) -> Result<SavedItem, UserPersistenceError> {
    let key = CatalogKey::new(&row.item_key).map_err(|err| {
        warn!(item_key = %row.item_key, error = %err, "stored catalogue key is invalid");
        UserPersistenceError::query("stored catalogue key is invalid")
    })?;
    let mut builder = SavedItem::builder(key).release_or_author_info(row.release_or_author_info);
    if let Some(title) = row.title {
        builder = builder.title(title);
    }
    if let Some(description) = row.description {
        builder = builder.description(description);
    }
    if let Some(image) = row.image {
        builder = builder.image(image);
    }
    Ok(builder.build())
}

fn rows_to_record((user, items): StoredUser) -> Result<UserRecord, UserPersistenceError> {
    let invalid = |err: crate::domain::UserValidationError| {
        warn!(user_id = %user.id, error = %err, "stored user is invalid");
        UserPersistenceError::query("stored user is invalid")
    };
    let username = Username::new(&user.username).map_err(invalid)?;
    let email = EmailAddress::new(&user.email).map_err(invalid)?;
    let saved = items
        .into_iter()
        .map(row_to_item)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(UserRecord {
        user: User::new(UserId::from_uuid(user.id), username, email).with_saved_items(saved),
        password_hash: PasswordHash::new(user.password_hash),
    })
}

async fn load_items(
    conn: &mut AsyncPgConnection,
    user_id: Uuid,
) -> Result<Vec<SavedItemRow>, diesel::result::Error> {
    saved_items::table
        .filter(saved_items::user_id.eq(user_id))
        .order_by(saved_items::position.asc())
        .select(SavedItemRow::as_select())
        .load(conn)
        .await
}

/// Lock the user row for the rest of the transaction, if it exists.
async fn lock_user(
    conn: &mut AsyncPgConnection,
    user_id: Uuid,
) -> Result<Option<UserRow>, diesel::result::Error> {
    users::table
        .filter(users::id.eq(user_id))
        .select(UserRow::as_select())
        .for_update()
        .first(conn)
        .await
        .optional()
}

/// Unique column used to look a user up.
enum Lookup {
    Email(String),
    Username(String),
    Id(Uuid),
}

impl DieselUserRepository {
    async fn find_one(&self, lookup: Lookup) -> Result<Option<UserRecord>, UserPersistenceError> {
        let mut pooled = self.pool.get().await.map_err(map_pool_error)?;
        let conn: &mut AsyncPgConnection = &mut pooled;

        let query = users::table.select(UserRow::as_select()).into_boxed();
        let query = match lookup {
            Lookup::Email(email) => query.filter(users::email.eq(email)),
            Lookup::Username(username) => query.filter(users::username.eq(username)),
            Lookup::Id(id) => query.filter(users::id.eq(id)),
        };
        let Some(user) = query
            .first(conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
        else {
            return Ok(None);
        };
        let items = load_items(conn, user.id)
            .await
            .map_err(map_diesel_error)?;
        rows_to_record((user, items)).map(Some)
    }

    fn into_user(stored: Option<StoredUser>) -> Result<Option<User>, UserPersistenceError> {
        stored
            .map(|rows| rows_to_record(rows).map(|record| record.user))
            .transpose()
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, UserPersistenceError> {
        self.find_one(Lookup::Email(email.to_owned())).await
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, UserPersistenceError> {
        self.find_one(Lookup::Username(username.to_owned())).await
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserRecord>, UserPersistenceError> {
        self.find_one(Lookup::Id(*id.as_uuid())).await
    }

    async fn create(&self, record: &UserRecord) -> Result<(), UserPersistenceError> {
        let mut pooled = self.pool.get().await.map_err(map_pool_error)?;
        let conn: &mut AsyncPgConnection = &mut pooled;
        let user = &record.user;
        let row = NewUserRow {
            id: *user.id().as_uuid(),
            username: user.username().as_ref(),
            email: user.email().as_ref(),
            password_hash: record.password_hash.as_ref(),
        };
        diesel::insert_into(users::table)
            .values(&row)
            .execute(conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn add_to_saved_set(
        &self,
        user_id: &UserId,
        item: &SavedItem,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut pooled = self.pool.get().await.map_err(map_pool_error)?;
        let conn: &mut AsyncPgConnection = &mut pooled;
        let id = *user_id.as_uuid();
        let row = NewSavedItemRow {
            user_id: id,
            item_key: item.key().as_ref(),
            title: item.title(),
            description: item.description(),
            image: item.image(),
            release_or_author_info: item.release_or_author_info(),
        };

        let stored: Option<StoredUser> = conn
            .transaction(|conn| {
                async move {
                    let Some(user) = lock_user(conn, id).await? else {
                        return Ok(None);
                    };
                    diesel::insert_into(saved_items::table)
                        .values(&row)
                        .on_conflict((saved_items::user_id, saved_items::item_key))
                        .do_nothing()
                        .execute(conn)
                        .await?;
                    let items = load_items(conn, id).await?;
                    Ok(Some((user, items)))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        Self::into_user(stored)
    }

    async fn remove_from_saved_set(
        &self,
        user_id: &UserId,
        key: &CatalogKey,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut pooled = self.pool.get().await.map_err(map_pool_error)?;
        let conn: &mut AsyncPgConnection = &mut pooled;
        let id = *user_id.as_uuid();
        let item_key = key.as_ref().to_owned();

        let stored: Option<StoredUser> = conn
            .transaction(|conn| {
                async move {
                    let Some(user) = lock_user(conn, id).await? else {
                        return Ok(None);
                    };
                    diesel::delete(
                        saved_items::table
                            .filter(saved_items::user_id.eq(id))
                            .filter(saved_items::item_key.eq(item_key)),
                    )
                    .execute(conn)
                    .await?;
                    let items = load_items(conn, id).await?;
                    Ok(Some((user, items)))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        Self::into_user(stored)
    }
}
