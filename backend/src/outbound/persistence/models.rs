//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{saved_items, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
}

/// Row struct for reading saved items in save order.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = saved_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SavedItemRow {
    pub item_key: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub release_or_author_info: Vec<String>,
}

/// Insertable struct for adding an item; `position` and `saved_at` use
/// column defaults.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = saved_items)]
pub(crate) struct NewSavedItemRow<'a> {
    pub user_id: Uuid,
    pub item_key: &'a str,
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
    pub image: Option<&'a str>,
    pub release_or_author_info: &'a [String],
}
