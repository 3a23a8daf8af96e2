//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered accounts. `email` and `username` carry unique constraints
    /// named `users_email_key` and `users_username_key`.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Public handle, trimmed (max 64 characters).
        username -> Varchar,
        /// Trimmed, lower-cased email address (max 254 characters).
        email -> Varchar,
        /// Argon2 hash in PHC string format.
        password_hash -> Text,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Saved catalogue items, one row per user and catalogue key.
    ///
    /// The composite primary key makes set-add a conflict-free insert.
    saved_items (user_id, item_key) {
        /// Owning user.
        user_id -> Uuid,
        /// Canonical catalogue key (max 128 characters).
        item_key -> Varchar,
        /// Monotonic sequence preserving save order.
        position -> Int8,
        title -> Nullable<Text>,
        description -> Nullable<Text>,
        image -> Nullable<Text>,
        /// Release dates for movies or author names for books.
        release_or_author_info -> Array<Text>,
        /// When the item was saved.
        saved_at -> Timestamptz,
    }
}

diesel::joinable!(saved_items -> users (user_id));
diesel::allow_tables_to_appear_in_same_query!(users, saved_items);
