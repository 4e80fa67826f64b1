//! Diesel table definitions for the credential store.
//!
//! Kept in sync with `migrations/` by hand. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered users with their credential digest and audit timestamps.
    users (id) {
        /// Primary key assigned by the database sequence.
        id -> Int8,
        /// Unique login name (max 64 characters).
        username -> Varchar,
        /// Argon2id digest in PHC string format.
        password_hash -> Text,
        /// Free-form country name (max 64 characters).
        country -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp, written by the service on update.
        updated_at -> Timestamptz,
    }
}
