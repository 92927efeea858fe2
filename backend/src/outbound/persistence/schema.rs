//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// User records.
    ///
    /// `email` carries the `users_email_key` unique constraint; `score` is
    /// checked to lie in `0..=100`.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Display name, at most 100 characters.
        name -> Varchar,
        /// Contact email, unique across all rows.
        email -> Varchar,
        /// Integer score in `0..=100`.
        score -> Int4,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last successful mutation timestamp.
        updated_at -> Timestamptz,
    }
}
