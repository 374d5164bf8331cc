//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `migrations/` exactly. Regenerate with
//! `diesel print-schema` when a migration changes the table.

diesel::table! {
    /// Directory members.
    ///
    /// Listing queries order by `(cohort, id)`; `members_listing_idx` covers
    /// the active/role/cohort prefix every tab predicate starts with.
    members (id) {
        /// Primary key shared with the identity provider.
        id -> Uuid,
        /// Display name (max 50 characters).
        name -> Varchar,
        /// Admission cohort, 1 to 999.
        cohort -> Int4,
        organization -> Varchar,
        phone -> Nullable<Varchar>,
        secondary_phone -> Nullable<Varchar>,
        title -> Nullable<Varchar>,
        business_type -> Nullable<Varchar>,
        avatar_url -> Nullable<Varchar>,
        /// Up to three free-text tags.
        tags -> Array<Text>,
        email -> Nullable<Varchar>,
        phone_consent -> Bool,
        secondary_phone_consent -> Bool,
        /// `user`, `admin`, or a partner role name.
        role -> Varchar,
        /// Approved members are active; signups start inactive.
        active -> Bool,
        created_at -> Timestamptz,
        /// Last profile edit.
        updated_at -> Timestamptz,
    }
}
