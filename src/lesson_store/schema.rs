//! SQLite schema for the lessons database.
//!
//! Timestamps are INTEGER seconds since the Unix epoch. `reports.lesson_id`
//! deliberately carries no foreign key: deleting a lesson leaves its reports behind.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema};

// =============================================================================
// Version 1
// =============================================================================

const USERS_TABLE_V1: Table = Table {
    name: "users",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("email", &SqlType::Text, non_null = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!(
            "role",
            &SqlType::Text,
            non_null = true,
            default_value = Some("'user'")
        ),
        sqlite_column!(
            "is_premium",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!("created_at", &SqlType::Integer, non_null = true),
    ],
    indices: &[("idx_users_created_at", "created_at")],
    unique_constraints: &[&["email"]],
};

/// Counters are nullable, older documents predate them.
const LESSONS_TABLE_V1: Table = Table {
    name: "lessons",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("creator_email", &SqlType::Text, non_null = true),
        sqlite_column!("category", &SqlType::Text, non_null = true),
        sqlite_column!("visibility", &SqlType::Text, non_null = true),
        sqlite_column!(
            "is_featured",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "review_status",
            &SqlType::Text,
            non_null = true,
            default_value = Some("'pending'")
        ),
        sqlite_column!("likes_count", &SqlType::Integer),
        sqlite_column!("favorites_count", &SqlType::Integer),
        sqlite_column!(
            "views_count",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!("created_at", &SqlType::Integer, non_null = true),
    ],
    indices: &[
        ("idx_lessons_created_at", "created_at DESC, id DESC"),
        ("idx_lessons_creator_email", "creator_email"),
        ("idx_lessons_category", "category"),
    ],
    unique_constraints: &[],
};

const REPORTS_TABLE_V1: Table = Table {
    name: "reports",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("lesson_id", &SqlType::Text, non_null = true),
        sqlite_column!("lesson_title", &SqlType::Text, non_null = true),
        sqlite_column!("reason", &SqlType::Text, non_null = true),
        sqlite_column!(
            "status",
            &SqlType::Text,
            non_null = true,
            default_value = Some("'pending'")
        ),
        sqlite_column!("created_at", &SqlType::Integer, non_null = true),
    ],
    indices: &[
        ("idx_reports_status_lesson", "status, lesson_id"),
        ("idx_reports_created_at", "created_at DESC"),
    ],
    unique_constraints: &[],
};

const ADMIN_ACTIVITY_TABLE_V1: Table = Table {
    name: "admin_activity",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("admin_email", &SqlType::Text, non_null = true),
        sqlite_column!("action_type", &SqlType::Text, non_null = true),
        sqlite_column!("description", &SqlType::Text, non_null = true),
        sqlite_column!("created_at", &SqlType::Integer, non_null = true),
    ],
    indices: &[
        ("idx_admin_activity_created_at", "created_at DESC"),
        ("idx_admin_activity_action_type", "action_type"),
    ],
    unique_constraints: &[],
};

pub const LESSON_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 1,
    tables: &[
        USERS_TABLE_V1,
        LESSONS_TABLE_V1,
        REPORTS_TABLE_V1,
        ADMIN_ACTIVITY_TABLE_V1,
    ],
    migration: None,
}];
