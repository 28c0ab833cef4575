use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Converts a stored epoch-seconds value into a UTC instant.
pub fn timestamp_to_datetime(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

// =============================================================================
// Enumerations stored as text
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(UserRole::User),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "Public",
            Visibility::Private => "Private",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Public" => Some(Visibility::Public),
            "Private" => Some(Visibility::Private),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Pending,
    Ignored,
    Resolved,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Ignored => "ignored",
            ReportStatus::Resolved => "resolved",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ReportStatus::Pending),
            "ignored" => Some(ReportStatus::Ignored),
            "resolved" => Some(ReportStatus::Resolved),
            _ => None,
        }
    }
}

/// Kind of action recorded in the admin activity log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminActionType {
    Moderated,
    ReportReviewed,
    Deleted,
}

impl AdminActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminActionType::Moderated => "moderated",
            AdminActionType::ReportReviewed => "report_reviewed",
            AdminActionType::Deleted => "deleted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "moderated" => Some(AdminActionType::Moderated),
            "report_reviewed" => Some(AdminActionType::ReportReviewed),
            "deleted" => Some(AdminActionType::Deleted),
            _ => None,
        }
    }
}

// =============================================================================
// Documents
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub is_premium: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: String,
    pub title: String,
    pub creator_email: String,
    pub category: String,
    pub visibility: Visibility,
    pub is_featured: bool,
    pub review_status: String,
    /// Missing counters are read back as zero.
    pub likes_count: i64,
    pub favorites_count: i64,
    pub views_count: i64,
    pub created_at: DateTime<Utc>,
}

/// A user complaint about a lesson.
///
/// `lesson_id` is a weak reference: the lesson may have been deleted since.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: String,
    pub lesson_id: String,
    /// Title of the lesson at the time the report was filed.
    pub lesson_title: String,
    pub reason: String,
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminActivity {
    pub id: String,
    pub admin_email: String,
    pub action_type: AdminActionType,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl AdminActivity {
    pub fn new(admin_email: &str, action_type: AdminActionType, description: String) -> Self {
        AdminActivity {
            id: uuid::Uuid::new_v4().to_string(),
            admin_email: admin_email.to_string(),
            action_type,
            description,
            created_at: Utc::now(),
        }
    }
}

// =============================================================================
// Query inputs
// =============================================================================

/// Collections whose creation dates feed the growth charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Users,
    Lessons,
}

impl Collection {
    pub fn table_name(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Lessons => "lessons",
        }
    }
}

/// A normalized page window, `page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub limit: usize,
}

impl PageRequest {
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    /// Offset as an SQLite integer. Saturates, since SQLite reads a negative
    /// OFFSET as zero.
    pub fn sql_offset(&self) -> i64 {
        i64::try_from(self.offset()).unwrap_or(i64::MAX)
    }
}

/// Exact-match filters for the moderation listing. `None` means "any".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LessonFilter {
    pub category: Option<String>,
    pub visibility: Option<String>,
    pub is_featured: Option<bool>,
    pub review_status: Option<String>,
}

/// Fields an admin may change on a lesson.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonModerationUpdate {
    pub is_featured: Option<bool>,
    pub visibility: Option<Visibility>,
    pub review_status: Option<String>,
}

impl LessonModerationUpdate {
    pub fn is_empty(&self) -> bool {
        self.is_featured.is_none() && self.visibility.is_none() && self.review_status.is_none()
    }
}

// =============================================================================
// Query results
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionCounts {
    pub total: u64,
    pub created_since: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopContributor {
    pub email: String,
    /// `None` when the creator no longer has a user row.
    pub name: Option<String>,
    pub lesson_count: u64,
    pub total_likes: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationStats {
    pub total_lessons: u64,
    pub public_lessons: u64,
    pub private_lessons: u64,
    pub featured_lessons: u64,
    pub reported_lessons: u64,
}

/// Page, total and stats read from one snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LessonFacet {
    pub lessons: Vec<Lesson>,
    pub total: u64,
    pub stats: ModerationStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportGroup {
    pub lesson_id: String,
    pub lesson_title: String,
    pub report_count: u64,
    pub reports: Vec<Report>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportGroupPage {
    pub groups: Vec<ReportGroup>,
    pub total: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityPage {
    pub entries: Vec<AdminActivity>,
    pub total: u64,
}
