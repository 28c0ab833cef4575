//! Test fixture creation
//!
//! Seeds a lessons database with a small, known dataset. Timestamps are
//! relative to the current UTC day so the dashboard and growth reports see
//! the fixtures in their "today" and windowed buckets.
#![allow(dead_code)]

use super::constants::*;
use chrono::{DateTime, Days, Utc};
use std::time::Duration;
use lifenotes_server::lesson_store::{
    Lesson, LessonStore, Report, ReportStatus, User, UserRole, Visibility,
};

/// Midnight UTC of the current day
pub fn today_start() -> DateTime<Utc> {
    Utc::now()
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .expect("midnight is a valid time")
        .and_utc()
}

/// How long to wait so that `now` is past the next UTC midnight, when it is
/// less than [`MIDNIGHT_GUARD_SECS`] away. `None` otherwise.
pub fn midnight_wait(now: DateTime<Utc>) -> Option<Duration> {
    let next_midnight = now
        .date_naive()
        .succ_opt()?
        .and_hms_opt(0, 0, 0)?
        .and_utc();
    let remaining = next_midnight - now;
    if remaining > chrono::Duration::seconds(MIDNIGHT_GUARD_SECS) {
        return None;
    }
    (remaining + chrono::Duration::seconds(1)).to_std().ok()
}

/// Midnight UTC, `days` days before today
pub fn days_ago(days: u64) -> DateTime<Utc> {
    today_start()
        .checked_sub_days(Days::new(days))
        .expect("date in range")
}

pub fn user(email: &str, name: &str, created_at: DateTime<Utc>) -> User {
    User {
        id: format!("user-{}", name.to_lowercase()),
        email: email.to_string(),
        name: name.to_string(),
        role: UserRole::User,
        is_premium: false,
        created_at,
    }
}

#[allow(clippy::too_many_arguments)]
pub fn lesson(
    id: &str,
    title: &str,
    creator_email: &str,
    category: &str,
    visibility: Visibility,
    is_featured: bool,
    review_status: &str,
    (likes, favorites): (i64, i64),
    created_at: DateTime<Utc>,
) -> Lesson {
    Lesson {
        id: id.to_string(),
        title: title.to_string(),
        creator_email: creator_email.to_string(),
        category: category.to_string(),
        visibility,
        is_featured,
        review_status: review_status.to_string(),
        likes_count: likes,
        favorites_count: favorites,
        views_count: 0,
        created_at,
    }
}

pub fn pending_report(id: &str, lesson_id: &str, title: &str, created_at: DateTime<Utc>) -> Report {
    Report {
        id: id.to_string(),
        lesson_id: lesson_id.to_string(),
        lesson_title: title.to_string(),
        reason: "Inappropriate content".to_string(),
        status: ReportStatus::Pending,
        created_at,
    }
}

/// Inserts the dataset described in `constants.rs`.
pub fn seed_fixtures(store: &dyn LessonStore) -> anyhow::Result<()> {
    store.insert_user(&user(ALICE_EMAIL, "Alice", today_start()))?;
    store.insert_user(&user(BOB_EMAIL, "Bob", days_ago(2)))?;
    store.insert_user(&user(CAROL_EMAIL, "Carol", days_ago(40)))?;

    store.insert_lesson(&lesson(
        LESSON_LETTING_GO,
        "Letting go",
        ALICE_EMAIL,
        "grief",
        Visibility::Public,
        true,
        "approved",
        (10, 2),
        today_start(),
    ))?;
    store.insert_lesson(&lesson(
        LESSON_MORNING_PAGES,
        "Morning pages",
        BOB_EMAIL,
        "growth",
        Visibility::Public,
        false,
        "pending",
        (3, 1),
        days_ago(2),
    ))?;
    store.insert_lesson(&lesson(
        LESSON_QUIET_GRIEF,
        "Quiet grief",
        BOB_EMAIL,
        "grief",
        Visibility::Private,
        false,
        "pending",
        (0, 0),
        days_ago(5),
    ))?;
    store.insert_lesson(&lesson(
        LESSON_CAREER_PIVOTS,
        "Career pivots",
        CAROL_EMAIL,
        "career",
        Visibility::Public,
        true,
        "approved",
        (5, 5),
        days_ago(40),
    ))?;

    for i in 0..5 {
        store.insert_report(&pending_report(
            &format!("report-mp-{}", i),
            LESSON_MORNING_PAGES,
            "Morning pages",
            days_ago(1),
        ))?;
    }
    for i in 0..2 {
        store.insert_report(&pending_report(
            &format!("report-qg-{}", i),
            LESSON_QUIET_GRIEF,
            "Quiet grief",
            days_ago(1),
        ))?;
    }
    store.insert_report(&Report {
        status: ReportStatus::Ignored,
        ..pending_report("report-cp-0", LESSON_CAREER_PIVOTS, "Career pivots", days_ago(30))
    })?;

    Ok(())
}
