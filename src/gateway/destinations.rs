//! Destination pattern matching
//!
//! One compiled pattern per protected destination family. Capture groups
//! extract the numeric entity id from its fixed path segment; everything
//! that matches no family is unprotected.

use once_cell::sync::Lazy;
use regex::Regex;

/// Admin-only view of the queued build jobs.
pub const ADMIN_BUILD_QUEUE_TOPIC: &str = "/topic/admin/queued-jobs";
/// Admin-only build-agent management topic.
pub const ADMIN_BUILD_AGENTS_TOPIC: &str = "/topic/admin/build-agents";

static COURSE_BUILD_QUEUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/topic/courses/(\d+)/queued-jobs$").expect("static pattern"));
static PARTICIPATION_TEAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/topic/participations/(\d+)/team$").expect("static pattern"));
static EXERCISE_NEW_RESULTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/topic/exercises/(\d+)/new-results$").expect("static pattern"));
static EXAM_ROOT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/topic/exams/(\d+)(/.*)?$").expect("static pattern"));

/// A destination that falls under one of the protected families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtectedDestination {
    AdminBuildQueue,
    AdminBuildAgents,
    CourseBuildQueue { course_id: u64 },
    ParticipationTeam { participation_id: u64 },
    ExerciseNewResults { exercise_id: u64 },
    ExamRoot { exam_id: u64 },
    /// Matched a protected pattern, but the id digits overflow `u64`. No
    /// such entity can exist, so the subscription must be denied rather
    /// than falling through to the default-allow.
    MalformedId,
}

/// Classify a destination against the ordered pattern chain.
/// `None` means no pattern matches and the subscription is unprotected.
pub fn classify(destination: &str) -> Option<ProtectedDestination> {
    if destination == ADMIN_BUILD_QUEUE_TOPIC {
        return Some(ProtectedDestination::AdminBuildQueue);
    }
    if destination == ADMIN_BUILD_AGENTS_TOPIC {
        return Some(ProtectedDestination::AdminBuildAgents);
    }
    if let Some(caps) = COURSE_BUILD_QUEUE.captures(destination) {
        return Some(match capture_id(&caps) {
            Some(course_id) => ProtectedDestination::CourseBuildQueue { course_id },
            None => ProtectedDestination::MalformedId,
        });
    }
    if let Some(caps) = PARTICIPATION_TEAM.captures(destination) {
        return Some(match capture_id(&caps) {
            Some(participation_id) => ProtectedDestination::ParticipationTeam { participation_id },
            None => ProtectedDestination::MalformedId,
        });
    }
    if let Some(caps) = EXERCISE_NEW_RESULTS.captures(destination) {
        return Some(match capture_id(&caps) {
            Some(exercise_id) => ProtectedDestination::ExerciseNewResults { exercise_id },
            None => ProtectedDestination::MalformedId,
        });
    }
    if let Some(caps) = EXAM_ROOT.captures(destination) {
        return Some(match capture_id(&caps) {
            Some(exam_id) => ProtectedDestination::ExamRoot { exam_id },
            None => ProtectedDestination::MalformedId,
        });
    }
    None
}

fn capture_id(caps: &regex::Captures<'_>) -> Option<u64> {
    caps.get(1).and_then(|m| m.as_str().parse().ok())
}
