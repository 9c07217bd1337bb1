//! Subscription admission policy
//!
//! Invoked once per inbound SUBSCRIBE frame, before application logic sees
//! it. Evaluates an ordered, first-match chain of destination-pattern rules
//! against the principal's roles; destinations matching no rule are allowed.
//! Denied frames are dropped silently so a client cannot probe which rule
//! failed. Identity and entity lookups are external collaborators injected
//! behind traits; a lookup reporting "not found" is treated as a deny, not
//! as an error.

pub mod destinations;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

pub use destinations::{
    classify, ProtectedDestination, ADMIN_BUILD_AGENTS_TOPIC, ADMIN_BUILD_QUEUE_TOPIC,
};

/// STOMP frame command kinds as far as admission cares. Only `Subscribe`
/// frames are evaluated here; a coarser transport-level policy handles the
/// rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameCommand {
    Subscribe,
    Unsubscribe,
    Send,
    Message,
}

/// An inbound subscription to be admitted or dropped.
#[derive(Debug, Clone)]
pub struct SubscriptionRequest {
    /// Authenticated login, absent for anonymous sessions.
    pub principal: Option<String>,
    pub destination: String,
    pub command: FrameCommand,
}

/// Outcome of the admission chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allowed,
    Denied,
}

impl AccessDecision {
    pub fn is_allowed(self) -> bool {
        self == AccessDecision::Allowed
    }
}

/// Course-scoped role of a principal, ordered by privilege so
/// "instructor-or-above" is an ordering comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CourseRole {
    None,
    Student,
    TeachingAssistant,
    Editor,
    Instructor,
}

/// Lookup failures a collaborator may signal instead of returning a value.
#[derive(Debug, Error, PartialEq)]
pub enum LookupError {
    #[error("entity not found: {0}")]
    NotFound(String),
}

/// Identity and role checks, backed by the surrounding system.
#[async_trait]
pub trait AuthorityService: Send + Sync {
    async fn is_admin(&self, login: &str) -> Result<bool, LookupError>;

    async fn role_in_course(&self, login: &str, course_id: u64) -> Result<CourseRole, LookupError>;

    async fn role_in_exercise(
        &self,
        login: &str,
        exercise_id: u64,
    ) -> Result<CourseRole, LookupError>;

    async fn participation_owned_by(
        &self,
        participation_id: u64,
        login: &str,
    ) -> Result<bool, LookupError>;
}

/// Where an exercise lives: its owning course, and whether it is part of an
/// exam (exam exercises are gated harder than course exercises).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExerciseContext {
    pub course_id: u64,
    pub exam_exercise: bool,
}

/// Entity lookups, backed by the surrounding system's repositories.
#[async_trait]
pub trait EntityDirectory: Send + Sync {
    async fn exercise_context(&self, exercise_id: u64) -> Result<ExerciseContext, LookupError>;

    /// Course owning the given exam.
    async fn exam_course(&self, exam_id: u64) -> Result<u64, LookupError>;
}

/// Gate deciding which principals may subscribe to which destinations.
pub struct SubscriptionGateway {
    authority: Arc<dyn AuthorityService>,
    directory: Arc<dyn EntityDirectory>,
}

impl SubscriptionGateway {
    pub fn new(authority: Arc<dyn AuthorityService>, directory: Arc<dyn EntityDirectory>) -> Self {
        Self {
            authority,
            directory,
        }
    }

    /// Admit or drop an inbound frame. Non-SUBSCRIBE commands pass through
    /// untouched.
    pub async fn admit(&self, request: &SubscriptionRequest) -> AccessDecision {
        if request.command != FrameCommand::Subscribe {
            return AccessDecision::Allowed;
        }

        let Some(login) = request.principal.as_deref() else {
            warn!(
                destination = %request.destination,
                "denying subscription without principal"
            );
            return AccessDecision::Denied;
        };

        match self.evaluate(login, &request.destination).await {
            Ok(decision) => {
                if decision == AccessDecision::Denied {
                    debug!(
                        login,
                        destination = %request.destination,
                        "subscription denied by admission policy"
                    );
                }
                decision
            }
            Err(LookupError::NotFound(entity)) => {
                warn!(
                    login,
                    destination = %request.destination,
                    entity,
                    "denying subscription, referenced entity not found"
                );
                AccessDecision::Denied
            }
        }
    }

    /// Ordered first-match rule chain. At most one rule's lookups execute
    /// per frame.
    async fn evaluate(&self, login: &str, destination: &str) -> Result<AccessDecision, LookupError> {
        let Some(protected) = classify(destination) else {
            // No pattern matches: allow by default.
            return Ok(AccessDecision::Allowed);
        };

        let allowed = match protected {
            ProtectedDestination::AdminBuildQueue | ProtectedDestination::AdminBuildAgents => {
                self.authority.is_admin(login).await?
            }
            ProtectedDestination::CourseBuildQueue { course_id } => {
                self.authority.role_in_course(login, course_id).await? >= CourseRole::Instructor
            }
            ProtectedDestination::ParticipationTeam { participation_id } => {
                self.authority
                    .participation_owned_by(participation_id, login)
                    .await?
            }
            ProtectedDestination::ExerciseNewResults { exercise_id } => {
                let context = self.directory.exercise_context(exercise_id).await?;
                if context.exam_exercise {
                    self.authority.role_in_course(login, context.course_id).await?
                        >= CourseRole::Instructor
                } else {
                    self.authority.role_in_exercise(login, exercise_id).await?
                        >= CourseRole::TeachingAssistant
                }
            }
            ProtectedDestination::ExamRoot { exam_id } => {
                let course_id = self.directory.exam_course(exam_id).await?;
                self.authority.role_in_course(login, course_id).await? >= CourseRole::Instructor
            }
            ProtectedDestination::MalformedId => {
                warn!(
                    login,
                    destination, "denying subscription, destination id does not parse"
                );
                false
            }
        };

        Ok(if allowed {
            AccessDecision::Allowed
        } else {
            AccessDecision::Denied
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_role_ordering() {
        assert!(CourseRole::Instructor >= CourseRole::Instructor);
        assert!(CourseRole::Editor < CourseRole::Instructor);
        assert!(CourseRole::TeachingAssistant >= CourseRole::TeachingAssistant);
        assert!(CourseRole::Student < CourseRole::TeachingAssistant);
        assert!(CourseRole::None < CourseRole::Student);
    }

    #[test]
    fn test_access_decision_helper() {
        assert!(AccessDecision::Allowed.is_allowed());
        assert!(!AccessDecision::Denied.is_allowed());
    }
}
