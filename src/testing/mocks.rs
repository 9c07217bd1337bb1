//! Mock implementations for testing
//!
//! Provides a mock relay handle plus authority and directory collaborators,
//! so supervisor and gateway behavior can be exercised without external
//! dependencies.

use crate::gateway::{
    AuthorityService, CourseRole, EntityDirectory, ExerciseContext, LookupError,
};
use crate::relay::{BrokerEndpoint, RelayError, RelayHandle};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Mock relay handle recording every stop/start and tracking how many
/// stop/start calls execute concurrently.
#[derive(Debug, Default)]
pub struct MockRelayHandle {
    running: AtomicBool,
    should_fail: AtomicBool,
    call_delay_ms: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    start_count: AtomicUsize,
    stop_count: AtomicUsize,
    started_endpoints: Mutex<Vec<BrokerEndpoint>>,
}

impl MockRelayHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every start call fails until cleared.
    pub fn with_failure() -> Self {
        let handle = Self::default();
        handle.should_fail.store(true, Ordering::Release);
        handle
    }

    /// Delay each stop/start call, widening race windows for concurrency
    /// tests.
    pub fn with_call_delay(delay: Duration) -> Self {
        let handle = Self::default();
        handle
            .call_delay_ms
            .store(delay.as_millis() as usize, Ordering::Release);
        handle
    }

    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::Release);
    }

    pub fn start_count(&self) -> usize {
        self.start_count.load(Ordering::Acquire)
    }

    pub fn stop_count(&self) -> usize {
        self.stop_count.load(Ordering::Acquire)
    }

    /// Highest number of stop/start calls ever observed in flight at once.
    /// Greater than 1 means two restart attempts overlapped.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::Acquire)
    }

    /// Endpoints passed to start, in call order.
    pub fn started_endpoints(&self) -> Vec<BrokerEndpoint> {
        self.started_endpoints
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    async fn enter_call(&self) {
        let current = self.in_flight.fetch_add(1, Ordering::AcqRel) + 1;
        self.max_in_flight.fetch_max(current, Ordering::AcqRel);
        let delay = self.call_delay_ms.load(Ordering::Acquire);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay as u64)).await;
        }
    }

    fn exit_call(&self) {
        self.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}

#[async_trait]
impl RelayHandle for MockRelayHandle {
    async fn start(&self, endpoint: &BrokerEndpoint) -> Result<(), RelayError> {
        self.enter_call().await;
        self.start_count.fetch_add(1, Ordering::AcqRel);
        if self.should_fail.load(Ordering::Acquire) {
            self.exit_call();
            return Err(RelayError::Unreachable(endpoint.to_string()));
        }
        self.started_endpoints
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(endpoint.clone());
        self.running.store(true, Ordering::Release);
        self.exit_call();
        Ok(())
    }

    async fn stop(&self) -> Result<(), RelayError> {
        self.enter_call().await;
        self.stop_count.fetch_add(1, Ordering::AcqRel);
        self.running.store(false, Ordering::Release);
        self.exit_call();
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Mock authority with explicitly granted roles; everything not granted
/// resolves to no privilege.
#[derive(Debug, Default)]
pub struct MockAuthority {
    admins: HashSet<String>,
    course_roles: HashMap<(String, u64), CourseRole>,
    exercise_roles: HashMap<(String, u64), CourseRole>,
    /// participation id -> owning logins; unknown ids signal NotFound.
    participations: HashMap<u64, HashSet<String>>,
}

impl MockAuthority {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant_admin(mut self, login: &str) -> Self {
        self.admins.insert(login.to_string());
        self
    }

    pub fn grant_course_role(mut self, login: &str, course_id: u64, role: CourseRole) -> Self {
        self.course_roles.insert((login.to_string(), course_id), role);
        self
    }

    pub fn grant_exercise_role(mut self, login: &str, exercise_id: u64, role: CourseRole) -> Self {
        self.exercise_roles
            .insert((login.to_string(), exercise_id), role);
        self
    }

    pub fn with_participation(mut self, participation_id: u64, owners: &[&str]) -> Self {
        self.participations.insert(
            participation_id,
            owners.iter().map(|o| o.to_string()).collect(),
        );
        self
    }
}

#[async_trait]
impl AuthorityService for MockAuthority {
    async fn is_admin(&self, login: &str) -> Result<bool, LookupError> {
        Ok(self.admins.contains(login))
    }

    async fn role_in_course(&self, login: &str, course_id: u64) -> Result<CourseRole, LookupError> {
        Ok(self
            .course_roles
            .get(&(login.to_string(), course_id))
            .copied()
            .unwrap_or(CourseRole::None))
    }

    async fn role_in_exercise(
        &self,
        login: &str,
        exercise_id: u64,
    ) -> Result<CourseRole, LookupError> {
        Ok(self
            .exercise_roles
            .get(&(login.to_string(), exercise_id))
            .copied()
            .unwrap_or(CourseRole::None))
    }

    async fn participation_owned_by(
        &self,
        participation_id: u64,
        login: &str,
    ) -> Result<bool, LookupError> {
        match self.participations.get(&participation_id) {
            Some(owners) => Ok(owners.contains(login)),
            None => Err(LookupError::NotFound(format!(
                "participation {participation_id}"
            ))),
        }
    }
}

/// Mock entity directory; unknown ids signal NotFound.
#[derive(Debug, Default)]
pub struct MockDirectory {
    exercises: HashMap<u64, ExerciseContext>,
    exams: HashMap<u64, u64>,
}

impl MockDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_course_exercise(mut self, exercise_id: u64, course_id: u64) -> Self {
        self.exercises.insert(
            exercise_id,
            ExerciseContext {
                course_id,
                exam_exercise: false,
            },
        );
        self
    }

    pub fn with_exam_exercise(mut self, exercise_id: u64, course_id: u64) -> Self {
        self.exercises.insert(
            exercise_id,
            ExerciseContext {
                course_id,
                exam_exercise: true,
            },
        );
        self
    }

    pub fn with_exam(mut self, exam_id: u64, course_id: u64) -> Self {
        self.exams.insert(exam_id, course_id);
        self
    }
}

#[async_trait]
impl EntityDirectory for MockDirectory {
    async fn exercise_context(&self, exercise_id: u64) -> Result<ExerciseContext, LookupError> {
        self.exercises
            .get(&exercise_id)
            .copied()
            .ok_or_else(|| LookupError::NotFound(format!("exercise {exercise_id}")))
    }

    async fn exam_course(&self, exam_id: u64) -> Result<u64, LookupError> {
        self.exams
            .get(&exam_id)
            .copied()
            .ok_or_else(|| LookupError::NotFound(format!("exam {exam_id}")))
    }
}
