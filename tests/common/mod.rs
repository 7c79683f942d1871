#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum_test::TestServer;
use chrono::{DateTime, Duration, TimeZone, Utc};
use shortlink_registry::application::services::{ExpiryPolicy, LinkRegistry};
use shortlink_registry::domain::entities::{Link, NewLink, Validity};
use shortlink_registry::domain::event_log::EventRecorder;
use shortlink_registry::routes::router;
use shortlink_registry::state::AppState;
use shortlink_registry::utils::clock::Clock;
use shortlink_registry::utils::code_generator::CodeGenerator;

pub const BASE_URL: &str = "http://s.test";

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

/// Clock the test moves forward by hand.
pub struct TestClock(Mutex<DateTime<Utc>>);

impl TestClock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self(Mutex::new(start_time())))
    }

    pub fn advance(&self, by: Duration) {
        *self.0.lock().unwrap() += by;
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

pub fn create_test_registry(clock: Arc<TestClock>) -> LinkRegistry {
    LinkRegistry::new(CodeGenerator::seeded(42), EventRecorder::default()).with_clock(clock)
}

pub fn create_test_state(registry: LinkRegistry) -> AppState {
    AppState::new(Arc::new(registry), BASE_URL)
}

/// Full application router over a fresh registry.
pub fn create_test_server() -> (TestServer, AppState, Arc<TestClock>) {
    let clock = TestClock::new();
    let state = create_test_state(create_test_registry(clock.clone()));
    let server = TestServer::new(router(state.clone())).unwrap();
    (server, state, clock)
}

/// Same as [`create_test_server`] but resolving expired links fails.
pub fn create_enforcing_test_server() -> (TestServer, AppState, Arc<TestClock>) {
    let clock = TestClock::new();
    let registry =
        create_test_registry(clock.clone()).with_expiry_policy(ExpiryPolicy::Enforced);
    let state = create_test_state(registry);
    let server = TestServer::new(router(state.clone())).unwrap();
    (server, state, clock)
}

pub fn create_test_link(state: &AppState, url: &str, code: &str) -> Link {
    state
        .registry
        .create(NewLink::new(url).with_preferred_code(code))
        .unwrap()
}

pub fn create_short_lived_link(state: &AppState, url: &str, code: &str) -> Link {
    state
        .registry
        .create(
            NewLink::new(url)
                .with_preferred_code(code)
                .with_validity(Validity::minutes(1).unwrap()),
        )
        .unwrap()
}
