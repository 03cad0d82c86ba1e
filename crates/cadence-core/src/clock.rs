//! Injected capabilities: wall-clock time and task identity.
//!
//! The engine is otherwise pure; these two are the only places it would
//! reach for ambient state, so they are passed in instead. Tests supply
//! fixed implementations for deterministic output.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Source of the current wall-clock time.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Mints identities for newly generated task instances.
pub trait IdGenerator {
    fn next_id(&self) -> Uuid;
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Production id source. UUIDv7 keeps instance ids time-ordered.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidV7Generator;

impl IdGenerator for UuidV7Generator {
    fn next_id(&self) -> Uuid {
        Uuid::now_v7()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

impl<G: IdGenerator + ?Sized> IdGenerator for &G {
    fn next_id(&self) -> Uuid {
        (**self).next_id()
    }
}
