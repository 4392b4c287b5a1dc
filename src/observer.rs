// Thermo - Temperature monitoring pipeline
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Sensor fan-out to registered observers.
//!
//! A [`Sensor`] keeps its current reading and a registry of observers in
//! registration order. [`Sensor::set_value`] stores the reading, then calls
//! every observer synchronously before returning.

use crate::alert::AlertSink;
use crate::chain::ChainLink;
use crate::error::{RegistryError, Result, ThermoError};
use crate::history::{History, Window, HISTORY_CAPACITY};
use crate::reading::Reading;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Receives every reading a sensor publishes.
pub trait Observer: Send + Sync {
    /// Observer name, for logs.
    fn name(&self) -> &str;

    /// Handle one reading.
    fn update(&self, reading: &Reading) -> Result<()>;
}

static NEXT_SUBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// Handle to one registration, issued by [`Sensor::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId {
    subject: u64,
    seq: u64,
}

impl ObserverId {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.subject, self.seq)
    }
}

/// Observable temperature sensor.
pub struct Sensor {
    id: u64,
    name: String,
    value: Option<Reading>,
    observers: Vec<(ObserverId, Arc<dyn Observer>)>,
    next_seq: u64,
}

impl Sensor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: NEXT_SUBJECT_ID.fetch_add(1, Ordering::Relaxed),
            name: name.into(),
            value: None,
            observers: Vec::new(),
            next_seq: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last reading set, if any.
    pub fn value(&self) -> Option<&Reading> {
        self.value.as_ref()
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Append an observer to the registry.
    pub fn register(&mut self, observer: Arc<dyn Observer>) -> ObserverId {
        let id = ObserverId {
            subject: self.id,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        tracing::debug!(
            sensor = %self.name,
            observer = observer.name(),
            %id,
            "observer registered"
        );
        self.observers.push((id, observer));
        id
    }

    /// Remove a registration.
    ///
    /// Fails with [`RegistryError::InvalidObserver`] for an id issued by
    /// another sensor and [`RegistryError::ObserverNotFound`] when the id is
    /// not registered here.
    pub fn unregister(&mut self, id: ObserverId) -> Result<Arc<dyn Observer>> {
        if id.subject != self.id {
            return Err(RegistryError::InvalidObserver {
                id: id.seq,
                owner: id.subject,
                subject: self.id,
            }
            .into());
        }
        let pos = self
            .observers
            .iter()
            .position(|(registered, _)| *registered == id)
            .ok_or(RegistryError::ObserverNotFound { id: id.seq })?;
        let (_, observer) = self.observers.remove(pos);
        tracing::debug!(sensor = %self.name, observer = observer.name(), %id, "observer removed");
        Ok(observer)
    }

    /// Store `reading` and notify every observer in registration order.
    ///
    /// A failing observer does not stop the others. The first failure is
    /// returned once all observers ran.
    pub fn set_value(&mut self, reading: Reading) -> Result<()> {
        self.value = Some(reading);
        self.notify(&reading)
    }

    fn notify(&self, reading: &Reading) -> Result<()> {
        let mut first = None;
        let mut failed = 0;

        for (id, observer) in &self.observers {
            if let Err(e) = observer.update(reading) {
                tracing::debug!(observer = observer.name(), %id, error = %e, "observer failed");
                failed += 1;
                first.get_or_insert(e);
            }
        }

        match first {
            None => Ok(()),
            Some(first) => Err(ThermoError::Notify {
                failed,
                total: self.observers.len(),
                first: Box::new(first),
            }),
        }
    }
}

impl fmt::Debug for Sensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sensor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("value", &self.value)
            .field("observers", &self.observers.len())
            .finish()
    }
}

/// Observer that keeps a bounded history and runs it through a check chain.
pub struct Operator {
    name: String,
    history: Mutex<History>,
    chain: Box<dyn ChainLink>,
    sink: Arc<dyn AlertSink>,
}

impl Operator {
    pub fn new(
        name: impl Into<String>,
        chain: Box<dyn ChainLink>,
        sink: Arc<dyn AlertSink>,
    ) -> Self {
        Self {
            name: name.into(),
            history: Mutex::new(History::default()),
            chain,
            sink,
        }
    }

    /// Seed the operator with existing readings.
    ///
    /// Capacity is raised to [`HISTORY_CAPACITY`] when smaller, since the
    /// chain reads that many values back.
    pub fn with_history(mut self, history: History) -> Self {
        let history = if history.capacity() < HISTORY_CAPACITY {
            history.resized(HISTORY_CAPACITY)
        } else {
            history
        };
        self.history = Mutex::new(history);
        self
    }

    /// Copy of the current history.
    pub fn history(&self) -> History {
        self.lock_history().clone()
    }

    /// Current window, oldest to newest.
    pub fn window(&self) -> Window {
        self.lock_history().window()
    }

    pub fn chain(&self) -> &dyn ChainLink {
        self.chain.as_ref()
    }

    fn lock_history(&self) -> MutexGuard<'_, History> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Observer for Operator {
    fn name(&self) -> &str {
        &self.name
    }

    fn update(&self, reading: &Reading) -> Result<()> {
        let window = {
            let mut history = self.lock_history();
            history.push(*reading);
            history.window()
        };

        tracing::trace!(operator = %self.name, len = window.len(), "running chain");
        self.chain.handle(&window, self.sink.as_ref())?;
        Ok(())
    }
}

impl fmt::Debug for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operator")
            .field("name", &self.name)
            .field("history", &self.lock_history().len())
            .field("chain", &self.chain)
            .finish()
    }
}
