//! Live-value cache shared between the telemetry reader and evaluators.
//!
//! The reader holds the write lock once per telemetry record; evaluators
//! take a short read lock per lookup. Reads within one evaluation are not
//! guaranteed to observe the same record.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use gizmo_core::ValueRef;
use parking_lot::RwLock;

/// Read-only source of live numeric values.
pub trait ValueLookup {
    fn lookup(&self, value: &ValueRef) -> Option<f64>;
}

impl<T: ValueLookup + ?Sized> ValueLookup for &T {
    fn lookup(&self, value: &ValueRef) -> Option<f64> {
        (**self).lookup(value)
    }
}

impl ValueLookup for HashMap<ValueRef, f64> {
    fn lookup(&self, value: &ValueRef) -> Option<f64> {
        self.get(value).copied()
    }
}

impl ValueLookup for BTreeMap<ValueRef, f64> {
    fn lookup(&self, value: &ValueRef) -> Option<f64> {
        self.get(value).copied()
    }
}

/// One observed value.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub source: ValueRef,
    pub value: f64,
}

impl Reading {
    pub fn new(source: ValueRef, value: f64) -> Self {
        Reading { source, value }
    }
}

/// Most recent value per device property. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct LiveValueCache {
    values: Arc<RwLock<HashMap<ValueRef, f64>>>,
}

impl LiveValueCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, source: ValueRef, value: f64) {
        self.values.write().insert(source, value);
    }

    /// Stores every reading of one record under a single write lock.
    pub fn apply(&self, readings: &[Reading]) {
        let mut values = self.values.write();
        for r in readings {
            values.insert(r.source.clone(), r.value);
        }
    }

    pub fn get(&self, source: &ValueRef) -> Option<f64> {
        self.values.read().get(source).copied()
    }

    /// A point-in-time copy, ordered for display.
    pub fn snapshot(&self) -> BTreeMap<ValueRef, f64> {
        self.values
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }
}

impl ValueLookup for LiveValueCache {
    fn lookup(&self, value: &ValueRef) -> Option<f64> {
        self.get(value)
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
