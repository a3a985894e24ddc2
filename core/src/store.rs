//! Observable per-resource state and the settlement discipline shared by all
//! stores.
//!
//! # Design
//! State lives in a `tokio::sync::watch` channel so views can either snapshot
//! it or subscribe to changes. Every invocation of an action bumps a
//! generation counter when it starts; when it settles, its outcome is applied
//! only if no newer invocation has started since. The check and the write
//! happen under one lock, so a superseded call can never overwrite the
//! outcome of a newer one.

use std::sync::{Mutex, PoisonError};

use tokio::sync::watch;
use tracing::debug;

use crate::error::NormalizedError;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PER_PAGE: u32 = 12;

/// The state a store exposes for display.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchState<T> {
    pub data: Option<T>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub loading: bool,
    pub error: Option<NormalizedError>,
    /// Transient success indicator, cleared when the next action starts.
    pub message: Option<String>,
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self {
            data: None,
            total: 0,
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
            loading: false,
            error: None,
            message: None,
        }
    }
}

/// Marker for one in-flight invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug)]
pub struct FetchStore<T> {
    name: &'static str,
    // Held across every state write.
    generation: Mutex<u64>,
    state: watch::Sender<FetchState<T>>,
}

impl<T: Clone> FetchStore<T> {
    pub fn new(name: &'static str) -> Self {
        let (state, _) = watch::channel(FetchState::default());
        Self {
            name,
            generation: Mutex::new(0),
            state,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn snapshot(&self) -> FetchState<T> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState<T>> {
        self.state.subscribe()
    }

    /// Start an invocation: supersede any pending one, raise `loading`, clear
    /// `error` and `message`.
    pub fn begin(&self) -> Ticket {
        let mut generation = self.generation.lock().unwrap_or_else(PoisonError::into_inner);
        *generation += 1;
        self.state.send_modify(|state| {
            state.loading = true;
            state.error = None;
            state.message = None;
        });
        Ticket(*generation)
    }

    /// Apply the outcome of `ticket`'s invocation and drop `loading`.
    ///
    /// Returns false, leaving state untouched, when a newer invocation has
    /// started since `ticket` was issued.
    pub fn settle(&self, ticket: Ticket, apply: impl FnOnce(&mut FetchState<T>)) -> bool {
        let generation = self.generation.lock().unwrap_or_else(PoisonError::into_inner);
        if *generation != ticket.0 {
            debug!(
                store = self.name,
                generation = ticket.0,
                latest = *generation,
                "discarding superseded settlement"
            );
            return false;
        }
        self.state.send_modify(|state| {
            apply(state);
            state.loading = false;
        });
        true
    }
}
