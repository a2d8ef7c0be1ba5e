//! Notification seam
//!
//! The engine records one event per successful operation; delivery is the
//! host's concern. Events are recorded strictly after commit, so a sink
//! never observes an event for an operation that failed.

/// Events the host must deliver or record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolEvent<Id> {
    NativeToTokenSwap {
        caller: Id,
        token_out: u128,
        native_in: u128,
    },
    TokenToNativeSwap {
        caller: Id,
        token_in: u128,
        native_out: u128,
    },
    LiquidityProvided {
        caller: Id,
        shares_minted: u128,
        native_in: u128,
        token_in: u128,
    },
    LiquidityRemoved {
        caller: Id,
        shares_burned: u128,
        token_out: u128,
        native_out: u128,
    },
}

pub trait EventSink<Id> {
    fn record(&mut self, event: PoolEvent<Id>);
}

/// Discards all events. Useful for hosts and tests that only care about
/// the accounting.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpSink;

impl<Id> EventSink<Id> for NoOpSink {
    fn record(&mut self, _event: PoolEvent<Id>) {}
}

/// Buffers events in order of emission.
#[derive(Debug, Clone)]
pub struct RecordingSink<Id> {
    pub events: Vec<PoolEvent<Id>>,
}

impl<Id> RecordingSink<Id> {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }
}

impl<Id> Default for RecordingSink<Id> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Id> EventSink<Id> for RecordingSink<Id> {
    fn record(&mut self, event: PoolEvent<Id>) {
        self.events.push(event);
    }
}
