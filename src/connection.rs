use crate::resp::RespValue;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_CLIENT_ID: AtomicU64 = AtomicU64::new(1);

/// Per-client session state.
#[derive(Debug)]
pub struct ClientState {
    pub id: u64,
    pub db_index: usize,
    pub should_close: bool,

    // Transaction state
    pub in_multi: bool,
    pub multi_queue: Vec<(String, Vec<RespValue>)>,
    pub multi_error: bool,
}

impl ClientState {
    pub fn new() -> Self {
        ClientState {
            id: NEXT_CLIENT_ID.fetch_add(1, Ordering::Relaxed),
            db_index: 0,
            should_close: false,
            in_multi: false,
            multi_queue: Vec::new(),
            multi_error: false,
        }
    }

    /// Leave MULTI mode and drop anything queued.
    pub fn reset_transaction(&mut self) {
        self.in_multi = false;
        self.multi_queue.clear();
        self.multi_error = false;
    }
}

impl Default for ClientState {
    fn default() -> Self {
        Self::new()
    }
}
