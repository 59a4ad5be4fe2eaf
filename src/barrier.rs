//! A reusable N-party rendezvous with leader election.
//!
//! `wait()` blocks until all parties have arrived. Exactly one caller per
//! cycle (the last to arrive) gets `true` back and is the leader for any
//! serial work that must happen while the group is lined up, such as the
//! cross-worker prefix sum between the counting and scatter phases.

use std::sync::{Condvar, Mutex};

pub struct ThreadBarrier {
    state: Mutex<BarrierState>,
    cvar: Condvar,
    parties: usize,
}

struct BarrierState {
    arrived: usize,
    generation: u64,
}

impl ThreadBarrier {
    pub fn new(parties: usize) -> Self {
        assert!(parties > 0, "a barrier needs at least one party");

        Self {
            state: Mutex::new(BarrierState {
                arrived: 0,
                generation: 0,
            }),
            cvar: Condvar::new(),
            parties,
        }
    }

    /// Block until all parties arrive. Returns `true` for the leader of
    /// this cycle, `false` for everyone else.
    pub fn wait(&self) -> bool {
        let mut state = self.state.lock().unwrap();
        state.arrived += 1;

        if state.arrived == self.parties {
            state.arrived = 0;
            state.generation = state.generation.wrapping_add(1);
            self.cvar.notify_all();

            return true;
        }

        let generation = state.generation;
        while state.generation == generation {
            state = self.cvar.wait(state).unwrap();
        }

        false
    }
}
