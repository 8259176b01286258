use std::collections::BTreeSet;

/// Sponsor-account nonce bookkeeping.
///
/// Owned by the dispatch worker alone; not synchronized. The counter only
/// moves forward, and a value is never handed out while it is still in flight.
#[derive(Debug)]
pub struct NonceAllocator {
    next: u64,
    in_flight: BTreeSet<u64>,
}

impl NonceAllocator {
    /// Start from the chain's pending nonce for the sponsor
    pub fn new(initial: u64) -> Self {
        Self {
            next: initial,
            in_flight: BTreeSet::new(),
        }
    }

    /// Hand out the current counter and mark it in flight
    pub fn acquire(&mut self) -> u64 {
        let nonce = self.next;
        self.in_flight.insert(nonce);
        self.next += 1;
        while self.in_flight.contains(&self.next) {
            self.next += 1;
        }
        nonce
    }

    /// Mark `nonce` as settled, whether it confirmed or failed
    pub fn release(&mut self, nonce: u64) {
        self.in_flight.remove(&nonce);
    }

    /// Value the next `acquire` will return
    pub fn next(&self) -> u64 {
        self.next
    }

    pub fn in_flight_len(&self) -> usize {
        self.in_flight.len()
    }
}
