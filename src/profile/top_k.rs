//! Bounded binary heap that keeps the K most frequent tokens of a profile.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A token paired with its frequency, ranked for the top-K heap.
#[derive(Debug)]
pub struct RankedToken<T, F> {
    pub frequency: F,
    pub token: T,
}

impl<T: Ord, F: PartialOrd> PartialEq for RankedToken<T, F> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl<T: Ord, F: PartialOrd> Eq for RankedToken<T, F> {}

impl<T: Ord, F: PartialOrd> PartialOrd for RankedToken<T, F> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: Ord, F: PartialOrd> Ord for RankedToken<T, F> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Better tokens compare as Less: higher frequency first, then ascending token.
        // BinaryHeap is a max-heap, so its top is always the worst token kept so far.
        // Frequencies are compared in their own type so large integer counts stay exact;
        // incomparable values (NaN) fall through to the token order.
        other
            .frequency
            .partial_cmp(&self.frequency)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.token.cmp(&other.token))
    }
}

/// Keeps the `capacity` best-ranked tokens seen so far.
#[derive(Debug)]
pub struct TopTokens<T, F> {
    capacity: usize,
    heap: BinaryHeap<RankedToken<T, F>>,
}

impl<T: Ord, F: PartialOrd> TopTokens<T, F> {
    pub fn new(capacity: usize) -> Self {
        TopTokens {
            capacity,
            heap: BinaryHeap::with_capacity(capacity.saturating_add(1)),
        }
    }

    pub fn add(&mut self, frequency: F, token: T) {
        if self.capacity == 0 { return; }
        let item = RankedToken { frequency, token };
        if self.heap.len() < self.capacity {
            self.heap.push(item);
        } else if let Some(worst) = self.heap.peek() {
            if item < *worst {
                self.heap.pop();
                self.heap.push(item);
            }
        }
    }

    /// Kept tokens, best first.
    pub fn into_sorted(self) -> Vec<(T, F)> {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|elem| (elem.token, elem.frequency))
            .collect()
    }
}
