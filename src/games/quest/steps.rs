//! Sequential delayed steps.
//!
//! Each pending step waits for its delay, counted from the moment the step
//! before it fired. The queue belongs to whichever mode scheduled the steps,
//! so tearing that mode down drops every pending step with it.

use std::collections::VecDeque;

#[derive(Clone, Debug)]
struct Pending<S> {
    remaining_ms: u32,
    step: S,
}

#[derive(Clone, Debug)]
pub struct StepQueue<S> {
    pending: VecDeque<Pending<S>>,
}

impl<S> StepQueue<S> {
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
        }
    }

    /// Run `step` `delay_ms` after the previously queued step fires
    /// (or after now, if the queue is empty).
    pub fn push(&mut self, delay_ms: u32, step: S) {
        self.pending.push_back(Pending {
            remaining_ms: delay_ms,
            step,
        });
    }

    /// Advance by `elapsed_ms`, returning fired steps in order. Time left
    /// over after one step fires carries into the next.
    pub fn advance(&mut self, elapsed_ms: u32) -> Vec<S> {
        let mut budget = elapsed_ms;
        let mut fired = Vec::new();
        while let Some(head) = self.pending.front_mut() {
            if head.remaining_ms > budget {
                head.remaining_ms -= budget;
                break;
            }
            budget -= head.remaining_ms;
            if let Some(done) = self.pending.pop_front() {
                fired.push(done.step);
            }
        }
        fired
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

impl<S> Default for StepQueue<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_fires_early() {
        let mut q = StepQueue::new();
        q.push(100, 'a');
        assert!(q.advance(99).is_empty());
        assert_eq!(q.advance(1), vec!['a']);
        assert!(q.advance(1000).is_empty());
    }

    #[test]
    fn delays_are_relative_to_previous_step() {
        let mut q = StepQueue::new();
        q.push(100, 'a');
        q.push(50, 'b');
        assert_eq!(q.advance(120), vec!['a']);
        assert_eq!(q.advance(30), vec!['b']);
    }

    #[test]
    fn one_large_advance_fires_several_in_order() {
        let mut q = StepQueue::new();
        q.push(10, 1);
        q.push(10, 2);
        q.push(10, 3);
        assert_eq!(q.advance(25), vec![1, 2]);
        assert_eq!(q.advance(5), vec![3]);
    }

    #[test]
    fn zero_delay_fires_on_next_advance() {
        let mut q = StepQueue::new();
        q.push(0, 'x');
        assert_eq!(q.advance(0), vec!['x']);
    }

    #[test]
    fn clear_cancels_pending_steps() {
        let mut q = StepQueue::new();
        q.push(10, 'a');
        q.push(10, 'b');
        q.clear();
        assert!(q.advance(1000).is_empty());
    }
}
