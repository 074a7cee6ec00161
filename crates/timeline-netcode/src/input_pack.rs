//! Input pack wire shape (spec.md §6): a batched, ordered set of
//! timestamped inputs delivered over an unreliable channel. Re-applying a
//! pack is idempotent - each entry just overwrites (or is overwritten by)
//! whatever already sits at its time slot.

use timeline_core::GameTime;

/// `times` must be strictly decreasing (newest first), matching `Track`'s
/// native order.
#[derive(Debug, Clone)]
pub struct InputPack<I> {
    pub inputs: Vec<I>,
    pub times: Vec<GameTime>,
}

impl<I> InputPack<I> {
    pub fn new(inputs: Vec<I>, times: Vec<GameTime>) -> Self {
        debug_assert_eq!(
            inputs.len(),
            times.len(),
            "input pack inputs/times length mismatch"
        );
        Self { inputs, times }
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_len_matches_inputs() {
        let pack = InputPack::new(vec![1, 2, 3], vec![0.3, 0.2, 0.1]);
        assert_eq!(pack.len(), 3);
        assert!(!pack.is_empty());
    }

    #[test]
    fn empty_pack() {
        let pack: InputPack<i32> = InputPack::new(vec![], vec![]);
        assert!(pack.is_empty());
    }
}
