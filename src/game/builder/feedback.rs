//! Preview Feedback
//!
//! What the ghost should look like this frame. The valid/invalid tint is
//! latched: once it flips it holds for `validity_lock_time` seconds, so a
//! preview sliding along a boundary does not strobe.

/// Ghost appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreviewFeedback {
    #[default]
    Hidden,
    /// Following the pointer, placeable
    Free,
    /// Held by an anchor, placeable
    Snapped,
    /// Visible but cannot be placed
    Blocked,
}

impl PreviewFeedback {
    pub fn is_visible(self) -> bool {
        self != PreviewFeedback::Hidden
    }
}

/// Debounced validity shown to the player.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidityLatch {
    shown: bool,
    since_change: f32,
    locked: bool,
}

impl ValidityLatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shown(&self) -> bool {
        self.shown
    }

    /// Feed the raw verdict; returns the validity to display.
    pub fn update(&mut self, visible: bool, valid: bool, dt: f32, lock_time: f32) -> bool {
        if !visible {
            self.reset();
            return false;
        }
        self.since_change += dt;
        if (!self.locked || self.since_change >= lock_time) && valid != self.shown {
            self.shown = valid;
            self.since_change = 0.0;
            self.locked = true;
        }
        self.shown
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn feedback(&self, visible: bool, snapped: bool) -> PreviewFeedback {
        match (visible, self.shown, snapped) {
            (false, _, _) => PreviewFeedback::Hidden,
            (true, false, _) => PreviewFeedback::Blocked,
            (true, true, true) => PreviewFeedback::Snapped,
            (true, true, false) => PreviewFeedback::Free,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_change_is_immediate() {
        let mut latch = ValidityLatch::new();
        assert!(latch.update(true, true, 0.016, 0.3));
        assert_eq!(latch.feedback(true, false), PreviewFeedback::Free);
        assert_eq!(latch.feedback(true, true), PreviewFeedback::Snapped);
    }

    #[test]
    fn test_flip_is_held_for_lock_time() {
        let mut latch = ValidityLatch::new();
        latch.update(true, true, 0.016, 0.3);

        // Blips inside the lock window are ignored
        assert!(latch.update(true, false, 0.1, 0.3));
        assert!(!latch.update(true, false, 0.25, 0.3));
        assert_eq!(latch.feedback(true, false), PreviewFeedback::Blocked);
    }

    #[test]
    fn test_hidden_resets() {
        let mut latch = ValidityLatch::new();
        latch.update(true, true, 0.016, 0.3);
        assert!(!latch.update(false, true, 0.016, 0.3));
        assert_eq!(latch.feedback(false, true), PreviewFeedback::Hidden);
        // Unlocked again, so the next verdict shows at once
        assert!(latch.update(true, true, 0.016, 0.3));
    }
}
