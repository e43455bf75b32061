//! Bang-bang (on/off) feedback.

use kinetic_common::state::KineticState;

use super::{FeedbackElement, FeedbackType, sign};

/// Full power toward the reference: `sign` of the selected error channel.
///
/// Outputs `1`, `-1`, or `0` when the error is exactly zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BangBangElement {
    feedback_type: FeedbackType,
}

impl BangBangElement {
    /// Bang-bang on the given channel.
    pub const fn new(feedback_type: FeedbackType) -> Self {
        Self { feedback_type }
    }

    /// Channel this element regulates.
    pub const fn feedback_type(&self) -> FeedbackType {
        self.feedback_type
    }
}

impl FeedbackElement for BangBangElement {
    #[inline]
    fn calculate(&mut self, error: KineticState) -> f64 {
        let (proportional, _) = self.feedback_type.select(error);
        sign(proportional)
    }
}
