/// Frame stamp for the frame-synchronous selection model.
///
/// Exactly one selection pass runs per frame; nothing inside a pass is
/// cancellable, so the stamp is all the runtime a pass needs.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Fixed delta time (seconds).
    pub dt_s: f64,
}

impl Frame {
    pub fn new(index: u64, dt_s: f64) -> Self {
        Self { index, dt_s }
    }

    /// Frame zero at 60 Hz.
    pub fn first() -> Self {
        Self::new(0, 1.0 / 60.0)
    }

    pub fn next(self) -> Self {
        Self::new(self.index + 1, self.dt_s)
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::first()
    }
}

#[cfg(test)]
mod tests {
    use super::Frame;

    #[test]
    fn frames_compare_by_value() {
        let a = Frame::new(10, 0.5);
        assert_eq!(a, Frame::new(10, 0.5));
        assert_ne!(a, Frame::new(11, 0.5));
    }

    #[test]
    fn next_advances_index() {
        let f1 = Frame::first().next();
        assert_eq!(f1.index, 1);
        assert_eq!(f1.dt_s, 1.0 / 60.0);
    }
}
