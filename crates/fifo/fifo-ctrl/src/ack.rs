/// Write acknowledge register.
///
/// Holds `write_enable && !full` from the previous write tick, so the pulse
/// lands one cycle after the accepted write. A disabled generator keeps the
/// output at 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AckGenerator {
    enabled: bool,
    ack: bool,
}

impl AckGenerator {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ack: false,
        }
    }

    #[inline(always)]
    pub fn clock(&mut self, write_enable: bool, full: bool) {
        self.ack = self.enabled && write_enable && !full;
    }

    #[inline]
    pub fn clear(&mut self) {
        self.ack = false;
    }

    #[inline(always)]
    pub fn ack(&self) -> bool {
        self.ack
    }
}
