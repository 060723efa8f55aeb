/// User-facing switches that change how zone assignment treats a window.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ZoneSettings {
    disable_round_corners: bool,
}

impl ZoneSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_disable_round_corners(mut self, disable: bool) -> Self {
        self.disable_round_corners = disable;
        self
    }

    /// Whether windows lose their rounded corners when snapped into a zone.
    pub fn disable_round_corners(&self) -> bool {
        self.disable_round_corners
    }

    pub fn set_disable_round_corners(&mut self, disable: bool) {
        self.disable_round_corners = disable;
    }
}
