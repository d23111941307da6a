use crate::domain::entity::Position;

/// Source of position fixes
pub trait LocationProvider {
    /// Drain pending input from the receiver
    fn update(&mut self) {}

    /// Current position, `None` without a fix
    fn position(&self) -> Option<Position>;

    /// Ground speed in km/h
    fn speed(&self) -> f32;

    fn has_fix(&self) -> bool {
        self.position().is_some()
    }
}
