pub const DEFAULT_ADMIN_PIN: &str = "1234";

/// PIN check in front of the admin commands. This keeps casual users out of
/// the admin views; it does not protect the stored data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminGate {
    pin: String,
}

impl AdminGate {
    #[must_use]
    pub fn new(pin: impl Into<String>) -> Self {
        Self { pin: pin.into() }
    }

    pub fn verify(&self, attempt: &str) -> bool {
        attempt.trim() == self.pin
    }
}

impl Default for AdminGate {
    fn default() -> Self {
        Self::new(DEFAULT_ADMIN_PIN)
    }
}
