//! Status icons for CLI output

/// Status icons for different states
pub struct StatusIcon;

impl StatusIcon {
    /// Success icon (snapshot ready to use)
    pub const SUCCESS: &'static str = "✓";

    /// Pending icon (snapshot still materializing)
    pub const PENDING: &'static str = "⏳";

    /// Error icon
    pub const ERROR: &'static str = "✗";

    /// Unknown icon
    pub const UNKNOWN: &'static str = "?";

    /// Get status icon based on snapshot readiness
    pub fn get_ready_icon(ready: bool) -> &'static str {
        if ready {
            Self::SUCCESS
        } else {
            Self::PENDING
        }
    }

    /// Get status text based on snapshot readiness
    pub fn get_ready_text(ready: bool) -> &'static str {
        if ready {
            "Ready"
        } else {
            "Pending"
        }
    }
}
