//! Commands the input thread sends to the host loop.

/// User request delivered to [`Application::run`](crate::app::Application::run)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCommand {
    /// Stop the loop and tear the list down
    Quit,
    /// Deliver a tick right away instead of waiting for the interval
    Refresh,
}
