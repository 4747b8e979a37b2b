/// What a task reported when it handed control back to the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Nothing to do: no session has been started.
    Idle,
    /// Suspended on a condition (a byte, an acknowledgment or a timeout).
    Waiting,
    /// Made progress and voluntarily gave up the rest of its turn.
    Yielded,
    /// The session reached its terminal result; further steps are no-ops.
    Complete,
}
