/// Lifecycle of the command currently held by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommandState {
    #[default]
    Idle,
    Parsed,
    Validated,
    Dispatching,
    Completed,
}
