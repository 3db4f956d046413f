pub mod config;
pub mod sleep;
pub mod state;

use config::DispatcherConfig;
use sleep::DeferredSleep;
use state::CommandState;

use tracing::{debug, info};

use crate::{
    axis::position::Position,
    movement::{progress::ProgressReporter, MovementBackend},
    protocol::{
        command::{parse_decimal, parse_integer, Command},
        error::{CommandError, ExecutionResult, InvalidCommand, SUCCESS},
        parse_command,
        verb::Verb,
    },
};

/// Turns validated commands into backend calls and result codes.
///
/// Owns the movement backend (and through it the position state). One command
/// is handled at a time: `accept`, `execute`, deliver the result, then
/// `post_return` and `reset` before the next line.
pub struct CommandDispatcher {
    backend: Box<dyn MovementBackend>,
    config: DispatcherConfig,
    state: CommandState,
    deferred_sleep: DeferredSleep,
    last_result: Option<ExecutionResult>,
}

impl CommandDispatcher {
    pub fn new(backend: Box<dyn MovementBackend>, config: DispatcherConfig) -> Self {
        info!("Command dispatcher using {} backend", backend.name());
        Self {
            backend,
            config,
            state: CommandState::Idle,
            deferred_sleep: DeferredSleep::default(),
            last_result: None,
        }
    }

    pub fn state(&self) -> CommandState {
        self.state
    }

    pub fn position(&self) -> Position {
        self.backend.position()
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn pending_sleep(&self) -> Option<std::time::Duration> {
        self.deferred_sleep.pending()
    }

    pub fn last_result(&self) -> Option<ExecutionResult> {
        self.last_result
    }

    /// Tokenizes one request line. An invalid line leaves the dispatcher idle.
    pub fn parse(&mut self, line: &str) -> Result<Command, InvalidCommand> {
        match parse_command(line) {
            Ok(command) => {
                debug!(
                    "Parsed request {}: {} {:?}",
                    command.request_id(),
                    command.verb_token(),
                    command.params()
                );
                self.state = CommandState::Parsed;
                Ok(command)
            }
            Err(invalid) => {
                debug!("Rejected request line {:?}", invalid.line);
                self.state = CommandState::Idle;
                Err(invalid)
            }
        }
    }

    /// Admits a parsed command for execution once it carries both an id and a verb.
    pub fn validate(&mut self, command: &Command) -> Result<(), InvalidCommand> {
        if self.state != CommandState::Parsed
            || command.request_id().is_empty()
            || command.verb_token().is_empty()
        {
            self.state = CommandState::Idle;
            return Err(InvalidCommand {
                line: format!("{}|{}", command.request_id(), command.verb_token()),
                request_id: Some(command.request_id().to_string()),
            });
        }
        self.state = CommandState::Validated;
        Ok(())
    }

    /// `parse` followed by `validate`. A rejected line must not be executed.
    pub fn accept(&mut self, line: &str) -> Result<Command, InvalidCommand> {
        let command = self.parse(line)?;
        self.validate(&command)?;
        Ok(command)
    }

    pub async fn execute(
        &mut self,
        command: &Command,
        progress: &mut dyn ProgressReporter,
    ) -> ExecutionResult {
        self.state = CommandState::Dispatching;
        debug!("exec: {}", command.verb_token());

        let result = match command.verb() {
            Some(verb) => self.dispatch(verb, command, progress).await,
            None => Err(CommandError::InvalidCommand),
        };

        self.state = CommandState::Completed;
        self.last_result = Some(result);
        result
    }

    async fn dispatch(
        &mut self,
        verb: Verb,
        command: &Command,
        progress: &mut dyn ProgressReporter,
    ) -> ExecutionResult {
        match verb {
            Verb::Stop => {
                self.backend.stop_all().await;
                Ok(SUCCESS)
            }
            Verb::Sleep => {
                match command.integer_param::<i64>() {
                    Ok(seconds) => self.deferred_sleep.arm(seconds),
                    Err(_) => self.deferred_sleep.clear(),
                }
                Ok(SUCCESS)
            }
            Verb::MoveXy => {
                let (x, y) = command.param_pair()?;
                let (x, y) = (parse_decimal(x)?, parse_decimal(y)?);
                self.backend.move_to_xy(x, y, progress).await
            }
            Verb::MoveHeight => {
                let z = command.decimal_param()?;
                self.backend.move_to_height(z, progress).await
            }
            Verb::MoveMaxHeight => self.backend.move_to_max_height().await,
            Verb::TurnHorizontal => {
                let angle = command.decimal_param()?;
                self.backend.turn_horizontal(angle).await
            }
            Verb::TurnVertical => {
                let angle = command.decimal_param()?;
                self.backend.turn_vertical(angle).await
            }
            Verb::Pump => {
                let (number, amount) = command.param_pair()?;
                let number: u8 = parse_integer(number)?;
                let amount = parse_decimal(amount)?;
                self.run_pump(number, amount).await
            }
        }
    }

    async fn run_pump(&mut self, pump: u8, litres: f64) -> ExecutionResult {
        info!("Sets pump {} to provide {} L", pump, litres);
        tokio::time::sleep(self.config.pump_run()).await;
        Ok(SUCCESS)
    }

    /// Serves a pending deferred sleep. Call only once the result of the
    /// current command has been handed to the caller.
    pub async fn post_return(&mut self) {
        if let Some(duration) = self.deferred_sleep.take() {
            info!("Sleeping {} seconds", duration.as_secs());
            tokio::time::sleep(duration).await;
            info!("Ready again");
        }
    }

    /// Drops everything scoped to the current command.
    pub fn reset(&mut self) {
        self.state = CommandState::Idle;
        self.deferred_sleep.clear();
        self.last_result = None;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        movement::{
            config::{IncrementConfig, SimulatedConfig},
            progress::{CollectProgress, NoProgress},
            simulated::SimulatedBackend,
        },
        protocol::error::result_code,
    };

    fn dispatcher() -> CommandDispatcher {
        CommandDispatcher::new(
            Box::new(SimulatedBackend::default()),
            DispatcherConfig::default(),
        )
    }

    async fn run(dispatcher: &mut CommandDispatcher, line: &str) -> i32 {
        let result = match dispatcher.accept(line) {
            Ok(command) => result_code(&dispatcher.execute(&command, &mut NoProgress).await),
            Err(_) => CommandError::InvalidCommand.code(),
        };
        dispatcher.post_return().await;
        dispatcher.reset();
        result
    }

    #[tokio::test(start_paused = true)]
    async fn test_move_xy_from_origin() {
        let mut d = dispatcher();
        assert_eq!(run(&mut d, "42|MXY|3.0,4.0").await, 0);
        assert_eq!(d.position().x, 3.0);
        assert_eq!(d.position().y, 4.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_move_is_noop() {
        let mut d = dispatcher();
        run(&mut d, "1|MXY|3.0,4.0").await;

        let command = d.accept("2|MXY|3.0,4.0").unwrap();
        let mut progress = CollectProgress::default();
        assert_eq!(d.execute(&command, &mut progress).await, Ok(SUCCESS));
        assert!(progress.snapshots.is_empty());
        assert_eq!((d.position().x, d.position().y), (3.0, 4.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pump_leaves_position_alone() {
        let mut d = dispatcher();
        let start = tokio::time::Instant::now();
        assert_eq!(run(&mut d, "7|PMP|2,1.5").await, 0);
        assert!(start.elapsed() >= Duration::from_millis(500));
        assert_eq!(d.position(), Position::origin());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_verb() {
        let mut d = dispatcher();
        assert_eq!(run(&mut d, "9|XYZ|").await, CommandError::InvalidCommand.code());
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_parameters() {
        let mut d = dispatcher();
        let invalid = CommandError::InvalidParameters.code();
        for line in [
            "3|MHT|",
            "3|MHT",
            "3|THZ|",
            "3|TVT|",
            "3|MXY|",
            "3|MXY|1.0",
            "3|PMP|2",
        ] {
            assert_eq!(run(&mut d, line).await, invalid, "{}", line);
        }
        assert_eq!(d.position(), Position::origin());
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_numeric_parameters() {
        let mut d = dispatcher();
        let invalid = CommandError::InvalidParameters.code();
        for line in ["3|MHT|high", "3|MXY|1.0,abc", "3|PMP|one,1.5", "3|PMP|-1,1.5"] {
            assert_eq!(run(&mut d, line).await, invalid, "{}", line);
        }
        assert_eq!(d.position(), Position::origin());
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_line_is_never_dispatched() {
        let mut d = dispatcher();
        assert!(d.accept("|MXY|3,4").is_err());
        assert_eq!(d.state(), CommandState::Idle);
        assert!(d.accept("42").is_err());
        assert_eq!(d.state(), CommandState::Idle);
        assert_eq!(d.position(), Position::origin());
    }

    #[test]
    fn test_validate_requires_a_fresh_parse() {
        let mut d = dispatcher();
        let command = d.parse("4|MHT|2").unwrap();
        d.reset();

        let invalid = d.validate(&command).unwrap_err();
        assert_eq!(invalid.request_id.as_deref(), Some("4"));
        assert_eq!(d.state(), CommandState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_state_transitions() {
        let mut d = dispatcher();
        assert_eq!(d.state(), CommandState::Idle);

        let command = d.parse("1|STP|").unwrap();
        assert_eq!(d.state(), CommandState::Parsed);
        d.validate(&command).unwrap();
        assert_eq!(d.state(), CommandState::Validated);

        d.execute(&command, &mut NoProgress).await.unwrap();
        assert_eq!(d.state(), CommandState::Completed);
        assert_eq!(d.last_result(), Some(Ok(SUCCESS)));

        d.reset();
        assert_eq!(d.state(), CommandState::Idle);
        assert_eq!(d.last_result(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleep_is_deferred_until_post_return() {
        let mut d = dispatcher();
        let start = tokio::time::Instant::now();

        let command = d.accept("5|SLP|3").unwrap();
        assert_eq!(d.execute(&command, &mut NoProgress).await, Ok(SUCCESS));
        assert!(start.elapsed() < Duration::from_secs(1));
        assert_eq!(d.pending_sleep(), Some(Duration::from_secs(3)));

        d.post_return().await;
        assert!(start.elapsed() >= Duration::from_secs(3));
        assert_eq!(d.pending_sleep(), None);

        // consumed exactly once
        let before = tokio::time::Instant::now();
        d.post_return().await;
        assert_eq!(before.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleep_always_succeeds() {
        let mut d = dispatcher();
        for line in ["5|SLP|0", "5|SLP|-4", "5|SLP|soon", "5|SLP"] {
            let command = d.accept(line).unwrap();
            assert_eq!(d.execute(&command, &mut NoProgress).await, Ok(SUCCESS));
            assert_eq!(d.pending_sleep(), None, "{}", line);
            d.reset();
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_height_progress_reaches_caller() {
        let mut d = CommandDispatcher::new(
            Box::new(SimulatedBackend::new(SimulatedConfig {
                z: IncrementConfig::new(5.0, 10.0),
                ..SimulatedConfig::default()
            })),
            DispatcherConfig::default(),
        );
        let command = d.accept("8|MHT|12").unwrap();
        let mut progress = CollectProgress::default();

        assert_eq!(d.execute(&command, &mut progress).await, Ok(SUCCESS));
        assert_eq!(progress.snapshots, ["5.00", "10.00", "12.00"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_max_height_returns_measurement() {
        let mut d = dispatcher();
        assert_eq!(run(&mut d, "4|MMH|").await, 15);
        assert_eq!(d.position().z, 15.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_turns_and_stop() {
        let mut d = dispatcher();
        assert_eq!(run(&mut d, "1|THZ|90").await, 0);
        assert_eq!(run(&mut d, "2|TVT|45.5").await, 0);
        assert_eq!(run(&mut d, "3|STP").await, 0);
        assert_eq!(d.position().pan, 90.0);
        assert_eq!(d.position().tilt, 45.5);
    }
}
