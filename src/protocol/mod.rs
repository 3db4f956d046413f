pub mod command;
pub mod error;
pub mod response;
pub mod verb;

use command::Command;
use error::InvalidCommand;

/// Separates request id, verb and parameter blob.
pub const REQUEST_SEPARATOR: char = '|';
/// Separates the values inside a parameter blob.
pub const PARAM_SEPARATOR: char = ',';

pub fn parse_command(line: &str) -> Result<Command, InvalidCommand> {
    Command::parse(line)
}
