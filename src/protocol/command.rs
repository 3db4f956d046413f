use std::str::FromStr;

use super::{
    error::{CommandError, InvalidCommand},
    verb::Verb,
    PARAM_SEPARATOR, REQUEST_SEPARATOR,
};

/// One tokenized request line. Only constructible through [`Command::parse`],
/// so a `Command` always has a request id and a verb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    request_id: String,
    verb: String,
    params: Option<String>,
}

impl Command {
    /// Splits `line` into request id, verb and the raw parameter blob.
    ///
    /// Purely syntactic: the verb is not looked up and parameters are left
    /// unparsed until the operation that needs them asks.
    pub fn parse(line: &str) -> Result<Command, InvalidCommand> {
        let trimmed = line.trim();
        let mut fields = trimmed.split(REQUEST_SEPARATOR);

        let request_id = fields.next().filter(|s| !s.is_empty());
        let verb = fields.next().filter(|s| !s.is_empty());
        let params = fields.next().filter(|s| !s.is_empty());

        match (request_id, verb) {
            (Some(request_id), Some(verb)) => Ok(Command {
                request_id: request_id.to_string(),
                verb: verb.to_string(),
                params: params.map(str::to_string),
            }),
            (request_id, _) => Err(InvalidCommand {
                line: trimmed.to_string(),
                request_id: request_id.map(str::to_string),
            }),
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// The verb token exactly as received.
    pub fn verb_token(&self) -> &str {
        &self.verb
    }

    pub fn verb(&self) -> Option<Verb> {
        Verb::from_code(&self.verb)
    }

    pub fn params(&self) -> Option<&str> {
        self.params.as_deref()
    }

    pub fn decimal_param(&self) -> Result<f64, CommandError> {
        parse_decimal(self.params().ok_or(CommandError::InvalidParameters)?)
    }

    pub fn integer_param<T: FromStr>(&self) -> Result<T, CommandError> {
        parse_integer(self.params().ok_or(CommandError::InvalidParameters)?)
    }

    /// First two non-empty fields of the parameter blob. Extra fields are ignored.
    pub fn param_pair(&self) -> Result<(&str, &str), CommandError> {
        let blob = self.params().ok_or(CommandError::InvalidParameters)?;
        let mut fields = blob.split(PARAM_SEPARATOR).filter(|s| !s.is_empty());
        match (fields.next(), fields.next()) {
            (Some(first), Some(second)) => Ok((first, second)),
            _ => Err(CommandError::InvalidParameters),
        }
    }
}

/// Parses a finite decimal. Non-numeric text is rejected rather than read as zero.
pub fn parse_decimal(raw: &str) -> Result<f64, CommandError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or(CommandError::InvalidParameters)
}

pub fn parse_integer<T: FromStr>(raw: &str) -> Result<T, CommandError> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| CommandError::InvalidParameters)
}
