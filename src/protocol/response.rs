use super::{
    error::{result_code, ExecutionResult},
    REQUEST_SEPARATOR,
};

pub const PROGRESS_TAG: &str = "PRG";
pub const RESULT_TAG: &str = "RES";

/// A line sent back over the command link.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Progress { id: String, snapshot: String },
    Result { id: String, code: i32 },
}

impl Response {
    pub fn progress(id: &str, snapshot: &str) -> Self {
        Self::Progress {
            id: id.to_string(),
            snapshot: snapshot.to_string(),
        }
    }

    pub fn result(id: &str, result: &ExecutionResult) -> Self {
        Self::Result {
            id: id.to_string(),
            code: result_code(result),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Response::Progress { id, .. } => id,
            Response::Result { id, .. } => id,
        }
    }
}

impl std::fmt::Display for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sep = REQUEST_SEPARATOR;
        match self {
            Response::Progress { id, snapshot } => {
                write!(f, "{id}{sep}{PROGRESS_TAG}{sep}{snapshot}")
            }
            Response::Result { id, code } => write!(f, "{id}{sep}{RESULT_TAG}{sep}{code}"),
        }
    }
}
