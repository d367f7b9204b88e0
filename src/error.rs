use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

pub use anyhow::Context;

pub type Result<T> = std::result::Result<T, AppError>;

/// Pipeline stage a failure is attributed to in the final diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Resolve,
    FetchProducts,
    FetchSales,
    Project,
    Join,
    Write,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::Resolve => "resolve",
            Stage::FetchProducts => "fetch-products",
            Stage::FetchSales => "fetch-sales",
            Stage::Project => "project",
            Stage::Join => "join",
            Stage::Write => "write",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("request to {url} returned status {status}")]
    Status { url: String, status: StatusCode },
    #[error("could not parse response from {url}: {reason}")]
    Parse { url: String, reason: String },
    #[error("document {document} is missing field `{key}`")]
    Schema { document: String, key: String },
    #[error("no product id found in url {url}")]
    JoinKey { url: String },
    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<AppError>,
    },
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn parse<U: Into<String>, R: Into<String>>(url: U, reason: R) -> Self {
        AppError::Parse {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn message<M: Into<String>>(message: M) -> Self {
        AppError::Message(message.into())
    }

    pub fn schema<D: Into<String>, K: Into<String>>(document: D, key: K) -> Self {
        AppError::Schema {
            document: document.into(),
            key: key.into(),
        }
    }

    /// Attribute this error to a pipeline stage. Already-attributed errors keep their stage.
    pub fn in_stage(self, stage: Stage) -> Self {
        match self {
            AppError::Stage { .. } => self,
            other => AppError::Stage {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// The stage this error was attributed to, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            AppError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Unwrap the stage attribution and return the underlying error.
    pub fn root(&self) -> &AppError {
        match self {
            AppError::Stage { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Extension used at stage boundaries of the pipeline.
pub trait StageExt<T> {
    fn stage(self, stage: Stage) -> Result<T>;
}

impl<T> StageExt<T> for Result<T> {
    fn stage(self, stage: Stage) -> Result<T> {
        self.map_err(|err| err.in_stage(stage))
    }
}
