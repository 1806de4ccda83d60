use std::path::PathBuf;

/// Broad failure category, used by callers that branch on the kind of
/// failure rather than the exact variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input file or directory does not exist.
    NotFound,
    /// Bad argument or reference to something that is not there.
    Validation,
    /// A model could not be fitted or could not predict.
    Model,
    /// Filesystem, CSV or serialization failure.
    Io,
}

/// Errors raised by the loading, analysis and evaluation stages.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("file {} does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("unsupported fill strategy '{0}'; use 'mean', 'median' or 'most_frequent'")]
    UnsupportedStrategy(String),

    #[error("unsupported metric '{0}'; use 'Accuracy', 'F1 Score', 'Precision' or 'Recall'")]
    UnsupportedMetric(String),

    #[error("column '{0}' not found")]
    ColumnNotFound(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Model(String),

    #[error("classifier '{name}' failed: {source}")]
    Classifier {
        name: String,
        #[source]
        source: Box<PipelineError>,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::NotFound(_) => ErrorKind::NotFound,
            PipelineError::UnsupportedStrategy(_)
            | PipelineError::UnsupportedMetric(_)
            | PipelineError::ColumnNotFound(_)
            | PipelineError::InvalidArgument(_) => ErrorKind::Validation,
            PipelineError::Model(_) => ErrorKind::Model,
            PipelineError::Classifier { source, .. } => source.kind(),
            PipelineError::Io(_) | PipelineError::Csv(_) => ErrorKind::Io,
        }
    }

    /// Wrap a backend error raised while fitting or predicting.
    pub fn model(err: impl std::fmt::Display) -> Self {
        PipelineError::Model(err.to_string())
    }

    /// Attach the display name of the classifier that failed.
    pub fn for_classifier(self, name: &str) -> Self {
        PipelineError::Classifier {
            name: name.to_string(),
            source: Box::new(self),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
