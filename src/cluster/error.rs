use thiserror::Error;

use crate::linalg::ShapeError;
use crate::Id;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClusterError {
    #[error("Job for cluster '{cluster}' panicked: {message}")]
    Panicked { cluster: Id, message: String },

    #[error("Failed to build worker pool: {0}")]
    Pool(String),

    #[error(transparent)]
    Shape(#[from] ShapeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panicked_display() {
        let e = ClusterError::Panicked {
            cluster: "east".into(),
            message: "boom".into(),
        };
        assert_eq!(e.to_string(), "Job for cluster 'east' panicked: boom");
    }

    #[test]
    fn pool_display() {
        let e = ClusterError::Pool("no threads".into());
        assert_eq!(e.to_string(), "Failed to build worker pool: no threads");
    }

    #[test]
    fn shape_is_transparent() {
        let e: ClusterError = ShapeError::Empty.into();
        assert_eq!(e.to_string(), "Matrix is empty");
    }
}
