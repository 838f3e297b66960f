/// Failures raised while constructing a demo.
///
/// Stepping and drawing never fail; everything that can go wrong is caught
/// when the path, tube, or session is built.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SceneError {
    #[error("a path needs at least 2 control points, found {found}")]
    TooFewControlPoints { found: usize },
    #[error("control point {index} has a non-finite coordinate")]
    NonFiniteControlPoint { index: usize },
    #[error("invalid {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

impl SceneError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
