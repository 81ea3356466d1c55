use thiserror::Error;

pub type Result<T> = std::result::Result<T, ArmatureError>;

/// Errors surfaced while building the application graph.
///
/// Every variant here is fatal: a misconfigured dependency graph aborts the
/// boot sequence before any request-serving capability is exposed. There is no
/// partial-boot mode and nothing is retried.
#[derive(Debug, Error)]
pub enum ArmatureError {
    #[error("Invalid module imported by {parent}: the module reference resolved to nothing")]
    InvalidModule { parent: String },

    #[error("Unknown dependency: {requester} requires '{token}', which is not registered in its module or exported by any import")]
    UnknownDependency { requester: String, token: String },

    #[error("Circular dependency: constructing {requester} requires '{token}' which is already being constructed; break the cycle with a forward reference")]
    CircularDependency { requester: String, token: String },

    #[error("Unknown export: module {module} exports '{token}' but neither registers it nor re-exports it from an import")]
    UnknownExport { token: String, module: String },

    #[error("Circular module re-export: flattening the exports of {module} revisits it")]
    CircularModuleExport { module: String },

    #[error("Unknown module: {token}")]
    UnknownModule { token: String },

    #[error("Failed to downcast instance to {type_name}")]
    DowncastFailed { type_name: String },

    #[error(transparent)]
    Lifecycle(#[from] crate::lifecycle::LifecycleError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl axum::response::IntoResponse for ArmatureError {
    fn into_response(self) -> axum::response::Response {
        // Graph errors never reach a live request path under normal operation;
        // anything that does surface is a server-side fault.
        (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            self.to_string(),
        )
            .into_response()
    }
}
