//! Tool-layer error taxonomy.
//!
//! Two classes of failure leave a tool handler. Protocol errors (unknown
//! tool, malformed arguments, disabled feature) are the caller holding the
//! contract wrong and map to MCP invalid-params errors. Everything else is a
//! feature-level failure reported inside the tool result so that the calling
//! model can read it and react.

use calendly_api::ApiError;

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("missing required argument: {0}")]
    MissingArgument(&'static str),

    #[error("invalid argument {name}: {reason}")]
    InvalidArgument {
        name: &'static str,
        reason: &'static str,
    },

    #[error("email tools are disabled: set EMAIL_PROVIDER to sendgrid, resend, or smtp")]
    FeatureDisabled,

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl ToolError {
    /// True when the failure belongs on the MCP protocol layer rather than
    /// inside a tool result.
    pub fn is_protocol_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownTool(_)
                | Self::MissingArgument(_)
                | Self::InvalidArgument { .. }
                | Self::FeatureDisabled
        )
    }
}
