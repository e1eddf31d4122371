use thiserror::Error;

/// Navigation failures that leave the router unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    /// Neither the requested route nor the home route is registered.
    #[error("route `{requested}` is not registered and there is no `{home}` route to fall back to")]
    Configuration { requested: String, home: String },
}

/// A page producer failed; shown inline, navigation stays possible.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to render `{route}`: {reason}")]
pub struct RenderError {
    pub route: String,
    pub reason: String,
}

impl RenderError {
    pub fn new(route: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            route: route.into(),
            reason: reason.to_string(),
        }
    }
}
