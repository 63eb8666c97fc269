use thiserror::Error;

/// Errors raised while registering bindings or resolving capabilities
#[derive(Error, Debug)]
pub enum LocatorError {
    /// The (capability, name) pair is already bound in this scope's registry.
    ///
    /// Bindings in ancestor scopes do not count: a child scope may shadow them.
    #[error("duplicate binding for <{capability}> named {name:?}")]
    DuplicateBinding {
        capability: &'static str,
        name: String,
    },

    /// A resolution revisited the (capability, name) of one of its ancestors.
    ///
    /// The path renders the full chain of in-flight requests, outermost first.
    #[error("recursive resolve, path = {path}")]
    RecursiveResolve { path: String },

    /// No scope in the locator chain has a binding for the request.
    #[error("unable to resolve <{capability}>, path = {path}")]
    UnableToResolve {
        capability: &'static str,
        path: String,
    },

    /// An internal contract was violated, e.g. configuring a binding twice
    /// or choosing a concrete type twice on one context.
    #[error("binding issue: {0}")]
    BindingIssue(String),
}
