use miette::Result;

/// Represents a validated configuration record that can be resolved
/// into its final, strongly-typed form.
pub trait ResolvableConfiguration {
    type Resolved;

    /// Resolve the configuration into its `Resolved` type.
    /// If the resolution fails, you may return `Err` to indicate
    /// that the configuration is invalid.
    fn resolve(self) -> Result<Self::Resolved>;
}


/// Represents a validated configuration record that can be resolved,
/// but where that process requires some additional context.
pub trait ResolvableConfigurationWithContext {
    type Context;
    type Resolved;

    /// Resolve the configuration into its `Resolved` type.
    /// If the resolution fails, you may return `Err` to indicate
    /// that the configuration is invalid.
    fn resolve(self, context: Self::Context) -> Result<Self::Resolved>;
}
