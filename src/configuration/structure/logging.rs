use miette::{miette, Context, IntoDiagnostic, Result};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::configuration::traits::ResolvableConfiguration;
use crate::impl_record;


#[derive(Deserialize, Default, Clone, Debug)]
#[serde(default)]
pub struct UnresolvedLoggingConfiguration {
    pub console_output_level_filter: String,
}

impl_record!(UnresolvedLoggingConfiguration {
    console_output_level_filter: value(default = "info"),
});


#[derive(Serialize, Clone, Debug)]
pub struct LoggingConfiguration {
    pub console_output_level_filter: String,
}

impl ResolvableConfiguration for UnresolvedLoggingConfiguration {
    type Resolved = LoggingConfiguration;

    fn resolve(self) -> Result<Self::Resolved> {
        EnvFilter::try_new(&self.console_output_level_filter)
            .into_diagnostic()
            .wrap_err_with(|| miette!("Failed to parse field console_output_level_filter"))?;


        Ok(Self::Resolved {
            console_output_level_filter: self.console_output_level_filter,
        })
    }
}

impl LoggingConfiguration {
    pub fn console_output_level_filter(&self) -> EnvFilter {
        // PANIC SAFETY: This is safe because we checked that the input is valid in `resolve`.
        EnvFilter::try_new(&self.console_output_level_filter).unwrap()
    }
}
