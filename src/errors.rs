// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Error taxonomy for the report engine
//!
//! Configuration problems are fatal and abort the run. Provider and
//! narrative failures are recoverable: the pipeline degrades the report
//! (neutral scores, fallback copy) and keeps going.

use thiserror::Error;

/// Errors surfaced by the report engine.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Configuration is missing or invalid. Fatal, aborts the run.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A data provider failed to produce inputs. Recoverable, the
    /// pipeline degrades to neutral values for the missing domain.
    #[error("Provider error: {0}")]
    Provider(String),

    /// The narrative generator failed or returned unusable output.
    /// Recoverable, the pipeline falls back to deterministic copy.
    #[error("Narrative error: {0}")]
    Narrative(String),

    /// The narrative payload parsed but violated the report contract.
    #[error("Narrative schema violation: {}", .0.join("; "))]
    NarrativeSchema(Vec<String>),
}

impl ReportError {
    /// Whether the pipeline may continue with degraded output.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Configuration(_))
    }
}
