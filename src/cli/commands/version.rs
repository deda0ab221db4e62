//! `version`: package version, build profile and the resources this build
//! can mirror.

use crate::error::Result;
use crate::model::ResourceKind;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct VersionOutput {
    name: &'static str,
    version: &'static str,
    build: &'static str,
    resources: Vec<&'static str>,
}

impl VersionOutput {
    fn current() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            build: if cfg!(debug_assertions) { "dev" } else { "release" },
            resources: ResourceKind::ALL.iter().map(ResourceKind::name).collect(),
        }
    }
}

/// Execute the version command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(json: bool) -> Result<()> {
    let output = VersionOutput::current();

    if json {
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("{} {} ({})", output.name, output.version, output.build);
    println!("resources: {}", output.resources.join(", "));
    Ok(())
}
