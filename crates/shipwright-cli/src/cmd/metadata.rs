use crate::output::print_json;
use anyhow::Context;
use shipwright_core::{metadata::BuildMetadata, runner::SystemRunner, settings::Settings};
use std::path::Path;

pub fn run(root: &Path) -> anyhow::Result<()> {
    let settings = Settings::from_env();
    let metadata = BuildMetadata::collect(&SystemRunner, &settings, root)
        .context("failed to read pubspec.yaml")?;
    print_json(&metadata)
}
