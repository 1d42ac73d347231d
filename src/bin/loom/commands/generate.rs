//! `loom generate` command

use anyhow::Result;

use crate::cli::GenerateArgs;
use loom::ops::GenerateOptions;

pub fn execute(args: GenerateArgs) -> Result<()> {
    let path = super::manifest_dir(args.path.as_deref())?;

    let options = GenerateOptions {
        jobs: args.jobs,
        dry_run: args.dry_run,
        ..GenerateOptions::default()
    };
    let generated = super::block_on(super::generator(options).generate(&path))??;

    let graph = &generated.graph;
    eprintln!(
        "    Finished `{}`: {} project(s), {} target(s), {} side effect(s)",
        graph.name(),
        graph.projects().count(),
        graph.targets().count(),
        generated.side_effects.len()
    );

    Ok(())
}
