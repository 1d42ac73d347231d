//! `loom schemes` command

use anyhow::Result;

use crate::cli::SchemesArgs;
use loom::core::{Graph, Project, Scheme, TargetReference};
use loom::ops::GenerateOptions;

pub fn execute(args: SchemesArgs) -> Result<()> {
    let path = super::manifest_dir(args.path.as_deref())?;
    let (graph, _) = super::block_on(super::generator(GenerateOptions::default()).load(&path))??;

    for project in graph.projects().filter(|p| !p.is_external) {
        println!("{}", project.name);
        if project.schemes.is_empty() {
            println!("    (no schemes)");
        }
        for scheme in &project.schemes {
            print_scheme(&graph, project, scheme);
        }
    }

    Ok(())
}

fn print_scheme(graph: &Graph, project: &Project, scheme: &Scheme) {
    let visibility = if scheme.shared { "shared" } else { "user" };
    println!("  {} ({})", scheme.name, visibility);

    let build = scheme.build_targets();
    if !build.is_empty() {
        println!("    build: {}", join(graph, project, build.iter()));
    }

    let tests = scheme.test_targets();
    if !tests.is_empty() {
        println!("    test:  {}", join(graph, project, tests.into_iter()));
    }
    if let Some(action) = scheme.test_action.as_ref().filter(|a| a.coverage) {
        println!("    coverage: {}", action.configuration_name);
    }

    if let Some(run) = scheme.run_target() {
        println!("    run:   {}", label(graph, project, run));
    }
}

fn join<'a>(
    graph: &Graph,
    project: &Project,
    refs: impl Iterator<Item = &'a TargetReference>,
) -> String {
    refs.map(|r| label(graph, project, r)).collect::<Vec<_>>().join(", ")
}

/// Target name, qualified with its project name when it lives elsewhere.
fn label(graph: &Graph, project: &Project, reference: &TargetReference) -> String {
    if reference.project_path == project.path {
        return reference.name.clone();
    }
    match graph.project(&reference.project_path) {
        Some(other) => format!("{} ({})", reference.name, other.name),
        None => reference.to_string(),
    }
}
