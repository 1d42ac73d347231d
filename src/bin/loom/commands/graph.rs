//! `loom graph` command

use anyhow::Result;

use crate::cli::{GraphArgs, GraphFormat};
use loom::core::{Graph, TargetReference};
use loom::mapper::graph_summary::GraphSummary;
use loom::ops::GenerateOptions;
use loom::util::fs::relative_path;

pub fn execute(args: GraphArgs) -> Result<()> {
    let path = super::manifest_dir(args.path.as_deref())?;
    let (graph, _) = super::block_on(super::generator(GenerateOptions::default()).load(&path))??;

    match args.format {
        GraphFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&GraphSummary::new(&graph))?);
        }
        GraphFormat::Text => print_graph(&graph),
    }

    Ok(())
}

fn print_graph(graph: &Graph) {
    println!("{}", graph.name());

    for project in graph.projects() {
        let location = relative_path(graph.path(), &project.path);
        let external = if project.is_external { " (external)" } else { "" };
        println!("├── {} ({}){}", project.name, display_dir(&location), external);

        for target in &project.targets {
            println!("│   ├── {} [{}]", target.name, target.product);

            let reference = TargetReference::new(&project.path, &target.name);
            for dependency in graph.direct_dependencies(&reference) {
                if dependency.project.path == project.path {
                    println!("│   │   └── {}", dependency.target.name);
                } else {
                    println!(
                        "│   │   └── {} ({})",
                        dependency.target.name, dependency.project.name
                    );
                }
            }
        }
    }
}

fn display_dir(path: &std::path::Path) -> String {
    if path.as_os_str().is_empty() {
        ".".to_string()
    } else {
        path.display().to_string()
    }
}
