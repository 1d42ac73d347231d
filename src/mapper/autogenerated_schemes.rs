//! Scheme autogeneration.
//!
//! Targets are grouped according to the project's grouping policy and each
//! group becomes one scheme. Schemes the user declared always win: any
//! generated scheme with the same name is dropped.

use std::collections::{BTreeMap, HashSet, VecDeque};

use crate::core::{
    Arguments, AutomaticSchemesGrouping, BuildAction, Product, Project, RunAction, Scheme,
    SideEffectDescriptor, Target, TargetDependency, TargetReference, TestAction, TestableTarget,
};
use crate::errors::MapperError;
use crate::mapper::ProjectMapper;
use crate::util::config::CodeCoverageMode;

/// Generates schemes for the targets of a project.
#[derive(Debug, Clone, Default)]
pub struct AutogeneratedSchemesProjectMapper {
    code_coverage: CodeCoverageMode,
}

/// Targets that end up in the same scheme.
struct Group<'a> {
    name: String,
    members: Vec<&'a Target>,
}

impl AutogeneratedSchemesProjectMapper {
    pub fn new(code_coverage: CodeCoverageMode) -> Self {
        AutogeneratedSchemesProjectMapper { code_coverage }
    }

    fn groups<'a>(&self, project: &'a Project) -> Vec<Group<'a>> {
        match &project.options.automatic_schemes.grouping {
            AutomaticSchemesGrouping::Disabled => Vec::new(),

            AutomaticSchemesGrouping::ByName => {
                tracing::warn!(
                    "Scheme grouping `by_name` is not supported yet; no schemes generated for {}",
                    project.name
                );
                Vec::new()
            }

            AutomaticSchemesGrouping::SingleScheme => {
                if project.targets.is_empty() {
                    return Vec::new();
                }
                vec![Group {
                    name: project.name.clone(),
                    members: project.targets.iter().collect(),
                }]
            }

            AutomaticSchemesGrouping::NotGrouped => project
                .targets
                .iter()
                .map(|t| Group {
                    name: t.name.clone(),
                    members: vec![t],
                })
                .collect(),

            AutomaticSchemesGrouping::ByNameSuffix { build, test, run } => {
                let suffixes: Vec<&str> = build
                    .iter()
                    .chain(test)
                    .chain(run)
                    .map(String::as_str)
                    .filter(|s| !s.is_empty())
                    .collect();

                let mut by_base: BTreeMap<String, Vec<&Target>> = BTreeMap::new();
                for target in &project.targets {
                    by_base
                        .entry(base_name(&target.name, &suffixes).to_string())
                        .or_default()
                        .push(target);
                }
                by_base
                    .into_iter()
                    .map(|(name, members)| Group { name, members })
                    .collect()
            }
        }
    }

    fn scheme(&self, project: &Project, group: &Group<'_>, single_scheme: bool) -> Scheme {
        let reference = |t: &Target| TargetReference::new(&project.path, &t.name);
        let options = &project.options.automatic_schemes;
        let configuration = &project.default_debug_configuration;

        let hosts: Vec<&Target> = group
            .members
            .iter()
            .filter_map(|member| host(project, member))
            .collect();

        let mut seen = HashSet::new();
        let build_targets: Vec<&Target> = group
            .members
            .iter()
            .chain(hosts.iter())
            .copied()
            .filter(|t| seen.insert(t.name.clone()))
            .collect();

        let build = BuildAction::new(build_targets.iter().map(|t| reference(t)).collect());
        let mut scheme = Scheme::new(&group.name).with_build_action(build);

        let test_targets: Vec<&Target> = group
            .members
            .iter()
            .copied()
            .filter(|t| t.product.is_test_bundle())
            .collect();
        if !test_targets.is_empty() {
            let code_coverage_targets = match &self.code_coverage {
                CodeCoverageMode::Relevant => build_targets
                    .iter()
                    .filter(|t| !t.product.is_test_bundle())
                    .map(|t| reference(t))
                    .collect(),
                CodeCoverageMode::Targets(targets) => targets
                    .iter()
                    .map(|c| {
                        TargetReference::new(
                            c.project.clone().unwrap_or_else(|| project.path.clone()),
                            &c.target,
                        )
                    })
                    .collect(),
                CodeCoverageMode::All | CodeCoverageMode::Disabled => Vec::new(),
            };

            scheme = scheme.with_test_action(TestAction {
                targets: test_targets
                    .iter()
                    .map(|t| TestableTarget {
                        parallelizable: options.testing_options.parallelizable,
                        random_execution_ordering: options
                            .testing_options
                            .random_execution_ordering,
                        ..TestableTarget::new(reference(t))
                    })
                    .collect(),
                configuration_name: configuration.clone(),
                attach_debugger: true,
                coverage: options.code_coverage_enabled || self.code_coverage.is_enabled(),
                code_coverage_targets,
                arguments: None,
            });
        }

        let runnable: Vec<&Target> = group
            .members
            .iter()
            .copied()
            .filter(|t| t.product.is_runnable())
            .collect();
        let executable = if single_scheme {
            // One scheme for everything only runs an unambiguous target
            match runnable.as_slice() {
                [only] => Some(*only),
                _ => None,
            }
        } else {
            runnable.first().or(hosts.first()).copied()
        };

        if let Some(executable) = executable {
            scheme = scheme.with_run_action(RunAction {
                configuration_name: configuration.clone(),
                attach_debugger: true,
                executable: reference(executable),
                arguments: default_arguments(executable),
            });
        }

        scheme
    }
}

impl ProjectMapper for AutogeneratedSchemesProjectMapper {
    fn name(&self) -> &'static str {
        "AutogeneratedSchemesProjectMapper"
    }

    fn map(&self, project: Project) -> Result<(Project, Vec<SideEffectDescriptor>), MapperError> {
        let single_scheme =
            project.options.automatic_schemes.grouping == AutomaticSchemesGrouping::SingleScheme;
        let user_scheme_names: HashSet<&str> =
            project.schemes.iter().map(|s| s.name.as_str()).collect();

        let mut generated: Vec<Scheme> = self
            .groups(&project)
            .iter()
            .map(|group| self.scheme(&project, group, single_scheme))
            .filter(|scheme| !user_scheme_names.contains(scheme.name.as_str()))
            .collect();
        generated.sort_by(|a, b| a.name.cmp(&b.name));

        if generated.is_empty() {
            return Ok((project, Vec::new()));
        }

        tracing::debug!("Generated {} scheme(s) for {}", generated.len(), project.name);
        let mut schemes = project.schemes.clone();
        schemes.extend(generated);
        Ok((project.with_schemes(schemes), Vec::new()))
    }
}

/// Strip the longest matching suffix. A suffix equal to the whole name
/// never matches.
fn base_name<'a>(name: &'a str, suffixes: &[&str]) -> &'a str {
    suffixes
        .iter()
        .filter(|suffix| suffix.len() < name.len())
        .filter_map(|suffix| name.strip_suffix(suffix))
        .min_by_key(|base| base.len())
        .unwrap_or(name)
}

/// The target that runs an embedded product: the nearest dependent app for
/// app extensions, the nearest watch app for watch extensions.
fn host<'a>(project: &'a Project, target: &Target) -> Option<&'a Target> {
    let is_host: fn(&Target) -> bool = if target.product.is_app_extension() {
        |t| t.product.can_host_extensions()
    } else if target.product.is_watch_extension() {
        |t| t.product == Product::WatchApp
    } else {
        return None;
    };

    let mut visited = HashSet::from([target.name.clone()]);
    let mut queue = VecDeque::from([target.name.clone()]);
    while let Some(current) = queue.pop_front() {
        for dependent in dependents(project, &current) {
            if !visited.insert(dependent.name.clone()) {
                continue;
            }
            if is_host(dependent) {
                return Some(dependent);
            }
            queue.push_back(dependent.name.clone());
        }
    }
    None
}

/// Targets of `project` that declare a dependency on the target `name`.
fn dependents<'a>(project: &'a Project, name: &str) -> Vec<&'a Target> {
    project
        .targets
        .iter()
        .filter(|t| {
            t.dependencies.iter().any(|d| match d {
                TargetDependency::Target { name: n } => n == name,
                TargetDependency::Project { target, path } => {
                    target == name && path == &project.path
                }
                TargetDependency::Auto => false,
            })
        })
        .collect()
}

fn default_arguments(target: &Target) -> Option<Arguments> {
    let arguments = Arguments {
        environment: target.environment.clone(),
        launch_arguments: target.launch_arguments.clone(),
    };
    (!arguments.is_empty()).then_some(arguments)
}
