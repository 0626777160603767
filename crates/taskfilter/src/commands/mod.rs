use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use taskfilter_app::{
    FilterManager, FilterOptions, FilterRegistry, ProjectConfig, load_filter_set, save_filter_set,
};
use taskfilter_core::{BuiltInPredicate, FixedClock, TaskFilter, TaskNode, TaskTree, Visibility};
use time::{Date, macros::format_description};
use tracing::debug;

use crate::Command;

/// Persisted catalog state of one project directory.
pub struct Workspace {
    config: ProjectConfig,
    registry: FilterRegistry,
    active: Option<String>,
}

impl Workspace {
    /// Load config, options and the saved filter set.
    pub fn open(dir: &Path) -> Result<Self> {
        let config = ProjectConfig::from_workdir(dir)?;
        let options = FilterOptions::load(config.options_path())?;
        let mut registry = FilterRegistry::new(options);
        let active = registry
            .import(load_filter_set(&config.filters_path())?)
            .map(|filter| filter.title);
        debug!(dir = %dir.display(), active = ?active, "opened workspace");
        Ok(Self {
            config,
            registry,
            active,
        })
    }

    fn active_title(&self) -> &str {
        self.active
            .as_deref()
            .unwrap_or_else(|| BuiltInPredicate::All.option_name())
    }

    fn save_filters(&self) -> Result<()> {
        save_filter_set(
            &self.config.filters_path(),
            &self.registry.export(self.active_title()),
        )
    }

    fn save_options(&self) -> Result<()> {
        self.registry.options().save(self.config.options_path())
    }
}

pub fn run(dir: &Path, command: Command) -> Result<()> {
    let mut workspace = Workspace::open(dir)?;
    match command {
        Command::Filters => {
            for line in list_filters(&workspace) {
                println!("{line}");
            }
        }
        Command::Show {
            tasks,
            filter,
            today,
        } => {
            let today = today.as_deref().map(parse_date).transpose()?;
            for line in show(workspace, &tasks, filter, today)? {
                println!("{line}");
            }
        }
        Command::Add {
            title,
            expression,
            description,
        } => {
            let filter = TaskFilter::custom(
                title.clone(),
                description.unwrap_or_default(),
                Some(expression),
            );
            workspace.registry.add_custom(filter)?;
            workspace.save_filters()?;
            println!("added filter: {title}");
        }
        Command::Remove { title } => {
            workspace.registry.remove_custom(&title)?;
            if workspace.active.as_deref() == Some(title.as_str()) {
                workspace.active = None;
            }
            workspace.save_filters()?;
            println!("removed filter: {title}");
        }
        Command::Import { file } => {
            let filters = load_filter_set(&file)?;
            workspace.active = workspace.registry.import(filters).map(|filter| filter.title);
            workspace.save_filters()?;
            println!(
                "imported {} filters (active: {})",
                workspace.registry.custom().len(),
                workspace.active_title()
            );
        }
        Command::Export { file } => {
            save_filter_set(&file, &workspace.registry.export(workspace.active_title()))?;
            println!("exported filters to {}", file.display());
        }
        Command::Option { name, value } => {
            let predicate = BuiltInPredicate::from_option_name(&name)
                .filter(|predicate| *predicate != BuiltInPredicate::All)
                .ok_or_else(|| anyhow!("unknown option '{name}'"))?;
            match workspace.registry.set_option(predicate, value) {
                Some(change) => {
                    workspace.save_options()?;
                    println!("{}: {} -> {}", change.name(), change.old, change.new);
                }
                None => println!("{name} is already {value}"),
            }
        }
    }
    Ok(())
}

fn list_filters(workspace: &Workspace) -> Vec<String> {
    let active = workspace.active_title();
    workspace
        .registry
        .filters()
        .map(|filter| {
            let marker = if filter.title == active { '*' } else { ' ' };
            match filter.expression() {
                Some(expression) => format!("{marker} {} [custom] {expression}", filter.title),
                None if filter.is_builtin() => {
                    let state = if filter.enabled { "on" } else { "off" };
                    format!("{marker} {} [built-in, {state}]", filter.title)
                }
                None => format!("{marker} {} [custom]", filter.title),
            }
        })
        .collect()
}

fn show(
    workspace: Workspace,
    tasks: &Path,
    filter: Option<String>,
    today: Option<Date>,
) -> Result<Vec<String>> {
    let tree = load_tree(tasks)?;
    let title = filter
        .or(workspace.active)
        .unwrap_or_else(|| BuiltInPredicate::All.option_name().to_owned());

    let mut manager = FilterManager::new(workspace.config.command_bridge(), workspace.registry);
    if let Some(today) = today {
        manager = manager.with_clock(FixedClock(today));
    }
    manager
        .activate(&title)
        .with_context(|| format!("failed to apply filter '{title}'"))?;

    let visibility = manager.rebuild_visibility(&tree);
    Ok(render_rows(&tree, visibility))
}

fn load_tree(path: &Path) -> Result<TaskTree> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let nodes: Vec<TaskNode> = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(TaskTree::from_nodes(nodes)?)
}

fn render_rows(tree: &TaskTree, visibility: &Visibility) -> Vec<String> {
    let mut lines: Vec<String> = visibility
        .visible()
        .iter()
        .filter_map(|row| {
            let task = tree.get(row.number)?;
            Some(format!(
                "{:indent$}#{} {} ({}%)",
                "",
                task.number,
                task.name,
                task.completion,
                indent = row.depth * 2
            ))
        })
        .collect();
    lines.push(format!("{} hidden", visibility.hidden_count()));
    lines
}

fn parse_date(raw: &str) -> Result<Date> {
    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .with_context(|| format!("invalid date '{raw}', expected YYYY-MM-DD"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use time::macros::date;

    fn ok<T, E: std::fmt::Display>(result: Result<T, E>, context: &str) -> T {
        result.unwrap_or_else(|err| panic!("{context}: {err}"))
    }

    const TASKS: &str = r#"[
        {"number": 1, "name": "design", "completion": 100, "children": [
            {"number": 2, "name": "sketch", "completion": 100}
        ]},
        {"number": 3, "name": "build", "completion": 40, "start": "2024-06-01", "end": "2024-06-10"},
        {"number": 4, "name": "ship", "end": "2024-06-01"}
    ]"#;

    #[test]
    fn add_and_remove_persist_the_catalog() {
        let dir = ok(tempdir(), "tempdir");
        let add = Command::Add {
            title: "high".into(),
            expression: "priority > 3".into(),
            description: Some("important".into()),
        };
        ok(run(dir.path(), add), "add");

        let saved = ok(
            load_filter_set(&dir.path().join(".taskfilter/filters.json")),
            "load saved",
        );
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].expression(), Some("priority > 3"));
        assert_eq!(saved[0].description, "important");

        let workspace = ok(Workspace::open(dir.path()), "open");
        assert!(list_filters(&workspace).contains(&"  high [custom] priority > 3".to_owned()));

        ok(run(dir.path(), Command::Remove { title: "high".into() }), "remove");
        let workspace = ok(Workspace::open(dir.path()), "reopen");
        assert!(workspace.registry.custom().is_empty());
    }

    #[test]
    fn option_command_updates_options_file() {
        let dir = ok(tempdir(), "tempdir");
        let set = Command::Option {
            name: "filter.overdueTasks".into(),
            value: true,
        };
        ok(run(dir.path(), set), "set option");

        let workspace = ok(Workspace::open(dir.path()), "open");
        assert!(workspace.registry.options().get(BuiltInPredicate::Overdue));
        assert!(
            list_filters(&workspace).contains(&"* filter.overdueTasks [built-in, on]".to_owned())
        );

        let unknown = Command::Option {
            name: "filter.void".into(),
            value: true,
        };
        assert!(run(dir.path(), unknown).is_err());
    }

    #[test]
    fn import_marks_enabled_filter_active() {
        let dir = ok(tempdir(), "tempdir");
        let file = dir.path().join("set.json");
        let filters = vec![
            TaskFilter::custom("a", "", Some("x".into())),
            TaskFilter {
                enabled: true,
                ..TaskFilter::custom("b", "", Some("y".into()))
            },
        ];
        ok(save_filter_set(&file, &filters), "write set");
        ok(run(dir.path(), Command::Import { file }), "import");

        let workspace = ok(Workspace::open(dir.path()), "open");
        assert_eq!(workspace.active.as_deref(), Some("b"));
        assert!(list_filters(&workspace).contains(&"* b [custom] y".to_owned()));
    }

    #[test]
    fn show_applies_builtin_filters_as_of_today() {
        let dir = ok(tempdir(), "tempdir");
        let tasks = dir.path().join("tasks.json");
        ok(fs::write(&tasks, TASKS), "write tasks");

        let workspace = ok(Workspace::open(dir.path()), "open");
        let lines = ok(
            show(workspace, &tasks, Some("filter.completedTasks".into()), None),
            "show completed",
        );
        assert_eq!(lines, vec!["#3 build (40%)", "#4 ship (0%)", "2 hidden"]);

        let workspace = ok(Workspace::open(dir.path()), "open");
        let lines = ok(
            show(
                workspace,
                &tasks,
                Some("filter.overdueTasks".into()),
                Some(date!(2024 - 06 - 05)),
            ),
            "show overdue",
        );
        assert_eq!(lines, vec!["#4 ship (0%)", "3 hidden"]);
    }

    #[test]
    fn show_without_filter_lists_everything() {
        let dir = ok(tempdir(), "tempdir");
        let tasks = dir.path().join("tasks.json");
        ok(fs::write(&tasks, TASKS), "write tasks");

        let workspace = ok(Workspace::open(dir.path()), "open");
        let lines = ok(show(workspace, &tasks, None, None), "show");
        assert_eq!(
            lines,
            vec![
                "#1 design (100%)",
                "  #2 sketch (100%)",
                "#3 build (40%)",
                "#4 ship (0%)",
                "0 hidden",
            ]
        );
    }

    #[test]
    fn enabled_option_selects_builtin_filter_on_open() {
        let dir = ok(tempdir(), "tempdir");
        let tasks = dir.path().join("tasks.json");
        ok(fs::write(&tasks, TASKS), "write tasks");
        let set = Command::Option {
            name: "filter.completedTasks".into(),
            value: true,
        };
        ok(run(dir.path(), set), "set option");

        let workspace = ok(Workspace::open(dir.path()), "open");
        assert_eq!(workspace.active_title(), "filter.completedTasks");
        assert!(
            list_filters(&workspace)
                .contains(&"* filter.completedTasks [built-in, on]".to_owned())
        );
        let lines = ok(show(workspace, &tasks, None, None), "show");
        assert_eq!(lines, vec!["#3 build (40%)", "#4 ship (0%)", "2 hidden"]);
    }

    #[test]
    fn custom_filter_without_bridge_is_an_error() {
        let dir = ok(tempdir(), "tempdir");
        let tasks = dir.path().join("tasks.json");
        ok(fs::write(&tasks, TASKS), "write tasks");
        let add = Command::Add {
            title: "high".into(),
            expression: "priority > 3".into(),
            description: None,
        };
        ok(run(dir.path(), add), "add");

        let workspace = ok(Workspace::open(dir.path()), "open");
        let Err(err) = show(workspace, &tasks, Some("high".into()), None) else {
            panic!("unconfigured bridge should error");
        };
        assert!(err.to_string().contains("failed to apply filter 'high'"));
    }

    #[test]
    fn rejects_malformed_dates() {
        assert!(parse_date("2024-13-01").is_err());
        assert_eq!(ok(parse_date("2024-06-10"), "parse"), date!(2024 - 06 - 10));
    }
}
