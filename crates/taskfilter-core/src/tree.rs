//! Task hierarchy and the per-edge visibility walk.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::filter::{EvalContext, TaskFilter};
use crate::id::TaskNumber;
use crate::task::Task;

/// Errors raised while assembling a [`TaskTree`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    /// Two nodes share the same task number.
    #[error("duplicate task number: {0}")]
    DuplicateNumber(TaskNumber),
    /// A node uses the number reserved for the root.
    #[error("task number {0} is reserved for the root")]
    ReservedNumber(TaskNumber),
}

/// Serialized form of one task with its subtasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskNode {
    /// The task itself.
    #[serde(flatten)]
    pub task: Task,
    /// Nested subtasks in display order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Self>,
}

impl TaskNode {
    /// Leaf node.
    #[must_use]
    pub const fn leaf(task: Task) -> Self {
        Self {
            task,
            children: Vec::new(),
        }
    }

    /// Node with subtasks.
    #[must_use]
    pub const fn with_children(task: Task, children: Vec<Self>) -> Self {
        Self { task, children }
    }
}

/// Task hierarchy below an invisible root.
#[derive(Debug, Clone)]
pub struct TaskTree {
    root: Task,
    tasks: Vec<Task>,
    task_index: HashMap<TaskNumber, usize>,
    children_index: HashMap<TaskNumber, Vec<TaskNumber>>,
}

impl TaskTree {
    /// Build a tree from top-level nodes.
    ///
    /// # Errors
    /// Returns an error when task numbers repeat or use the root number.
    pub fn from_nodes(nodes: Vec<TaskNode>) -> Result<Self, TreeError> {
        let mut tree = Self {
            root: Task::new(TaskNumber::ROOT, String::new()),
            tasks: Vec::new(),
            task_index: HashMap::new(),
            children_index: HashMap::new(),
        };
        tree.insert_children(TaskNumber::ROOT, nodes)?;
        Ok(tree)
    }

    fn insert_children(
        &mut self,
        parent: TaskNumber,
        nodes: Vec<TaskNode>,
    ) -> Result<(), TreeError> {
        let mut numbers = Vec::with_capacity(nodes.len());
        for node in nodes {
            let number = node.task.number;
            if number == TaskNumber::ROOT {
                return Err(TreeError::ReservedNumber(number));
            }
            if self.task_index.contains_key(&number) {
                return Err(TreeError::DuplicateNumber(number));
            }
            self.task_index.insert(number, self.tasks.len());
            self.tasks.push(node.task);
            numbers.push(number);
            self.insert_children(number, node.children)?;
        }
        self.children_index.insert(parent, numbers);
        Ok(())
    }

    /// Invisible root placeholder.
    #[must_use]
    pub const fn root(&self) -> &Task {
        &self.root
    }

    /// Look up a task by number.
    #[must_use]
    pub fn get(&self, number: TaskNumber) -> Option<&Task> {
        if number == TaskNumber::ROOT {
            return Some(&self.root);
        }
        self.task_index.get(&number).and_then(|&idx| self.tasks.get(idx))
    }

    /// Mutable access to a task, used to apply edits.
    pub fn get_mut(&mut self, number: TaskNumber) -> Option<&mut Task> {
        let idx = *self.task_index.get(&number)?;
        self.tasks.get_mut(idx)
    }

    /// Direct subtasks of `number` (the root is [`TaskNumber::ROOT`]).
    #[must_use]
    pub fn children_of(&self, number: TaskNumber) -> &[TaskNumber] {
        self.children_index
            .get(&number)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Every task in depth-first order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    /// Number of tasks, excluding the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the tree has no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    fn subtree_size(&self, number: TaskNumber) -> usize {
        self.children_of(number)
            .iter()
            .map(|&child| 1 + self.subtree_size(child))
            .sum()
    }
}

/// A visible row of the filtered tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleTask {
    /// Task number.
    pub number: TaskNumber,
    /// Nesting depth, 0 for top-level tasks.
    pub depth: usize,
}

/// Result of applying a filter to a tree.
#[derive(Debug, Default, Clone)]
pub struct Visibility {
    visible: Vec<VisibleTask>,
    visible_index: HashSet<TaskNumber>,
    hidden: usize,
}

impl Visibility {
    /// Walk the tree top-down, evaluating `filter` on every parent/child edge.
    ///
    /// A child rejected by the filter is hidden together with its subtree.
    pub fn rebuild(&mut self, tree: &TaskTree, filter: &TaskFilter, ctx: &EvalContext<'_>) {
        self.visible.clear();
        self.visible_index.clear();
        self.hidden = 0;

        if !filter.evaluate(tree.root(), None, ctx) {
            self.hidden = tree.len();
            return;
        }
        self.walk(tree, tree.root(), 0, filter, ctx);
    }

    fn walk(
        &mut self,
        tree: &TaskTree,
        parent: &Task,
        depth: usize,
        filter: &TaskFilter,
        ctx: &EvalContext<'_>,
    ) {
        for &number in tree.children_of(parent.number) {
            let Some(child) = tree.get(number) else {
                continue;
            };
            if filter.evaluate(parent, Some(child), ctx) {
                self.visible.push(VisibleTask { number, depth });
                self.visible_index.insert(number);
                self.walk(tree, child, depth + 1, filter, ctx);
            } else {
                self.hidden += 1 + tree.subtree_size(number);
            }
        }
    }

    /// Visible rows in display order.
    #[must_use]
    pub fn visible(&self) -> &[VisibleTask] {
        &self.visible
    }

    /// Whether `number` survived the filter.
    #[must_use]
    pub fn contains(&self, number: TaskNumber) -> bool {
        self.visible_index.contains(&number)
    }

    /// How many tasks were filtered out.
    #[must_use]
    pub const fn hidden_count(&self) -> usize {
        self.hidden
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::BuiltInPredicate;
    use time::macros::date;

    fn ok<T, E: std::fmt::Display>(result: Result<T, E>, context: &str) -> T {
        result.unwrap_or_else(|err| panic!("{context}: {err}"))
    }

    fn sample() -> TaskTree {
        ok(
            TaskTree::from_nodes(vec![
                TaskNode::with_children(
                    Task::new(1, "design"),
                    vec![
                        TaskNode::leaf(Task::new(2, "sketch").with_completion(100)),
                        TaskNode::with_children(
                            Task::new(3, "review").with_completion(100),
                            vec![TaskNode::leaf(Task::new(4, "notes"))],
                        ),
                    ],
                ),
                TaskNode::leaf(Task::new(5, "build")),
            ]),
            "build tree",
        )
    }

    fn numbers(visibility: &Visibility) -> Vec<i32> {
        visibility.visible().iter().map(|row| row.number.get()).collect()
    }

    #[test]
    fn void_filter_shows_everything_in_order() {
        let tree = sample();
        let matches = HashSet::new();
        let ctx = EvalContext {
            today: date!(2024 - 01 - 01),
            matches: &matches,
        };
        let mut visibility = Visibility::default();
        visibility.rebuild(&tree, &TaskFilter::void(), &ctx);

        assert_eq!(numbers(&visibility), vec![1, 2, 3, 4, 5]);
        assert_eq!(visibility.visible()[3].depth, 2);
        assert_eq!(visibility.hidden_count(), 0);
    }

    #[test]
    fn hidden_parent_hides_subtree_and_counts_it() {
        let tree = sample();
        let matches = HashSet::new();
        let ctx = EvalContext {
            today: date!(2024 - 01 - 01),
            matches: &matches,
        };
        let mut visibility = Visibility::default();
        visibility.rebuild(&tree, &TaskFilter::builtin(BuiltInPredicate::Completed), &ctx);

        assert_eq!(numbers(&visibility), vec![1, 5]);
        assert!(!visibility.contains(TaskNumber(4)));
        assert_eq!(visibility.hidden_count(), 3);
    }

    #[test]
    fn custom_filter_uses_match_set() {
        let tree = sample();
        let matches: HashSet<TaskNumber> = [1, 3, 5].into_iter().map(TaskNumber).collect();
        let ctx = EvalContext {
            today: date!(2024 - 01 - 01),
            matches: &matches,
        };
        let mut visibility = Visibility::default();
        visibility.rebuild(&tree, &TaskFilter::custom("odd", "", Some("num % 2 = 1".into())), &ctx);

        assert_eq!(numbers(&visibility), vec![1, 3, 5]);
        assert_eq!(visibility.hidden_count(), 2);
    }

    #[test]
    fn rejects_duplicate_and_reserved_numbers() {
        let duplicate = TaskTree::from_nodes(vec![
            TaskNode::leaf(Task::new(1, "a")),
            TaskNode::leaf(Task::new(1, "b")),
        ]);
        assert_eq!(duplicate.err(), Some(TreeError::DuplicateNumber(TaskNumber(1))));

        let reserved = TaskTree::from_nodes(vec![TaskNode::leaf(Task::new(0, "root"))]);
        assert_eq!(reserved.err(), Some(TreeError::ReservedNumber(TaskNumber::ROOT)));
    }

    #[test]
    fn nodes_deserialize_from_nested_json() {
        let nodes: Vec<TaskNode> = ok(
            serde_json::from_str(
                r#"[{"number": 1, "name": "a", "children": [{"number": 2, "name": "b"}]}]"#,
            ),
            "parse nodes",
        );
        let tree = ok(TaskTree::from_nodes(nodes), "build tree");
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.children_of(TaskNumber(1)), &[TaskNumber(2)]);
        assert_eq!(tree.get(TaskNumber(2)).map(|t| t.name.as_str()), Some("b"));
    }
}
