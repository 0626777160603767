//! Task model and filter evaluation for hierarchical project plans.

/// Source of the current date.
pub mod clock;
/// Filter definitions and evaluation.
pub mod filter;
/// Task identifiers.
pub mod id;
/// Built-in predicates.
pub mod predicate;
/// Task fields consumed by filters.
pub mod task;
/// Task hierarchy and visibility.
pub mod tree;

pub use clock::{Clock, FixedClock, SystemClock};
pub use filter::{EvalContext, FilterKind, TaskFilter};
pub use id::TaskNumber;
pub use predicate::BuiltInPredicate;
pub use task::Task;
pub use tree::{TaskNode, TaskTree, TreeError, VisibleTask, Visibility};
