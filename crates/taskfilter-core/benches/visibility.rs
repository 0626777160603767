#![allow(missing_docs)]

use std::collections::HashSet;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use taskfilter_core::{
    BuiltInPredicate, EvalContext, Task, TaskFilter, TaskNode, TaskNumber, TaskTree, Visibility,
};
use time::macros::date;

fn build_tree(top_level: i32, children_per_task: i32) -> TaskTree {
    let mut next = 1;
    let mut nodes = Vec::new();
    for _ in 0..top_level {
        let parent = next;
        next += 1;
        let children = (0..children_per_task)
            .map(|idx| {
                let number = next;
                next += 1;
                let completion = if idx % 3 == 0 { 100 } else { 40 };
                TaskNode::leaf(
                    Task::new(number, format!("task-{number}"))
                        .with_completion(completion)
                        .with_schedule(date!(2024 - 06 - 01), date!(2024 - 06 - 10)),
                )
            })
            .collect();
        nodes.push(TaskNode::with_children(Task::new(parent, "summary"), children));
    }
    TaskTree::from_nodes(nodes).unwrap_or_else(|err| panic!("bench tree: {err}"))
}

fn visibility_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("visibility_rebuild");
    let tree = build_tree(100, 50);
    let matches: HashSet<TaskNumber> = tree
        .tasks()
        .filter(|task| task.number.get() % 2 == 0)
        .map(|task| task.number)
        .collect();
    let ctx = EvalContext {
        today: date!(2024 - 06 - 10),
        matches: &matches,
    };
    let filters = [
        TaskFilter::void(),
        TaskFilter::builtin(BuiltInPredicate::Completed),
        TaskFilter::builtin(BuiltInPredicate::InProgressToday),
        TaskFilter::custom("even", "", Some("num % 2 = 0".into())),
    ];
    for filter in &filters {
        group.bench_with_input(BenchmarkId::from_parameter(&filter.title), filter, |b, filter| {
            let mut visibility = Visibility::default();
            b.iter(|| {
                visibility.rebuild(&tree, filter, &ctx);
                black_box(visibility.hidden_count());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, visibility_benchmark);
criterion_main!(benches);
