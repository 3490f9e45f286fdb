// ============================================================
// Layer 5 — Multi-Task Head
// ============================================================
// Mean-pools the final hidden states over the sequence axis and
// projects the pooled vector once per configured task:
//
//   hidden [b, t, dim] ──mean over t──▶ [b, dim] ──┬─▶ Linear → [b, classes]   (classification)
//                                                  └─▶ Linear → [b, 1]         (regression)
//
// Tasks never interact; the task set is fixed at construction.

use std::collections::BTreeMap;

use burn::{
    module::Ignored,
    nn::{Linear, LinearConfig},
    prelude::*,
};

/// Per-task outputs keyed by task name, each `[batch, output_dim]`.
pub type TaskOutputs<B> = BTreeMap<String, Tensor<B, 2>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Classification { classes: usize },
    Regression,
}

/// A named prediction objective and its output width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSpec {
    pub name:       String,
    pub output_dim: usize,
}

impl TaskSpec {
    pub fn new(name: impl Into<String>, output_dim: usize) -> Self {
        Self { name: name.into(), output_dim }
    }

    /// Width 1 is a scalar regression, anything wider is a class count.
    pub fn kind(&self) -> TaskKind {
        if self.output_dim == 1 {
            TaskKind::Regression
        } else {
            TaskKind::Classification { classes: self.output_dim }
        }
    }
}

#[derive(Module, Debug)]
pub struct MultiTaskHead<B: Backend> {
    /// One projection per task, same order as `tasks`
    pub projections: Vec<Linear<B>>,
    /// Not a parameter; rebuilt from the config on load
    pub tasks: Ignored<Vec<TaskSpec>>,
}

impl<B: Backend> MultiTaskHead<B> {
    pub fn new(dim: usize, tasks: Vec<TaskSpec>, device: &B::Device) -> Self {
        let projections = tasks
            .iter()
            .map(|task| LinearConfig::new(dim, task.output_dim).init(device))
            .collect();
        Self { projections, tasks: Ignored(tasks) }
    }

    /// hidden: [b, t, dim] → one [b, output_dim] tensor per task
    pub fn forward(&self, hidden: Tensor<B, 3>) -> TaskOutputs<B> {
        let [b, _, dim] = hidden.dims();
        let pooled = hidden.mean_dim(1).reshape([b, dim]);

        self.tasks
            .0
            .iter()
            .zip(&self.projections)
            .map(|(task, proj)| (task.name.clone(), proj.forward(pooled.clone())))
            .collect()
    }

    pub fn task(&self, name: &str) -> Option<&TaskSpec> {
        self.tasks.0.iter().find(|t| t.name == name)
    }
}
