//! Entry point for the task-completion workflow.

use tracing::debug;

use crate::clock::{Clock, IdGenerator, SystemClock, UuidV7Generator};
use crate::generator::InstanceGenerator;
use crate::models::Task;

/// Gates instance generation behind its preconditions and delegates to the
/// generator. Callers persist the returned instance themselves; `None`
/// means the completion ends the series (or the task never recurred).
#[derive(Debug, Clone, Copy, Default)]
pub struct CompletionProcessor<C: Clock = SystemClock, G: IdGenerator = UuidV7Generator> {
    generator: InstanceGenerator<C, G>,
}

impl CompletionProcessor {
    pub fn new() -> Self {
        Self {
            generator: InstanceGenerator::new(),
        }
    }
}

impl<C: Clock, G: IdGenerator> CompletionProcessor<C, G> {
    pub fn with_collaborators(clock: C, ids: G) -> Self {
        Self {
            generator: InstanceGenerator::with_collaborators(clock, ids),
        }
    }

    /// A completed task gets a successor only when it carries a non-empty
    /// recurrence rule and a due date.
    pub fn should_generate_next(&self, task: &Task) -> bool {
        task.recurring.as_deref().is_some_and(|rule| !rule.is_empty())
            && task.due_date.is_some()
    }

    /// Processes a completion: returns the next instance to create, or
    /// `None` when there is nothing to schedule.
    pub fn process_completion(&self, task: &Task) -> Option<Task> {
        if !self.should_generate_next(task) {
            debug!(task = %task.id, "not a recurring task, nothing to generate");
            return None;
        }
        self.generator.generate_next(task)
    }
}
