//! Materializes the next instance of a completed recurring task.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::calculator::NextDateCalculator;
use crate::clock::{Clock, IdGenerator, SystemClock, UuidV7Generator};
use crate::models::{RecurrenceRule, RecurringMode, Subtask, Task, TaskStatus};

/// Builds the next task instance from a completed one: decides the
/// reference date for advancement, applies the COUNT lifecycle, and copies
/// everything the engine does not interpret verbatim.
///
/// The input task is never mutated; the result is a new value with a fresh
/// identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstanceGenerator<C: Clock = SystemClock, G: IdGenerator = UuidV7Generator> {
    clock: C,
    ids: G,
}

impl InstanceGenerator {
    pub fn new() -> Self {
        Self {
            clock: SystemClock,
            ids: UuidV7Generator,
        }
    }
}

impl<C: Clock, G: IdGenerator> InstanceGenerator<C, G> {
    /// Builds a generator around injected collaborators, for deterministic
    /// output under test.
    pub fn with_collaborators(clock: C, ids: G) -> Self {
        Self { clock, ids }
    }

    /// Generates the next instance for a completed task, or `None` when the
    /// task does not recur any further: missing rule or due date,
    /// unparseable rule, exhausted COUNT, or a next date past UNTIL.
    pub fn generate_next(&self, completed: &Task) -> Option<Task> {
        let rule_text = completed.recurring.as_deref()?;
        let due_date = completed.due_date?;
        let rule = RecurrenceRule::parse(rule_text)?;

        // COUNT is inclusive of the current occurrence, so 1 means this was
        // the final one.
        if let Some(count) = rule.count {
            if count <= 1 {
                debug!(task = %completed.id, "count exhausted, series finished");
                return None;
            }
        }
        let next_rule_text = if rule.count.is_some() {
            rule.decrement_count().to_string()
        } else {
            rule_text.to_string()
        };

        let reference = reference_date(completed, due_date);
        let next_due =
            NextDateCalculator::with_clock(&self.clock).next_occurrence(rule_text, reference, false)?;

        debug!(task = %completed.id, %next_due, "generating next instance");
        Some(Task {
            id: self.ids.next_id(),
            title: completed.title.clone(),
            description: completed.description.clone(),
            status: TaskStatus::Pending,
            priority: completed.priority.clone(),
            due_date: Some(next_due),
            completed_at: None,
            created_at: self.clock.now(),
            project_id: completed.project_id,
            labels: completed.labels.clone(),
            recurring: Some(next_rule_text),
            recurring_mode: completed.recurring_mode,
            subtasks: reset_subtasks(&completed.subtasks),
            attachments: completed.attachments.clone(),
            comments: completed.comments.clone(),
        })
    }
}

/// Picks the date the next occurrence is computed from.
///
/// In completed-at mode the later of completion time and due date is used.
/// The `max` is load-bearing: completing a task before its due date must
/// still push the schedule strictly forward, otherwise every early
/// completion would recompute the same next date and the series would stall
/// on the original due date.
fn reference_date(task: &Task, due_date: DateTime<Utc>) -> DateTime<Utc> {
    match (task.recurring_mode, task.completed_at) {
        (RecurringMode::CompletedAt, Some(completed_at)) => completed_at.max(due_date),
        _ => due_date,
    }
}

fn reset_subtasks(subtasks: &[Subtask]) -> Vec<Subtask> {
    subtasks
        .iter()
        .map(|subtask| Subtask {
            id: subtask.id,
            title: subtask.title.clone(),
            completed: false,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskPriority;
    use chrono::TimeZone;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use uuid::Uuid;

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    struct SequentialIds(AtomicU64);

    impl IdGenerator for SequentialIds {
        fn next_id(&self) -> Uuid {
            let n = self.0.fetch_add(1, Ordering::Relaxed);
            Uuid::from_u64_pair(0, n + 1)
        }
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn generator() -> InstanceGenerator<FixedClock, SequentialIds> {
        InstanceGenerator::with_collaborators(
            FixedClock(at(2024, 8, 22, 12)),
            SequentialIds(AtomicU64::new(0)),
        )
    }

    fn recurring_task(rule: &str) -> Task {
        Task {
            title: "Water the plants".to_string(),
            due_date: Some(at(2024, 8, 23, 9)),
            recurring: Some(rule.to_string()),
            ..Task::default()
        }
    }

    #[test]
    fn requires_rule_and_due_date() {
        let gen = generator();
        let mut task = recurring_task("RRULE:FREQ=DAILY");
        task.recurring = None;
        assert!(gen.generate_next(&task).is_none());

        let mut task = recurring_task("RRULE:FREQ=DAILY");
        task.due_date = None;
        assert!(gen.generate_next(&task).is_none());
    }

    #[test]
    fn unparseable_rule_yields_none() {
        let gen = generator();
        let task = recurring_task("not a rule");
        assert!(gen.generate_next(&task).is_none());
    }

    #[test]
    fn count_one_is_the_final_occurrence() {
        let gen = generator();
        let task = recurring_task("RRULE:FREQ=DAILY;COUNT=1");
        assert!(gen.generate_next(&task).is_none());
    }

    #[test]
    fn count_decrements_through_the_lifecycle() {
        let gen = generator();
        let task = recurring_task("RRULE:FREQ=DAILY;COUNT=3");
        let next = gen.generate_next(&task).unwrap();
        assert_eq!(next.recurring.as_deref(), Some("RRULE:FREQ=DAILY;COUNT=2"));

        let next2 = gen.generate_next(&next).unwrap();
        assert_eq!(next2.recurring.as_deref(), Some("RRULE:FREQ=DAILY;COUNT=1"));

        assert!(gen.generate_next(&next2).is_none());
    }

    #[test]
    fn countless_rule_text_is_carried_over_verbatim() {
        let gen = generator();
        let task = recurring_task("RRULE:FREQ=WEEKLY;BYDAY=MO,WE,FR");
        let next = gen.generate_next(&task).unwrap();
        assert_eq!(next.recurring, task.recurring);
    }

    #[test]
    fn early_completion_never_regresses_the_schedule() {
        let gen = generator();
        let mut task = recurring_task("RRULE:FREQ=DAILY");
        task.recurring_mode = RecurringMode::CompletedAt;
        // Due tomorrow, completed today: the next due date must advance
        // past the original due date, not land on it.
        task.due_date = Some(at(2024, 8, 23, 9));
        task.completed_at = Some(at(2024, 8, 22, 10));

        let next = gen.generate_next(&task).unwrap();
        assert_eq!(next.due_date, Some(at(2024, 8, 24, 9)));
    }

    #[test]
    fn late_completion_advances_from_the_completion_time() {
        let gen = generator();
        let mut task = recurring_task("RRULE:FREQ=DAILY");
        task.recurring_mode = RecurringMode::CompletedAt;
        task.due_date = Some(at(2024, 8, 23, 9));
        task.completed_at = Some(at(2024, 8, 25, 10));

        let next = gen.generate_next(&task).unwrap();
        assert_eq!(next.due_date, Some(at(2024, 8, 26, 10)));
    }

    #[test]
    fn due_date_mode_ignores_completion_time() {
        let gen = generator();
        let mut task = recurring_task("RRULE:FREQ=DAILY");
        task.completed_at = Some(at(2024, 8, 25, 10));

        let next = gen.generate_next(&task).unwrap();
        assert_eq!(next.due_date, Some(at(2024, 8, 24, 9)));
    }

    #[test]
    fn completed_at_mode_without_timestamp_falls_back_to_due_date() {
        let gen = generator();
        let mut task = recurring_task("RRULE:FREQ=DAILY");
        task.recurring_mode = RecurringMode::CompletedAt;
        task.completed_at = None;

        let next = gen.generate_next(&task).unwrap();
        assert_eq!(next.due_date, Some(at(2024, 8, 24, 9)));
    }

    #[test]
    fn next_instance_has_fresh_identity_and_reset_state() {
        let gen = generator();
        let mut task = recurring_task("RRULE:FREQ=DAILY");
        task.status = TaskStatus::Completed;
        task.completed_at = Some(at(2024, 8, 23, 11));
        task.subtasks = vec![
            Subtask {
                id: Uuid::from_u64_pair(1, 1),
                title: "fill can".to_string(),
                completed: true,
            },
            Subtask {
                id: Uuid::from_u64_pair(1, 2),
                title: "water".to_string(),
                completed: false,
            },
        ];

        let next = gen.generate_next(&task).unwrap();
        assert_ne!(next.id, task.id);
        assert_eq!(next.status, TaskStatus::Pending);
        assert_eq!(next.completed_at, None);
        assert_eq!(next.created_at, at(2024, 8, 22, 12));
        assert_eq!(next.subtasks.len(), 2);
        for (fresh, old) in next.subtasks.iter().zip(&task.subtasks) {
            assert_eq!(fresh.id, old.id);
            assert_eq!(fresh.title, old.title);
            assert!(!fresh.completed);
        }
    }

    #[test]
    fn pass_through_fields_are_copied_verbatim() {
        let gen = generator();
        let mut task = recurring_task("RRULE:FREQ=DAILY");
        task.description = Some("greenhouse".to_string());
        task.priority = TaskPriority::High;
        task.project_id = Some(Uuid::from_u64_pair(7, 7));
        task.labels = vec!["home".to_string(), "plants".to_string()];
        task.attachments = vec![serde_json::json!({"file": "care.pdf", "bytes": 123})];
        task.comments = vec![serde_json::json!({"author": "sam", "text": "use the small can"})];

        let next = gen.generate_next(&task).unwrap();
        assert_eq!(next.title, task.title);
        assert_eq!(next.description, task.description);
        assert_eq!(next.priority, task.priority);
        assert_eq!(next.project_id, task.project_id);
        assert_eq!(next.labels, task.labels);
        assert_eq!(next.attachments, task.attachments);
        assert_eq!(next.comments, task.comments);
        assert_eq!(next.recurring_mode, task.recurring_mode);
    }

    #[test]
    fn exhausted_until_yields_none() {
        let gen = generator();
        let mut task = recurring_task("RRULE:FREQ=DAILY;UNTIL=20240823");
        task.due_date = Some(at(2024, 8, 23, 9));
        assert!(gen.generate_next(&task).is_none());
    }

    proptest! {
        #[test]
        fn subtask_reset_is_idempotent_and_order_preserving(
            flags in proptest::collection::vec(any::<bool>(), 0..12),
        ) {
            let subtasks: Vec<Subtask> = flags
                .iter()
                .enumerate()
                .map(|(i, &completed)| Subtask {
                    id: Uuid::from_u64_pair(2, i as u64),
                    title: format!("step {i}"),
                    completed,
                })
                .collect();

            let reset = reset_subtasks(&subtasks);
            prop_assert_eq!(reset.len(), subtasks.len());
            for (fresh, old) in reset.iter().zip(&subtasks) {
                prop_assert_eq!(fresh.id, old.id);
                prop_assert_eq!(&fresh.title, &old.title);
                prop_assert!(!fresh.completed);
            }
            let twice = reset_subtasks(&reset);
            prop_assert_eq!(twice, reset);
        }
    }
}
