//! Printable board report built from the derived views.

use std::fmt;

use serde::Serialize;

use taskboard_proto::{Contact, Priority, Task, TaskStatus};

use crate::assignees::{dangling_assignees, resolve_assignees};
use crate::mirror::Snapshot;
use crate::views::{self, BoardSummary};

/// One task card as shown in a board column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardReport {
    /// Task id.
    pub id: String,
    /// Task title.
    pub title: String,
    /// Task category.
    pub category: String,
    /// Task priority.
    pub priority: Priority,
    /// Due date as `dd/mm/yyyy`, empty when unset.
    pub date: String,
    /// Completed subtasks.
    pub subtasks_done: usize,
    /// All subtasks.
    pub subtasks_total: usize,
    /// Initials of the resolved assignees, in assignment order.
    pub assignees: Vec<String>,
    /// Assignee ids that no longer resolve to a contact.
    pub dangling: Vec<String>,
}

/// A board column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnReport {
    /// Column status.
    pub status: TaskStatus,
    /// Column heading.
    pub label: &'static str,
    /// Cards in snapshot order.
    pub cards: Vec<CardReport>,
}

/// A letter group of the contact list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactGroupReport {
    /// Group initial.
    pub letter: char,
    /// Full names in list order.
    pub names: Vec<String>,
}

/// Everything the binary prints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Summary figures.
    pub summary: BoardSummary,
    /// Board columns.
    pub columns: Vec<ColumnReport>,
    /// Contact list.
    pub contacts: Vec<ContactGroupReport>,
}

impl Report {
    /// Builds the report from the current snapshots.
    ///
    /// `search` narrows the cards listed in the columns. The summary always
    /// covers the whole board.
    #[must_use]
    pub fn build(
        tasks: &Snapshot<Task>,
        contacts: &Snapshot<Contact>,
        search: Option<&str>,
    ) -> Self {
        let listed = views::filter_tasks(tasks.entities(), search.unwrap_or(""));
        let columns = views::bucket_by_status(listed)
            .iter()
            .map(|(status, cards)| ColumnReport {
                status,
                label: status.label(),
                cards: cards.iter().map(|t| card(t, contacts)).collect(),
            })
            .collect();

        Self {
            summary: views::summarize(tasks.entities()),
            columns,
            contacts: views::group_contacts_by_initial(contacts.entities())
                .into_iter()
                .map(|group| ContactGroupReport {
                    letter: group.letter,
                    names: group.contacts.iter().map(|c| c.full_name()).collect(),
                })
                .collect(),
        }
    }
}

fn card(task: &Task, contacts: &Snapshot<Contact>) -> CardReport {
    let (subtasks_done, subtasks_total) = views::subtask_progress(task);
    CardReport {
        id: task.id.to_string(),
        title: task.fields.title.clone(),
        category: task.fields.category.clone(),
        priority: task.fields.priority,
        date: views::format_card_date(task),
        subtasks_done,
        subtasks_total,
        assignees: resolve_assignees(task, contacts)
            .iter()
            .map(|c| c.initials())
            .collect(),
        dangling: dangling_assignees(task, contacts)
            .iter()
            .map(ToString::to_string)
            .collect(),
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.summary;
        writeln!(f, "Summary")?;
        writeln!(
            f,
            "  to do {}  in progress {}  awaiting feedback {}  done {}  total {}",
            s.todo, s.in_progress, s.await_feedback, s.done, s.total
        )?;
        writeln!(f, "  urgent {}  next deadline {}", s.urgent, s.upcoming_deadline)?;

        for column in &self.columns {
            writeln!(f)?;
            writeln!(f, "{} ({})", column.label, column.cards.len())?;
            for card in &column.cards {
                write!(f, "  [{}] {} - {}", card.priority, card.title, card.category)?;
                if !card.date.is_empty() {
                    write!(f, "  due {}", card.date)?;
                }
                if card.subtasks_total > 0 {
                    write!(f, "  {}/{} subtasks", card.subtasks_done, card.subtasks_total)?;
                }
                if !card.assignees.is_empty() {
                    write!(f, "  {}", card.assignees.join(" "))?;
                }
                if !card.dangling.is_empty() {
                    write!(f, "  (unknown: {})", card.dangling.join(", "))?;
                }
                writeln!(f)?;
            }
        }

        if !self.contacts.is_empty() {
            writeln!(f)?;
            writeln!(f, "Contacts")?;
            for group in &self.contacts {
                writeln!(f, "  {}: {}", group.letter, group.names.join(", "))?;
            }
        }
        Ok(())
    }
}
