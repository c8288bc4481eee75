//! Value objects for the query projection

use serde::{Deserialize, Serialize};

/// Position of an event kind in the safe application order.
/// Lower ranks are applied first; equal ranks tie.
pub type PrecedenceRank = u8;

/// Rank used for kinds without an entry of their own.
pub const DEFAULT_RANK: PrecedenceRank = 0;

/// How events of equal rank are ordered relative to each other.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Keep delivery order.
    #[default]
    ArrivalOrder,
    /// Order by event timestamp, keeping delivery order for equal timestamps.
    Timestamp,
}

/// Associations of the root process instance a batch may touch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Association {
    Variables,
    Tasks,
    Activities,
    ServiceTasks,
}

/// Preload request for the entities a batch will touch.
///
/// Each `Some` list restricts that association to the listed ids (or
/// variable names); `None` means the association is not needed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchPlan {
    pub process_instance_id: String,
    pub variable_names: Option<Vec<String>>,
    pub task_ids: Option<Vec<String>>,
    pub activity_ids: Option<Vec<String>>,
    pub service_task_ids: Option<Vec<String>>,
}

impl FetchPlan {
    pub fn new(process_instance_id: impl Into<String>) -> Self {
        Self {
            process_instance_id: process_instance_id.into(),
            ..Default::default()
        }
    }

    /// The associations this plan asks for, in a fixed order.
    #[must_use]
    pub fn associations(&self) -> Vec<Association> {
        [
            (Association::Variables, &self.variable_names),
            (Association::Tasks, &self.task_ids),
            (Association::Activities, &self.activity_ids),
            (Association::ServiceTasks, &self.service_task_ids),
        ]
        .into_iter()
        .filter(|(_, ids)| ids.is_some())
        .map(|(association, _)| association)
        .collect()
    }

    #[must_use]
    pub fn includes(&self, association: Association) -> bool {
        self.associations().contains(&association)
    }
}

/// Result of dispatching one event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatch {
    Handled,
    /// No handler is registered for the event kind.
    Unhandled,
}

/// Summary of a successfully applied batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub handled: usize,
    pub unhandled: usize,
}

impl BatchOutcome {
    pub fn record(&mut self, dispatch: Dispatch) {
        match dispatch {
            Dispatch::Handled => self.handled += 1,
            Dispatch::Unhandled => self.unhandled += 1,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.handled + self.unhandled
    }
}
