//! Progress notifications for cascade execution.
//!
//! Events fire at well-defined points: start-of-merge, after intermediate
//! removal, and per published replica. Embedders implement [`ProgressSink`]
//! to surface them; [`LogSink`] emits structured `tracing` records.

use serde::{Deserialize, Serialize};

use crate::types::{NodePath, TreeIndex};

/// A progress notification emitted during cascade or replica work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CascadeEvent {
    /// A node is about to invoke the merge operation.
    MergeStarted { tree: TreeIndex, node: NodePath },

    /// A node removed its consumed intermediate inputs after a successful
    /// merge.
    IntermediatesRemoved {
        tree: TreeIndex,
        node: NodePath,
        removed: usize,
    },

    /// One replica of a published artifact was written.
    ReplicaPublished {
        index: usize,
        total: usize,
        basename: String,
    },
}

/// Receives progress events.
pub trait ProgressSink {
    fn publish(&self, event: CascadeEvent);
}

/// A sink that logs every event via `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ProgressSink for LogSink {
    fn publish(&self, event: CascadeEvent) {
        match event {
            CascadeEvent::MergeStarted { tree, node } => {
                tracing::info!(%tree, %node, "start merging node");
            }
            CascadeEvent::IntermediatesRemoved { tree, node, removed } => {
                tracing::info!(%tree, %node, removed, "removed intermediate inputs");
            }
            CascadeEvent::ReplicaPublished {
                index,
                total,
                basename,
            } => {
                tracing::info!(index, total, %basename, "published replica");
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::sync::Mutex;

    /// Records every published event for assertions.
    #[derive(Debug, Default)]
    pub struct RecordingSink {
        events: Mutex<Vec<CascadeEvent>>,
    }

    impl RecordingSink {
        pub fn events(&self) -> Vec<CascadeEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    impl ProgressSink for RecordingSink {
        fn publish(&self, event: CascadeEvent) {
            self.events.lock().unwrap().push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodePath;

    #[test]
    fn events_serialize_with_a_tag() {
        let event = CascadeEvent::MergeStarted {
            tree: TreeIndex(1),
            node: NodePath::new(vec![0, 2]),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "merge_started");
        assert_eq!(json["tree"], 1);

        let parsed: CascadeEvent = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn recording_sink_captures_order() {
        use test_support::RecordingSink;

        let sink = RecordingSink::default();
        sink.publish(CascadeEvent::ReplicaPublished {
            index: 0,
            total: 2,
            basename: "a.0".to_string(),
        });
        sink.publish(CascadeEvent::ReplicaPublished {
            index: 1,
            total: 2,
            basename: "a.1".to_string(),
        });

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert!(matches!(
            &events[0],
            CascadeEvent::ReplicaPublished { index: 0, .. }
        ));
    }
}
