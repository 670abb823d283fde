//! Single-artifact replica publishing.
//!
//! Flat, non-recursive plumbing around the cascade core: copy one local
//! source artifact to N sibling replica locations derived from a single
//! declared output. With zero replicas the declared output is published
//! unchanged.

use std::path::Path;

use crate::cascade::progress::{CascadeEvent, ProgressSink};
use crate::target::{split_basename, Directory, StorageError, Target};

/// The replica locations derived from one declared output.
///
/// Replica basenames follow `"{name}.{i}{ext}"`, siblings of the declared
/// output in its parent directory.
#[derive(Debug, Clone)]
pub struct ReplicaSet<T: Target> {
    targets: Vec<T>,
    replicated: bool,
}

impl<T: Target> ReplicaSet<T> {
    /// Derives the replica targets for `output`.
    ///
    /// # Errors
    ///
    /// `NoParentDirectory` when `replicas > 0` and the output has no parent
    /// directory to place siblings in.
    pub fn new(output: &T, replicas: usize) -> Result<Self, StorageError> {
        if replicas == 0 {
            return Ok(ReplicaSet {
                targets: vec![output.clone()],
                replicated: false,
            });
        }

        let basename = output.basename();
        let (name, ext) = split_basename(&basename);
        let dir = output.parent().ok_or_else(|| StorageError::NoParentDirectory {
            target: basename.clone(),
        })?;

        let targets = (0..replicas)
            .map(|i| dir.child(&format!("{name}.{i}{ext}")))
            .collect();
        Ok(ReplicaSet {
            targets,
            replicated: true,
        })
    }

    pub fn targets(&self) -> &[T] {
        &self.targets
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Copies the local source artifact to every replica, in order.
    ///
    /// Publishes a progress event per replica; the zero-replica single
    /// output is copied without any event. Any copy failure aborts the
    /// remaining replicas.
    pub fn publish(&self, source: &Path, sink: &dyn ProgressSink) -> Result<(), StorageError> {
        for (index, replica) in self.targets.iter().enumerate() {
            replica.copy_from_local(source)?;
            if self.replicated {
                sink.publish(CascadeEvent::ReplicaPublished {
                    index,
                    total: self.targets.len(),
                    basename: replica.basename(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cascade::progress::test_support::RecordingSink;
    use crate::target::LocalTarget;
    use std::fs;

    #[test]
    fn zero_replicas_publish_the_single_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = LocalTarget::new(dir.path().join("data.txt"));
        let set = ReplicaSet::new(&output, 0).unwrap();

        assert_eq!(set.len(), 1);
        assert_eq!(set.targets()[0], output);
    }

    #[test]
    fn zero_replicas_publish_without_events() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source.txt");
        fs::write(&source, b"payload").unwrap();

        let output = LocalTarget::new(dir.path().join("data.txt"));
        let set = ReplicaSet::new(&output, 0).unwrap();
        let sink = RecordingSink::default();

        set.publish(&source, &sink).unwrap();

        assert!(output.exists());
        assert!(sink.events().is_empty());
    }

    #[test]
    fn replica_names_interleave_index_before_extension() {
        let dir = tempfile::tempdir().unwrap();
        let output = LocalTarget::new(dir.path().join("data.txt"));
        let set = ReplicaSet::new(&output, 3).unwrap();

        let names: Vec<String> = set.targets().iter().map(Target::basename).collect();
        assert_eq!(names, vec!["data.0.txt", "data.1.txt", "data.2.txt"]);
    }

    #[test]
    fn publish_copies_to_every_replica_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source.txt");
        fs::write(&source, b"payload").unwrap();

        let output = LocalTarget::new(dir.path().join("data.txt"));
        let set = ReplicaSet::new(&output, 2).unwrap();
        let sink = RecordingSink::default();

        set.publish(&source, &sink).unwrap();

        for target in set.targets() {
            assert!(target.exists());
            assert_eq!(fs::read(target.path()).unwrap(), b"payload");
        }

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            CascadeEvent::ReplicaPublished {
                index: 0,
                total: 2,
                basename: "data.0.txt".to_string(),
            }
        );
    }

    #[test]
    fn rootless_output_cannot_host_replicas() {
        let output = LocalTarget::new("/");
        assert!(matches!(
            ReplicaSet::new(&output, 2),
            Err(StorageError::NoParentDirectory { .. })
        ));
    }
}
