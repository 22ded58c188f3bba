//! Single-entry enforcement.
//!
//! [`SingleEntryGuard`] observes every header the tar parser yields and
//! decides whether the entry's content goes to the destination or is
//! skipped. It fails as soon as a second entry appears, and at the end of
//! the archive it fails unless exactly one regular file was seen.

use std::path::PathBuf;

use crate::entry::EntryHeader;
use crate::error::{Error, Result};

/// What to do with the content of an observed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Admission {
    /// Forward the content to the destination.
    Accept,
    /// Skip the content.
    Drain,
}

#[derive(Debug)]
enum GuardState {
    AwaitingFirst,
    Streaming { first: EntryHeader },
    Rejected { first: EntryHeader },
    Done { accepted: EntryHeader },
}

/// Tagged-variant state machine enforcing exactly one file entry.
#[derive(Debug)]
pub(crate) struct SingleEntryGuard {
    archive: PathBuf,
    state: GuardState,
}

impl SingleEntryGuard {
    pub(crate) fn new(archive: impl Into<PathBuf>) -> Self {
        Self {
            archive: archive.into(),
            state: GuardState::AwaitingFirst,
        }
    }

    /// Observes the next entry header.
    pub(crate) fn observe(&mut self, header: &EntryHeader) -> Result<Admission> {
        match &self.state {
            GuardState::AwaitingFirst if header.is_file() => {
                self.state = GuardState::Streaming {
                    first: header.clone(),
                };
                Ok(Admission::Accept)
            }
            GuardState::AwaitingFirst => {
                self.state = GuardState::Rejected {
                    first: header.clone(),
                };
                Ok(Admission::Drain)
            }
            GuardState::Streaming { first }
            | GuardState::Rejected { first }
            | GuardState::Done { accepted: first } => Err(Error::MultipleEntries {
                archive: self.archive.clone(),
                first: first.clone(),
                second: header.clone(),
            }),
        }
    }

    /// Ends the entry sequence and returns the accepted header.
    pub(crate) fn finish(&mut self) -> Result<EntryHeader> {
        match &self.state {
            GuardState::Streaming { first } => {
                let accepted = first.clone();
                self.state = GuardState::Done {
                    accepted: accepted.clone(),
                };
                Ok(accepted)
            }
            GuardState::Done { accepted } => Ok(accepted.clone()),
            GuardState::Rejected { first } => Err(Error::NonFileEntry {
                archive: self.archive.clone(),
                entry: first.clone(),
            }),
            GuardState::AwaitingFirst => Err(Error::EmptyArchive {
                archive: self.archive.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryKind;
    use crate::error::ErrorKind;
    use proptest::prelude::*;

    fn header(name: &str, kind: EntryKind) -> EntryHeader {
        EntryHeader::new(name, 1, kind)
    }

    #[test]
    fn test_single_file_accepted() {
        let mut guard = SingleEntryGuard::new("a.tar");
        let file = header("a.txt", EntryKind::File);
        assert_eq!(guard.observe(&file).unwrap(), Admission::Accept);
        assert_eq!(guard.finish().unwrap(), file);

        let err = guard.observe(&header("late.txt", EntryKind::File)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MultiEntry);
    }

    #[test]
    fn test_second_entry_fails() {
        let mut guard = SingleEntryGuard::new("a.tar");
        guard.observe(&header("a.txt", EntryKind::File)).unwrap();
        let err = guard.observe(&header("b.txt", EntryKind::File)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MultiEntry);
        assert_eq!(err.entry_names(), vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn test_directory_then_file() {
        let mut guard = SingleEntryGuard::new("a.tar");
        assert_eq!(
            guard.observe(&header("_", EntryKind::Directory)).unwrap(),
            Admission::Drain
        );
        let err = guard.observe(&header("_/a.txt", EntryKind::File)).unwrap_err();
        assert!(err.to_string().contains("'_' (directory) and '_/a.txt'"));
    }

    #[test]
    fn test_lone_directory() {
        let mut guard = SingleEntryGuard::new("d.tar");
        guard.observe(&header("_", EntryKind::Directory)).unwrap();
        let err = guard.finish().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NonFileEntry);
        assert!(matches!(err, Error::NonFileEntry { .. }));
    }

    #[test]
    fn test_empty_archive() {
        let mut guard = SingleEntryGuard::new("e.tar");
        assert!(matches!(guard.finish(), Err(Error::EmptyArchive { .. })));
    }

    fn kind_strategy() -> impl Strategy<Value = EntryKind> {
        prop_oneof![
            Just(EntryKind::File),
            Just(EntryKind::Directory),
            Just(EntryKind::Symlink),
            Just(EntryKind::HardLink),
            Just(EntryKind::Other),
        ]
    }

    proptest! {
        #[test]
        fn proptest_single_file_rule(kinds in prop::collection::vec(kind_strategy(), 0..6)) {
            let mut guard = SingleEntryGuard::new("p.tar");
            let mut failed = None;
            for (i, kind) in kinds.iter().enumerate() {
                if let Err(err) = guard.observe(&header(&format!("e{}", i), *kind)) {
                    failed = Some(err);
                    break;
                }
            }
            let outcome = match failed {
                Some(err) => Err(err),
                None => guard.finish(),
            };

            let expect_ok = kinds.len() == 1 && kinds[0] == EntryKind::File;
            prop_assert_eq!(outcome.is_ok(), expect_ok);
            if kinds.len() > 1 {
                prop_assert_eq!(outcome.unwrap_err().kind(), ErrorKind::MultiEntry);
            }
        }
    }
}
