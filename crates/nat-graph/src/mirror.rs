use nat_core::errors::GraphError;

use crate::table::BucketTable;

/// Terminal state of a two-phase mirrored mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum MirrorOutcome<T> {
    /// Both halves applied, or the mirror half was not required.
    Committed(T),
    /// The mirror half failed and the forward half was undone. Carries the mirror failure.
    RolledBack(GraphError),
    /// The mirror half failed and undoing the forward half failed too.
    Corrupted {
        /// Why the mirror half failed.
        mirror: GraphError,
        /// Why the compensating action failed.
        rollback: GraphError,
    },
}

impl<T> MirrorOutcome<T> {
    /// Returns true when the store is in the same state it would be in had
    /// the call never happened or had it fully succeeded.
    pub fn is_consistent(&self) -> bool {
        !matches!(self, MirrorOutcome::Corrupted { .. })
    }
}

/// Applies `forward`, then `mirror` when `mirrored` is set, compensating with
/// `undo` if the mirror half fails.
///
/// A failing `forward` is returned as `Err` untouched; it must not have
/// mutated anything. Both `mirror` and `undo` see the value `forward` produced.
pub(crate) fn apply_mirrored<T, M>(
    table: &mut BucketTable,
    mirrored: bool,
    forward: impl FnOnce(&mut BucketTable) -> Result<T, GraphError>,
    mirror: impl FnOnce(&mut BucketTable, &T) -> Result<M, GraphError>,
    undo: impl FnOnce(&mut BucketTable, &T) -> Result<(), GraphError>,
) -> Result<MirrorOutcome<T>, GraphError> {
    let applied = forward(table)?;
    if !mirrored {
        return Ok(MirrorOutcome::Committed(applied));
    }
    match mirror(table, &applied) {
        Ok(_) => Ok(MirrorOutcome::Committed(applied)),
        Err(mirror_err) => match undo(table, &applied) {
            Ok(()) => Ok(MirrorOutcome::RolledBack(mirror_err)),
            Err(rollback) => Ok(MirrorOutcome::Corrupted {
                mirror: mirror_err,
                rollback,
            }),
        },
    }
}
