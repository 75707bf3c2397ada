//! Delete and restore propagation over the relationship policy table.
//!
//! Each function computes the full closure of affected rows first, then
//! applies the mutation, so a refusal (blocked hard delete, missing root)
//! leaves the working state exactly as it found it. Callers run these on a
//! working copy of the store state and commit the copy wholesale.
//!
//! All three walks are idempotent: re-running one on an already-processed
//! subtree changes nothing.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use uuid::Uuid;

use crate::model::EntityRef;
use crate::store::errors::{StoreError, StoreResult};
use crate::store::state::StoreState;

use super::policy::{DeletePolicy, Relation};

fn not_found(r: EntityRef) -> StoreError {
    StoreError::NotFound {
        kind: r.kind,
        id: r.id,
    }
}

/// Walk the dependency graph from `root`, following relations selected by
/// `follow`, visiting each row at most once.
fn closure(
    state: &StoreState,
    root: EntityRef,
    follow: impl Fn(DeletePolicy) -> bool,
    visit: impl Fn(&StoreState, EntityRef) -> bool,
) -> Vec<EntityRef> {
    let mut queue = vec![root];
    let mut seen: HashSet<EntityRef> = HashSet::new();
    let mut out = Vec::new();

    while let Some(r) = queue.pop() {
        if !seen.insert(r) {
            continue;
        }
        if !visit(state, r) {
            continue;
        }
        out.push(r);
        for relation in Relation::ALL
            .iter()
            .filter(|rel| rel.referenced() == r.kind && follow(rel.on_delete()))
        {
            for dependent in relation.dependents(state, r.id) {
                queue.push(EntityRef::new(relation.dependent(), dependent));
            }
        }
    }

    out
}

/// Soft-delete `root` and every dependent its cascade relations reach.
///
/// Rows already soft-deleted are skipped along with their subtrees (they were
/// processed when they were deleted). Hard-delete-only rows swept up by the
/// cascade are removed physically. Returns the affected rows; an empty result
/// means the call was a no-op.
pub fn soft_delete(
    state: &mut StoreState,
    root: EntityRef,
    at: DateTime<Utc>,
) -> StoreResult<Vec<EntityRef>> {
    match state.deletion_marker(root) {
        None => return Err(not_found(root)),
        Some(Some(_)) => return Ok(Vec::new()),
        Some(None) => {}
    }

    let affected = closure(
        state,
        root,
        |policy| policy.cascades_on_soft(),
        |state, r| matches!(state.deletion_marker(r), Some(None)),
    );

    for r in &affected {
        if r.kind.is_hard_delete_only() {
            state.remove(*r);
        } else {
            state.mark_deleted(*r, at);
        }
    }

    Ok(affected)
}

/// Hard-delete `root` and every dependent its cascade relations reach.
///
/// Refuses with `IntegrityBlocked` if any row in the deletion closure has a
/// protected dependent that is not itself part of the closure. Nullifiable
/// references into the closure are cleared. Applies to live and soft-deleted
/// rows alike.
pub fn hard_delete(state: &mut StoreState, root: EntityRef) -> StoreResult<Vec<EntityRef>> {
    if state.deletion_marker(root).is_none() {
        return Err(not_found(root));
    }

    let affected = closure(
        state,
        root,
        |policy| policy.cascades_on_hard(),
        |state, r| state.deletion_marker(r).is_some(),
    );
    let removing: HashSet<EntityRef> = affected.iter().copied().collect();

    // Block check runs over the whole closure before anything mutates
    for r in &affected {
        for relation in Relation::ALL
            .iter()
            .filter(|rel| rel.referenced() == r.kind && rel.on_delete() == DeletePolicy::Protect)
        {
            let blocking = relation
                .dependents(state, r.id)
                .into_iter()
                .any(|dep| !removing.contains(&EntityRef::new(relation.dependent(), dep)));
            if blocking {
                return Err(StoreError::IntegrityBlocked {
                    referenced: r.kind,
                    dependent: relation.dependent(),
                    id: r.id,
                });
            }
        }
    }

    for r in &affected {
        for relation in Relation::ALL
            .iter()
            .filter(|rel| rel.referenced() == r.kind && rel.on_delete() == DeletePolicy::SetNull)
        {
            let survivors: Vec<Uuid> = relation
                .dependents(state, r.id)
                .into_iter()
                .filter(|dep| !removing.contains(&EntityRef::new(relation.dependent(), *dep)))
                .collect();
            for dependent in survivors {
                relation.clear_reference(state, dependent);
            }
        }
    }

    for r in &affected {
        state.remove(*r);
    }

    Ok(affected)
}

/// Restore `root` and the dependents soft-deleted by the same top-level call.
///
/// A dependent belongs to the restore closure when its deletion timestamp
/// equals the root's; rows deleted independently keep their marker. The
/// caller re-validates scoped uniqueness on the working state afterwards.
pub fn restore(state: &mut StoreState, root: EntityRef) -> StoreResult<Vec<EntityRef>> {
    let stamp = match state.deletion_marker(root) {
        None => return Err(not_found(root)),
        Some(None) => return Ok(Vec::new()),
        Some(Some(at)) => at,
    };

    let affected = closure(
        state,
        root,
        |policy| policy.cascades_on_soft(),
        |state, r| state.deletion_marker(r) == Some(Some(stamp)),
    );

    for r in &affected {
        state.clear_deleted(*r);
    }

    Ok(affected)
}
