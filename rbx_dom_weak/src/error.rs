use thiserror::Error;

use rbx_types::Ref;

/// Returned by [`WeakDom::set_parent`] and friends when the requested
/// re-parenting would introduce a cycle.
#[derive(Debug, Error)]
#[error("cannot parent {subject} to {new_parent}: would introduce a cycle")]
pub struct CycleError {
    pub(crate) subject: Ref,
    pub(crate) new_parent: Ref,
}
