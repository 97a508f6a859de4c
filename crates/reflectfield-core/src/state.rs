//! Compile-session state.
//!
//! Provides [`CompileSession`], which tracks the fields currently being
//! compiled so a field can suppress its own output while the document it is
//! compiled against is being assembled. Acquisition is scoped: the returned
//! [`CompileGuard`] releases the field when dropped, on every exit path.

use dashmap::DashSet;

use crate::types::FieldId;

/// Set of fields with a compilation in progress.
///
/// A session is owned by whoever drives compilation (one request, one batch
/// job) and passed by reference to the field engine.
///
/// # Examples
///
/// ```
/// use reflectfield_core::{CompileSession, FieldId};
///
/// let session = CompileSession::new();
/// let field = FieldId::new(3).unwrap();
/// {
///     let _guard = session.enter(field);
///     assert!(session.is_compiling(field));
/// }
/// assert!(!session.is_compiling(field));
/// ```
#[derive(Debug, Default)]
pub struct CompileSession {
    compiling: DashSet<FieldId>,
}

impl CompileSession {
    /// Create a session with no compilation in progress.
    #[must_use]
    pub fn new() -> Self {
        Self {
            compiling: DashSet::new(),
        }
    }

    /// Mark `field` as compiling until the returned guard is dropped.
    ///
    /// Entering a field that is already compiling yields a guard that leaves
    /// the outer mark in place when dropped.
    #[must_use]
    pub fn enter(&self, field: FieldId) -> CompileGuard<'_> {
        let owned = self.compiling.insert(field);
        if !owned {
            tracing::debug!(field = %field, "field already compiling in this session");
        }
        CompileGuard {
            session: self,
            field,
            owned,
        }
    }

    /// Whether `field` is currently being compiled.
    #[must_use]
    pub fn is_compiling(&self, field: FieldId) -> bool {
        self.compiling.contains(&field)
    }

    /// Number of fields currently compiling.
    #[must_use]
    pub fn len(&self) -> usize {
        self.compiling.len()
    }

    /// Whether no field is compiling.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.compiling.is_empty()
    }
}

/// Scoped mark that a field is compiling. Releases the mark on drop.
#[derive(Debug)]
pub struct CompileGuard<'a> {
    session: &'a CompileSession,
    field: FieldId,
    owned: bool,
}

impl CompileGuard<'_> {
    /// The field this guard marks.
    #[must_use]
    pub fn field(&self) -> FieldId {
        self.field
    }
}

impl Drop for CompileGuard<'_> {
    fn drop(&mut self) {
        if self.owned {
            self.session.compiling.remove(&self.field);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(id: u32) -> FieldId {
        FieldId::new(id).unwrap()
    }

    #[test]
    fn test_should_mark_field_while_guard_lives() {
        let session = CompileSession::new();
        assert!(session.is_empty());

        let guard = session.enter(field(1));
        assert_eq!(guard.field(), field(1));
        assert!(session.is_compiling(field(1)));
        assert!(!session.is_compiling(field(2)));

        drop(guard);
        assert!(!session.is_compiling(field(1)));
        assert!(session.is_empty());
    }

    #[test]
    fn test_should_release_on_early_return() {
        fn failing(session: &CompileSession) -> Result<(), &'static str> {
            let _guard = session.enter(field(5));
            Err("document failed")
        }

        let session = CompileSession::new();
        assert!(failing(&session).is_err());
        assert!(!session.is_compiling(field(5)));
    }

    #[test]
    fn test_should_keep_outer_mark_when_reentered() {
        let session = CompileSession::new();
        let outer = session.enter(field(9));
        {
            let _inner = session.enter(field(9));
        }
        assert!(session.is_compiling(field(9)));
        drop(outer);
        assert!(!session.is_compiling(field(9)));
    }

    #[test]
    fn test_should_track_fields_independently() {
        let session = CompileSession::new();
        let _a = session.enter(field(1));
        let b = session.enter(field(2));
        assert_eq!(session.len(), 2);
        drop(b);
        assert_eq!(session.len(), 1);
        assert!(session.is_compiling(field(1)));
    }
}
