/// Elevates the execution identity for the duration of index mutations,
/// bypassing row- and attribute-level permissions.
///
/// `begin`/`end` are always paired through [`ElevatedScope`], so every exit
/// path (success, configuration error, recreation failure) closes the
/// scope exactly once.
pub trait SecurityContext: Send + Sync {
    fn begin(&self);
    fn end(&self);
}

/// RAII wrapper around a [`SecurityContext`] begin/end pair.
pub struct ElevatedScope<'a> {
    context: &'a dyn SecurityContext,
}

impl<'a> ElevatedScope<'a> {
    pub fn enter(context: &'a dyn SecurityContext) -> Self {
        context.begin();
        Self { context }
    }
}

impl Drop for ElevatedScope<'_> {
    fn drop(&mut self) {
        self.context.end();
    }
}

/// No-op context for deployments without a security layer.
#[derive(Debug, Default)]
pub struct SystemContext;

impl SecurityContext for SystemContext {
    fn begin(&self) {}
    fn end(&self) {}
}
