//! State owned by one analysis run of one report.

use std::sync::Arc;

use crate::core::diagnostics::Diagnostics;
use crate::core::resource::ResourceIdentity;
use crate::graph::cache::DependencyCache;
use crate::graph::resolver::IdentityResolver;
use crate::graph::sink::{EdgeJournal, EdgeSink};
use crate::graph::types::EdgeId;

/// Everything the builder and the rollup engine share while processing one
/// report for one project. Constructed per report and dropped afterwards;
/// never shared between projects.
#[derive(Debug)]
pub struct RunScope {
    pub(crate) resolver: IdentityResolver,
    pub(crate) cache: DependencyCache,
    pub(crate) diagnostics: Diagnostics,
    pub(crate) journal: EdgeJournal,
}

impl RunScope {
    /// Opens a fresh scope for `project`.
    pub fn new(project: Arc<ResourceIdentity>) -> Self {
        Self::starting_at(project, EdgeId::new(0))
    }

    /// Opens a fresh scope whose edge ids start at `first_id`.
    pub fn starting_at(project: Arc<ResourceIdentity>, first_id: EdgeId) -> Self {
        Self {
            resolver: IdentityResolver::new(project),
            cache: DependencyCache::starting_at(first_id),
            diagnostics: Diagnostics::new(),
            journal: EdgeJournal::new(),
        }
    }

    /// The project under analysis.
    pub fn project(&self) -> &Arc<ResourceIdentity> {
        self.resolver.project()
    }

    /// Diagnostics recorded so far.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Replays staged edges into `sink` and closes the scope.
    pub fn commit(self, sink: &mut dyn EdgeSink) -> (Diagnostics, usize) {
        let recorded = self.journal.commit(sink);
        (self.diagnostics, recorded)
    }
}
