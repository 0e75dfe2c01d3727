//! Streaming pass over a dependency report.

use std::io::BufRead;
use std::sync::Arc;

use tracing::{debug, info};

use crate::core::errors::Result;
use crate::core::resource::{ResourceIdentity, ResourceTree, TypeBridge};
use crate::graph::run::RunScope;
use crate::graph::sink::EdgeSink;
use crate::graph::types::Usage;
use crate::report::cursor::{Element, XmlStream};
use crate::report::tags;

/// Counters from one streaming pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// `Assembly` elements seen
    pub assemblies: usize,
    /// Assemblies skipped (foreign modules or blank names)
    pub skipped_assemblies: usize,
    /// `Reference` elements turned into project-level observations
    pub references: usize,
    /// `(From, To)` pairs buffered for rollup
    pub type_references: usize,
}

/// Drives the report cursors and feeds the run's cache.
///
/// Project-level edges are merged into the cache and staged as soon as their
/// `Reference` element is read. Type references are only buffered; target
/// types are resolved later by the rollup engine.
#[derive(Debug, Clone, Copy)]
pub struct GraphBuilder {
    include_type_references: bool,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new(true)
    }
}

impl GraphBuilder {
    /// Creates a builder. With `include_type_references` off, `TypeReferences`
    /// sections are skipped and only project-level edges are produced.
    pub fn new(include_type_references: bool) -> Self {
        Self {
            include_type_references,
        }
    }

    /// Consumes every `Assembly` element of the report.
    pub fn build<R: BufRead>(
        &self,
        stream: &mut XmlStream<R>,
        run: &mut RunScope,
        tree: &mut dyn ResourceTree,
        bridge: &dyn TypeBridge,
    ) -> Result<BuildStats> {
        let mut stats = BuildStats::default();
        let mut assemblies = stream.descendants(tags::ASSEMBLY);

        while let Some(mut assembly) = assemblies.next()? {
            stats.assemblies += 1;
            let name = assembly.required_attr("name")?.to_string();
            let version = assembly.required_attr("version")?.to_string();

            if name.trim().is_empty() {
                let project = run.project().key().to_string();
                run.diagnostics.unresolved_assembly(&name, &project);
                stats.skipped_assemblies += 1;
                continue;
            }

            let from = run.resolver.resolve(&name, &version, tree);
            if run.resolver.is_foreign_module(&from) {
                debug!(
                    "Skipping assembly {} {}: it belongs to {}",
                    name,
                    version,
                    from.key()
                );
                stats.skipped_assemblies += 1;
                continue;
            }

            let mut groups = assembly.children();
            while let Some(mut group) = groups.next()? {
                let kind = group.local_name().to_string();
                match kind.as_str() {
                    tags::REFERENCES => {
                        self.read_references(&mut group, &from, run, tree, &mut stats)?;
                    }
                    tags::TYPE_REFERENCES if self.include_type_references => {
                        self.read_type_references(&mut group, &from, run, bridge, &mut stats)?;
                    }
                    tags::TYPE_REFERENCES => {
                        debug!("Type references of {} ignored (type rollup disabled)", name);
                    }
                    other => debug!("Ignoring <{}> in assembly {}", other, name),
                }
            }
        }

        Ok(stats)
    }

    fn read_references<R: BufRead>(
        &self,
        group: &mut Element<'_, R>,
        from: &Arc<ResourceIdentity>,
        run: &mut RunScope,
        tree: &mut dyn ResourceTree,
        stats: &mut BuildStats,
    ) -> Result<()> {
        let mut references = group.children();
        while let Some(reference) = references.next()? {
            if reference.local_name() != tags::REFERENCE {
                debug!("Ignoring <{}> in References", reference.local_name());
                continue;
            }
            let name = reference.required_attr("name")?;
            let version = reference.required_attr("version")?;
            if name.trim().is_empty() {
                run.diagnostics
                    .unresolved_assembly(name, &from.display_name());
                continue;
            }

            let to = run.resolver.resolve(name, version, tree);
            let edge = run.cache.merge_project_edge(from.clone(), to, Usage::Compile);
            if edge.weight == 1 {
                info!(
                    "Saving dependency from {} to {}",
                    edge.from.display_name(),
                    edge.to.display_name()
                );
            } else {
                info!(
                    "Updating dependency from {} to {} (weight {})",
                    edge.from.display_name(),
                    edge.to.display_name(),
                    edge.weight
                );
            }
            run.journal.record_edge(edge);
            stats.references += 1;
        }
        Ok(())
    }

    fn read_type_references<R: BufRead>(
        &self,
        group: &mut Element<'_, R>,
        from: &ResourceIdentity,
        run: &mut RunScope,
        bridge: &dyn TypeBridge,
        stats: &mut BuildStats,
    ) -> Result<()> {
        let mut blocks = group.children();
        while let Some(mut block) = blocks.next()? {
            if block.local_name() != tags::FROM {
                debug!("Ignoring <{}> in TypeReferences", block.local_name());
                continue;
            }
            let source_type = block.required_attr("fullname")?.to_string();
            let owner = run.resolver.resolve_type(&source_type, bridge);

            let mut has_targets = false;
            let mut targets = block.children();
            while let Some(target) = targets.next()? {
                if target.local_name() != tags::TO {
                    continue;
                }
                let target_type = target.required_attr("fullname")?;
                has_targets = true;
                if let Some(owner) = &owner {
                    run.cache
                        .record_type_reference(&source_type, owner.clone(), target_type);
                    stats.type_references += 1;
                }
            }

            if owner.is_none() && has_targets {
                run.diagnostics
                    .unresolved_type(&source_type, &from.display_name());
            }
        }
        Ok(())
    }
}
