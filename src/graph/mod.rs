//! Dependency graph construction.
//!
//! One report is processed in two phases sharing a [`RunScope`]:
//!
//! 1. [`GraphBuilder::build`] streams the report, resolving assembly names
//!    through the [`IdentityResolver`], merging project-level edges into the
//!    [`DependencyCache`] and buffering type references.
//! 2. [`roll_up`] resolves the buffered target types and derives folder and
//!    file edges, linking each to its parent edge one level up.
//!
//! All edges are staged in the scope's journal and only reach the caller's
//! [`EdgeSink`] through [`RunScope::commit`].

pub mod builder;
pub mod cache;
pub mod resolver;
pub mod rollup;
pub mod run;
pub mod sink;
pub mod types;

pub use builder::{BuildStats, GraphBuilder};
pub use cache::{DependencyCache, TypeDependencies};
pub use resolver::IdentityResolver;
pub use rollup::{roll_up, RollupStats};
pub use run::RunScope;
pub use sink::{EdgeJournal, EdgeLog, EdgeSink};
pub use types::{DependencyEdge, EdgeId, EdgeKey, EdgeLevel, Usage};
