//! # clrdeps: Dependency Graphs from .NET Dependency Reports
//!
//! Reads the XML report a dependency-parser tool writes for a compiled
//! assembly and turns it into a multi-level dependency graph attached to a
//! resource tree:
//!
//! - **Project edges** from explicit assembly `References`
//! - **Folder edges** rolled up from type-level references
//! - **File edges** from individual type references, each linked to its
//!   enclosing folder edge
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                 API (analyzer, sensor, results)              │
//! ├──────────────────────────────────────────────────────────────┤
//! │  Report          │  Graph              │  Core               │
//! │ • Reader         │ • Identity resolver │ • Resource tree     │
//! │ • Cursors        │ • Cache             │ • Config            │
//! │                  │ • Builder / rollup  │ • Errors            │
//! ├──────────────────────────────────────────────────────────────┤
//! │  I/O: solution manifests, serialized dependency reports     │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use clrdeps::{DependencyAnalyzer, EdgeLog, SolutionManifest};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manifest = SolutionManifest::from_file(Path::new("solution.yaml"))?;
//!     let (mut tree, types) = manifest.build()?;
//!
//!     let mut edges = EdgeLog::new();
//!     let outcome = DependencyAnalyzer::default().analyze_report(
//!         &manifest.module_key("Shop.Core"),
//!         Path::new("dependencyparser-report.xml"),
//!         &mut tree,
//!         &types,
//!         &mut edges,
//!     )?;
//!
//!     println!("{} edges, {} diagnostics", edges.len(), outcome.diagnostics.len());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Core types: resources, configuration, errors and diagnostics
pub mod core {
    pub mod config;
    pub mod diagnostics;
    pub mod errors;
    pub mod resource;
    pub mod tree;
}

pub mod graph;
pub mod report;

/// Solution manifests and serialized output
pub mod io {
    pub mod manifest;
    pub mod reports;
}

/// Public analysis API
pub mod api {
    pub mod engine;
    pub mod results;
    pub mod sensor;
}

pub use api::engine::DependencyAnalyzer;
pub use api::results::{AnalysisOutcome, AnalysisStats, EdgeRecord};
pub use api::sensor::{DependencySensor, ModuleTarget, SensorReport};
pub use core::config::ClrdepsConfig;
pub use core::diagnostics::{Diagnostic, Diagnostics};
pub use core::errors::{ClrdepsError, Result, ResultExt};
pub use core::resource::{ResourceIdentity, ResourceKey, ResourceTree, TypeBridge};
pub use core::tree::{InMemoryTree, TypeIndex};
pub use graph::{DependencyEdge, EdgeLevel, EdgeLog, EdgeSink, Usage};
pub use io::manifest::SolutionManifest;
pub use io::reports::{DependencyReport, OutputFormat};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
