//! End-to-end tests for report ingestion over the `shop` fixture solution.
//!
//! The fixture has three modules. `Shop.Core` and `Shop.Data` ship a report,
//! `Shop.Web` does not.

use std::fs;
use std::path::{Path, PathBuf};

use clrdeps::api::sensor::ModuleTarget;
use clrdeps::core::config::DependencyConfig;
use clrdeps::core::diagnostics::{Diagnostic, ReferenceKind};
use clrdeps::{
    ClrdepsError, DependencyAnalyzer, DependencyReport, DependencySensor, EdgeLevel, EdgeLog,
    InMemoryTree, ResourceKey, SensorReport, SolutionManifest, TypeIndex, Usage,
};
use tempfile::tempdir;

fn fixture_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/shop")
}

fn load_shop() -> (SolutionManifest, InMemoryTree, TypeIndex, Vec<ModuleTarget>) {
    let manifest = SolutionManifest::from_file(&fixture_dir().join("solution.yaml")).unwrap();
    let (tree, types) = manifest.build().unwrap();
    let targets = manifest.module_targets(&fixture_dir());
    (manifest, tree, types, targets)
}

fn analyze_shop(config: DependencyConfig) -> (SensorReport, EdgeLog) {
    let (_, mut tree, types, targets) = load_shop();
    let sensor = DependencySensor::new(config).unwrap();
    let mut edges = EdgeLog::new();
    let report = sensor
        .analyse_modules(&targets, &mut tree, &types, &mut edges)
        .unwrap();
    (report, edges)
}

fn endpoints(edges: &EdgeLog, level: EdgeLevel) -> Vec<(String, String, u32)> {
    edges
        .at_level(level)
        .into_iter()
        .map(|edge| {
            (
                edge.from.key().to_string(),
                edge.to.key().to_string(),
                edge.weight,
            )
        })
        .collect()
}

#[test]
fn test_solution_analysis_produces_all_levels() {
    let (report, edges) = analyze_shop(DependencyConfig::default());

    assert_eq!(report.outcomes.len(), 2);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].project, ResourceKey::new("acme:Shop.Web"));
    assert!(report.skipped[0].reason.contains("Cannot find dependency report file"));

    let projects = endpoints(&edges, EdgeLevel::Project);
    assert_eq!(
        projects,
        vec![
            ("acme:Shop.Core".to_string(), "acme:Shop.Data".to_string(), 3),
            (
                "acme:Shop.Core".to_string(),
                "lib:Newtonsoft.Json:13.0.0.0".to_string(),
                1
            ),
            (
                "acme:Shop.Data".to_string(),
                "lib:EntityFramework:6.0.0.0".to_string(),
                1
            ),
        ]
    );

    let folders = endpoints(&edges, EdgeLevel::Folder);
    assert_eq!(
        folders,
        vec![
            (
                "acme:Shop.Core:Model".to_string(),
                "acme:Shop.Data:Entities".to_string(),
                1
            ),
            (
                "acme:Shop.Core:Services".to_string(),
                "acme:Shop.Data:Repositories".to_string(),
                1
            ),
            (
                "acme:Shop.Data:Repositories".to_string(),
                "acme:Shop.Data:Entities".to_string(),
                1
            ),
        ]
    );

    let files = edges.at_level(EdgeLevel::File);
    assert_eq!(files.len(), 3);
    assert!(files.iter().all(|edge| edge.usage == Usage::Uses));
    assert!(edges
        .at_level(EdgeLevel::Project)
        .iter()
        .all(|edge| edge.usage == Usage::Compile));
}

#[test]
fn test_every_parent_is_recorded_before_its_children() {
    let (_, edges) = analyze_shop(DependencyConfig::default());

    assert!(edges.parents_precede_children());
    for edge in edges.at_level(EdgeLevel::File) {
        let folder = edges.get(edge.parent.unwrap()).unwrap();
        assert_eq!(folder.level, EdgeLevel::Folder);
        match folder.parent {
            Some(project) => assert_eq!(edges.get(project).unwrap().level, EdgeLevel::Project),
            None => {
                assert!(folder.from.key().as_str().starts_with("acme:Shop.Data:"));
                assert!(folder.to.key().as_str().starts_with("acme:Shop.Data:"));
            }
        }
    }
}

#[test]
fn test_edge_ids_are_unique_across_modules() {
    let (report, edges) = analyze_shop(DependencyConfig::default());
    let distinct: usize = report.outcomes.iter().map(|o| o.stats.total_edges()).sum();
    assert_eq!(edges.len(), distinct);
}

#[test]
fn test_assemblies_of_other_projects_are_ignored() {
    let (report, edges) = analyze_shop(DependencyConfig::default());

    let core = &report.outcomes[0];
    assert_eq!(core.project, ResourceKey::new("acme:Shop.Core"));
    assert_eq!(core.stats.assemblies, 2);
    assert_eq!(core.stats.skipped_assemblies, 1);

    assert!(!edges
        .edges()
        .any(|edge| edge.from.key().as_str() == "acme:Shop.Data"
            && edge.to.key().as_str() == "acme:Shop.Core"));
}

#[test]
fn test_unresolved_target_is_diagnosed() {
    let (report, _) = analyze_shop(DependencyConfig::default());

    let core = &report.outcomes[0];
    assert_eq!(
        core.diagnostics,
        vec![Diagnostic::UnresolvedReference {
            reference: ReferenceKind::Type,
            name: "System.String".to_string(),
            referenced_from: "Shop.Core.Order".to_string(),
        }]
    );

    let data = &report.outcomes[1];
    assert!(data.is_clean());
}

#[test]
fn test_folders_of_one_project_are_linked() {
    let (report, edges) = analyze_shop(DependencyConfig::default());

    let data = &report.outcomes[1];
    assert_eq!(data.stats.folder_edges, 1);
    assert_eq!(data.stats.file_edges, 1);
    assert_eq!(data.stats.skipped_type_references, 0);

    let folder = edges
        .at_level(EdgeLevel::Folder)
        .into_iter()
        .find(|edge| edge.from.key().as_str() == "acme:Shop.Data:Repositories")
        .unwrap();
    assert_eq!(folder.to.key().as_str(), "acme:Shop.Data:Entities");
    assert_eq!(folder.parent, None);

    let file = edges
        .at_level(EdgeLevel::File)
        .into_iter()
        .find(|edge| edge.parent == Some(folder.id))
        .unwrap();
    assert_eq!(
        file.from.key().as_str(),
        "acme:Shop.Data:Repositories/OrderRepository.cs"
    );
    assert_eq!(file.to.key().as_str(), "acme:Shop.Data:Entities/OrderEntity.cs");
}

#[test]
fn test_type_rollup_can_be_disabled() {
    let config = DependencyConfig {
        type_rollup: false,
        ..DependencyConfig::default()
    };
    let (report, edges) = analyze_shop(config);

    assert!(edges.at_level(EdgeLevel::Folder).is_empty());
    assert!(edges.at_level(EdgeLevel::File).is_empty());
    assert_eq!(edges.at_level(EdgeLevel::Project)[0].weight, 1);
    assert!(report.outcomes.iter().all(|outcome| outcome.is_clean()));
}

#[test]
fn test_malformed_report_emits_no_edges() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.xml");
    fs::write(
        &path,
        r#"<Dependencies><Assembly name="Shop.Core" version="1.0.0.0"><References>
             <Reference name="Shop.Data" version="1.0.0.0"/>
           </References>"#,
    )
    .unwrap();

    let (manifest, mut tree, types, _) = load_shop();
    let mut edges = EdgeLog::new();
    let result = DependencyAnalyzer::default().analyze_report(
        &manifest.module_key("Shop.Core"),
        &path,
        &mut tree,
        &types,
        &mut edges,
    );

    assert!(matches!(result, Err(ClrdepsError::MalformedReport { .. })));
    assert!(edges.is_empty());
}

#[test]
fn test_legacy_encoded_report() {
    let dir = tempdir().unwrap();
    let manifest_path = dir.path().join("solution.yaml");
    fs::write(
        &manifest_path,
        "solution: {key: 'acme:Caf\u{e9}'}\nmodules:\n  - name: Caf\u{e9}.Core\n    base_dir: core\n",
    )
    .unwrap();

    let core = dir.path().join("core");
    fs::create_dir_all(&core).unwrap();
    let mut xml = b"<?xml version=\"1.0\" encoding=\"windows-1252\"?><Dependencies><Assembly name=\"Caf".to_vec();
    xml.push(0xE9);
    xml.extend_from_slice(
        b".Core\" version=\"1.0\"><References><Reference name=\"Log4Net\" version=\"2.0\"/></References></Assembly></Dependencies>",
    );
    fs::write(core.join("dependencyparser-report.xml"), xml).unwrap();

    let manifest = SolutionManifest::from_file(&manifest_path).unwrap();
    let (mut tree, types) = manifest.build().unwrap();
    let sensor = DependencySensor::new(DependencyConfig {
        encoding: "windows-1252".to_string(),
        ..DependencyConfig::default()
    })
    .unwrap();

    let mut edges = EdgeLog::new();
    let report = sensor
        .analyse_modules(&manifest.module_targets(dir.path()), &mut tree, &types, &mut edges)
        .unwrap();

    assert_eq!(report.outcomes.len(), 1);
    let projects = endpoints(&edges, EdgeLevel::Project);
    assert_eq!(
        projects,
        vec![("acme:Caf\u{e9}.Core".to_string(), "lib:Log4Net:2.0".to_string(), 1)]
    );
}

#[test]
fn test_dependency_report_serializes_edges() {
    let (manifest, _, _, _) = load_shop();
    let (report, edges) = analyze_shop(DependencyConfig::default());

    let output = DependencyReport::new(manifest.solution_key(), report, &edges);
    assert_eq!(output.edges.len(), edges.len());
    assert_eq!(output.totals.project_edges, 3);

    let json: serde_json::Value =
        serde_json::from_str(&output.render(clrdeps::OutputFormat::Json).unwrap()).unwrap();
    assert_eq!(json["solution"], "acme:Shop");
    assert_eq!(json["skipped"][0]["project"], "acme:Shop.Web");
}
