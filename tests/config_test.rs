//! Layered configuration feeding the sort passes

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;

use pomsort::application::services::WriteMode;
use pomsort::config::{env_source, local_config_path, Settings};
use pomsort::domain::{PassKind, SectionOutcome, DEPENDENCY_VERSION_BANNER};
use pomsort::infrastructure::di::ServiceContainer;
use pomsort::infrastructure::traits::RealFileSystem;
use pomsort::util::testing::{init_test_setup, pom, write_pom};

const PROPERTIES: &str = "    <properties>
        <kotlin.version>2.0.0</kotlin.version>
        <java.version>17</java.version>
        <guava.version>33.0</guava.version>
    </properties>";

fn load(global: Option<&Path>, local: Option<&Path>) -> Settings {
    Settings::load_layers(global, local, env_source().source(Some(HashMap::new()))).unwrap()
}

fn sort_properties(settings: Settings, project: &Path) -> (SectionOutcome, String) {
    let path = write_pom(project, &pom(PROPERTIES));
    let container = ServiceContainer::with_deps(settings, Arc::new(RealFileSystem));
    let report = container
        .sort_service
        .sort_path(&path, &[PassKind::Properties], None, WriteMode::DryRun)
        .unwrap();
    (report.passes[0].outcome, report.output.unwrap())
}

#[test]
fn given_local_negation_when_sorting_then_unexcluded_property_moves() {
    // Arrange
    init_test_setup();
    let temp = TempDir::new().unwrap();
    std::fs::write(
        local_config_path(temp.path()),
        "[properties]\nexcluded = [\"!java.version\"]\n",
    )
    .unwrap();
    let settings = load(None, Some(&local_config_path(temp.path())));

    // Act
    let (outcome, output) = sort_properties(settings, temp.path());

    // Assert: kotlin stays, guava and java are sorted below the banner
    assert_eq!(outcome, SectionOutcome::Rebuilt { sorted: 2, kept: 1 });
    let kotlin = output.find("<kotlin.version>").unwrap();
    let banner = output.find(DEPENDENCY_VERSION_BANNER).unwrap();
    let guava = output.find("<guava.version>").unwrap();
    let java = output.find("<java.version>").unwrap();
    assert!(kotlin < banner && banner < guava && guava < java, "{}", output);
}

#[test]
fn given_global_replace_and_local_union_when_sorting_then_both_apply() {
    init_test_setup();
    let config_dir = TempDir::new().unwrap();
    let global = config_dir.path().join("pomsort.toml");
    std::fs::write(
        &global,
        "[properties]\nexcluded = [\"guava.version\"]\ndependency_banner = \" libraries \"\n",
    )
    .unwrap();
    let project = TempDir::new().unwrap();
    let local = local_config_path(project.path());
    std::fs::write(&local, "[properties]\nexcluded = [\"java.version\"]\n").unwrap();

    let settings = load(Some(&global), Some(&local));
    assert_eq!(
        settings.properties.excluded,
        vec!["guava.version".to_string(), "java.version".to_string()]
    );

    let (outcome, output) = sort_properties(settings, project.path());

    // kotlin.version is no longer excluded once the global list replaced the defaults
    assert_eq!(outcome, SectionOutcome::Rebuilt { sorted: 1, kept: 2 });
    assert!(
        output.contains("<!-- libraries -->\n        <kotlin.version>2.0.0</kotlin.version>"),
        "{}",
        output
    );
}

#[test]
fn given_bare_tag_locator_when_sorting_then_finds_nested_section() {
    init_test_setup();
    let temp = TempDir::new().unwrap();
    let path = write_pom(
        temp.path(),
        &pom("    <profiles>
        <profile>
            <dependencies>
                <dependency>
                    <groupId>b</groupId>
                    <artifactId>b</artifactId>
                </dependency>
                <dependency>
                    <groupId>a</groupId>
                    <artifactId>a</artifactId>
                </dependency>
            </dependencies>
        </profile>
    </profiles>"),
    );
    let settings = load(None, None);
    let mut custom = settings.clone();
    custom.sections.dependencies = "dependencies".into();

    let default_report = ServiceContainer::with_deps(settings, Arc::new(RealFileSystem))
        .sort_service
        .sort_path(&path, &[PassKind::Dependencies], None, WriteMode::DryRun)
        .unwrap();
    let custom_report = ServiceContainer::with_deps(custom, Arc::new(RealFileSystem))
        .sort_service
        .sort_path(&path, &[PassKind::Dependencies], None, WriteMode::DryRun)
        .unwrap();

    assert!(matches!(
        default_report.passes[0].outcome,
        SectionOutcome::Absent(_)
    ));
    assert_eq!(
        custom_report.passes[0].outcome,
        SectionOutcome::Rebuilt { sorted: 2, kept: 0 }
    );
}
