use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use solid_context_core::config::{SynchroniseConfig, ValidationConfig};
use solid_context_core::contract::{
    Domain, DownloadError, DownloadedManifest, DownloadedSource, MockDownloader, MockPublisher,
    PublishError,
};
use solid_context_core::synchronise::{synchronise, SyncError};
use tempfile::{tempdir, TempDir};

type Written = Arc<Mutex<Vec<(PathBuf, String)>>>;

fn write_fixture(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// Three checked-out repositories with one candidate file that gets dropped.
fn fixture() -> (TempDir, DownloadedManifest) {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    write_fixture(
        root,
        "signals/src/core/effect.ts",
        "/**\n * Effects are the leaf nodes of the reactive graph.\n */\nexport class Effect {}\n",
    );
    write_fixture(root, "signals/src/core/plain.ts", "export const x = 1;\n");
    write_fixture(
        root,
        "solid-docs/src/routes/guides/state.mdx",
        "---\ntitle: State\n---\n# State\n\n<Callout>hidden</Callout>\n\nUse stores.\n",
    );
    write_fixture(
        root,
        "solid/docs/createSignal.md",
        "# createSignal\n\nexport function createSignal() {}\n",
    );

    let manifest = DownloadedManifest {
        sources: ["signals", "solid-docs", "solid"]
            .iter()
            .map(|name| DownloadedSource {
                name: name.to_string(),
                local_path: root.join(name),
            })
            .collect(),
    };
    (tmp, manifest)
}

fn downloader_returning(manifest: DownloadedManifest) -> MockDownloader {
    let mut downloader = MockDownloader::new();
    downloader
        .expect_download_all()
        .times(1)
        .return_once(move || Ok(manifest));
    downloader
}

fn recording_publisher(written: Written) -> MockPublisher {
    let mut publisher = MockPublisher::new();
    publisher
        .expect_root_name()
        .returning(|| "ai_docs".to_string());
    publisher.expect_reset().times(1).returning(|| Ok(()));
    publisher.expect_write().returning(move |path, contents| {
        written
            .lock()
            .unwrap()
            .push((path.to_path_buf(), contents.to_string()));
        Ok(())
    });
    publisher
}

fn find<'a>(written: &'a [(PathBuf, String)], path: &str) -> &'a str {
    written
        .iter()
        .find(|(p, _)| p == Path::new(path))
        .map(|(_, c)| c.as_str())
        .unwrap_or_else(|| panic!("{path} was not written"))
}

#[tokio::test]
async fn test_synchronise_writes_documents_and_indexes() {
    let (_tmp, manifest) = fixture();
    let written: Written = Arc::default();
    let downloader = downloader_returning(manifest);
    let publisher = recording_publisher(written.clone());

    let report = synchronise(&SynchroniseConfig::default(), &downloader, &publisher)
        .await
        .expect("synchronise should succeed");

    assert_eq!(report.repositories, 3);
    assert_eq!(report.discovered, 4);
    assert_eq!(report.transformed, 3);
    assert_eq!(report.dropped, 1);
    assert_eq!(report.failed, 0);
    assert_eq!(report.fallback_classified, 0);
    assert_eq!(report.written, 7);
    assert_eq!(report.write_failures, 0);
    assert_eq!(report.stats[&Domain::CoreReactivity].api, 2);
    assert_eq!(report.stats[&Domain::Routing].examples, 1);
    assert!(!report.validation.passed);

    let written = written.lock().unwrap();
    let paths: Vec<_> = written.iter().map(|(p, _)| p.clone()).collect();
    assert_eq!(
        paths,
        [
            PathBuf::from("core-reactivity/api/effect.ts"),
            PathBuf::from("routing/examples/state.mdx"),
            PathBuf::from("core-reactivity/api/createsignal.md"),
            PathBuf::from("index.md"),
            PathBuf::from("core-reactivity/index.json"),
            PathBuf::from("routing/index.json"),
            PathBuf::from("STRUCTURE.md"),
        ]
    );

    let effect = find(&written, "core-reactivity/api/effect.ts");
    assert!(effect.starts_with("---\nsource_repo: signals\nsource_path: signals/src/core/effect.ts\ndomain: core-reactivity\n"));
    assert!(effect.ends_with("---\n\n## API Documentation 1\n\nEffects are the leaf nodes of the reactive graph.\n"));

    let state = find(&written, "routing/examples/state.mdx");
    assert!(state.starts_with("---\ntitle: State\nsource_repo: solid-docs\n"));
    assert!(state.ends_with("---\n\n# State\n\nUse stores."));

    let signal = find(&written, "core-reactivity/api/createsignal.md");
    assert!(signal.contains("\nprimitive: createSignal\n---\n\n# createSignal"));

    let index: serde_json::Value =
        serde_json::from_str(find(&written, "core-reactivity/index.json")).unwrap();
    assert_eq!(index["stats"]["api"], 2);
    assert_eq!(index["content"]["api"][1]["primitive"], "createSignal");

    assert!(find(&written, "index.md").contains("- **Covered (1/27)**: createSignal\n"));
    assert!(find(&written, "STRUCTURE.md").contains("ai_docs/\n"));
}

#[tokio::test]
async fn test_strict_validation_failure_writes_nothing() {
    let (_tmp, manifest) = fixture();
    let downloader = downloader_returning(manifest);
    let mut publisher = MockPublisher::new();
    publisher.expect_reset().times(0);
    publisher.expect_write().times(0);

    let config = SynchroniseConfig {
        validation: ValidationConfig { strict: true },
        ..SynchroniseConfig::default()
    };
    let res = synchronise(&config, &downloader, &publisher).await;
    match res {
        Err(SyncError::Validation { missing, issues }) => {
            assert!(missing > 0);
            assert_eq!(issues, 0);
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_write_failures_are_counted_not_fatal() {
    let (_tmp, manifest) = fixture();
    let downloader = downloader_returning(manifest);
    let mut publisher = MockPublisher::new();
    publisher
        .expect_root_name()
        .returning(|| "out".to_string());
    publisher.expect_reset().returning(|| Ok(()));
    publisher.expect_write().returning(|path, _| {
        if path.extension().is_some_and(|e| e == "json") {
            Err(PublishError::Write {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
            })
        } else {
            Ok(())
        }
    });

    let report = synchronise(&SynchroniseConfig::default(), &downloader, &publisher)
        .await
        .unwrap();
    assert_eq!(report.write_failures, 2);
    assert_eq!(report.written, 5);
}

#[tokio::test]
async fn test_reset_failure_aborts() {
    let (_tmp, manifest) = fixture();
    let downloader = downloader_returning(manifest);
    let mut publisher = MockPublisher::new();
    publisher.expect_reset().returning(|| {
        Err(PublishError::Reset {
            path: PathBuf::from("ai_docs"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        })
    });
    publisher.expect_write().times(0);

    let res = synchronise(&SynchroniseConfig::default(), &downloader, &publisher).await;
    assert!(matches!(res, Err(SyncError::Reset(_))));
}

#[tokio::test]
async fn test_download_failure_aborts() {
    let mut downloader = MockDownloader::new();
    downloader.expect_download_all().return_once(|| {
        Err(DownloadError::SourcesDir {
            path: PathBuf::from("raw_sources"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        })
    });
    let mut publisher = MockPublisher::new();
    publisher.expect_reset().times(0);

    let res = synchronise(&SynchroniseConfig::default(), &downloader, &publisher).await;
    assert!(matches!(res, Err(SyncError::Download(_))));
}

#[tokio::test]
async fn test_empty_manifest_still_publishes_indexes() {
    let downloader = downloader_returning(DownloadedManifest::default());
    let written: Written = Arc::default();
    let publisher = recording_publisher(written.clone());

    let report = synchronise(&SynchroniseConfig::default(), &downloader, &publisher)
        .await
        .unwrap();
    assert_eq!(report.transformed, 0);
    assert!(report.stats.is_empty());
    let paths: Vec<_> = written.lock().unwrap().iter().map(|(p, _)| p.clone()).collect();
    assert_eq!(paths, [PathBuf::from("index.md"), PathBuf::from("STRUCTURE.md")]);
}
