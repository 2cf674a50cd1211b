use std::fs;

use solid_context_core::config::DiscoverConfig;
use solid_context_core::contract::Downloader;
use solid_context_core::discover::Discoverer;
use solid_context_core::download::{DownloadConfig, GitDownloader, LocalSource, SourceAction};
use solid_context_core::transform::transform_all;
use tempfile::tempdir;

#[tokio::test]
async fn test_local_sources_feed_discovery_and_transform() {
    let tmp = tempdir().unwrap();
    let checkout = tmp.path().join("checkouts").join("router-docs");
    fs::create_dir_all(checkout.join("src/components")).unwrap();
    fs::create_dir_all(checkout.join("node_modules/dep")).unwrap();
    fs::write(checkout.join("README.md"), "# Router\n").unwrap();
    fs::write(
        checkout.join("src/components/A.ts"),
        "/** Renders a link. */\nexport function A() {}\n",
    )
    .unwrap();
    fs::write(checkout.join("src/components/A.spec.ts"), "/** test */").unwrap();
    fs::write(checkout.join("node_modules/dep/README.md"), "# dep").unwrap();

    let downloader = GitDownloader::new(DownloadConfig {
        sources_dir: tmp.path().join("raw_sources"),
        sources: vec![SourceAction::Local(LocalSource {
            name: "solid-router".to_string(),
            path: checkout.clone(),
        })],
        offline: false,
    });
    let manifest = downloader
        .download_all()
        .await
        .expect("download should succeed");
    assert_eq!(manifest.sources.len(), 1);
    assert_eq!(manifest.sources[0].local_path, checkout);

    let descriptors = Discoverer::new(&DiscoverConfig::default())
        .unwrap()
        .discover(&manifest);
    let rels: Vec<_> = descriptors.iter().map(|d| d.relative_path.as_str()).collect();
    assert_eq!(rels, ["solid-router/README.md", "solid-router/src/components/A.ts"]);

    let batch = transform_all(&descriptors);
    assert_eq!(batch.files.len(), 2);
    assert_eq!(batch.dropped, 0);
    assert!(batch.files[1]
        .content
        .ends_with("## API Documentation 1\n\nRenders a link.\n"));
    assert!(batch
        .files
        .iter()
        .all(|f| f.metadata.source_repo == "solid-router"));
}
