use camino::Utf8PathBuf;

use kira_expression::domain::GeoSeriesAccession;
use kira_expression::store::Workspace;

fn workspace(root: &std::path::Path) -> Workspace {
    let root = Utf8PathBuf::from_path_buf(root.to_path_buf()).unwrap();
    Workspace::new_with_paths(
        root.join("data"),
        root.join("results"),
        root.join("logs/kira-expr.log"),
        None,
    )
}

#[test]
fn layout_paths() {
    let temp = tempfile::tempdir().unwrap();
    let workspace = workspace(temp.path());
    let acc: GeoSeriesAccession = "GSE102902".parse().unwrap();

    assert!(
        workspace
            .project_soft_path(&acc)
            .ends_with("data/GSE102902_family.soft.gz")
    );
    assert_eq!(workspace.cache_soft_path(&acc), None);
    assert!(workspace.histogram_path().ends_with("results/hist_expression.png"));
    assert!(workspace.heatmap_path().ends_with("results/heatmap_clustering.png"));
}

#[test]
fn ensure_dirs_create_layout() {
    let temp = tempfile::tempdir().unwrap();
    let workspace = workspace(temp.path());

    workspace.ensure_results_dir().unwrap();
    workspace.ensure_log_dir().unwrap();
    workspace.ensure_data_dir().unwrap();

    assert!(workspace.results_dir().as_std_path().is_dir());
    assert!(temp.path().join("logs").is_dir());
    assert!(workspace.data_dir().as_std_path().is_dir());
}

#[test]
fn copy_file_atomic_creates_parent() {
    let temp = tempfile::tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
    let source = root.join("source.bin");
    std::fs::write(source.as_std_path(), b"payload").unwrap();
    let dest = root.join("nested/dir/copy.bin");

    Workspace::copy_file_atomic(&source, &dest).unwrap();

    assert_eq!(std::fs::read(dest.as_std_path()).unwrap(), b"payload");
    assert!(!root.join("nested/dir/copy.bin.tmp").as_std_path().exists());
}
