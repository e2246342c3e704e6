use docpilot_cli::ensure_docs_dir;
use tempfile::TempDir;

#[test]
fn docs_dir_must_exist() {
    let tmp = TempDir::new().unwrap();
    assert!(ensure_docs_dir(tmp.path()).is_ok());

    let err = ensure_docs_dir(&tmp.path().join("absent")).unwrap_err();
    assert!(err.to_string().contains("does not exist"));

    let file = tmp.path().join("readme.md");
    std::fs::write(&file, "# Hi\n").unwrap();
    assert!(ensure_docs_dir(&file).is_err());
}
