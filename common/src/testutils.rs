/// Create a source tree for scanner and mirror tests:
///
/// src
/// |- a.txt      (10 bytes)
/// |- sub
///    |- b.txt
///
/// The `TempDir` must be kept alive for the duration of the test.
#[cfg(test)]
pub async fn setup_source() -> anyhow::Result<(tempfile::TempDir, std::path::PathBuf)> {
    let tmp_dir = tempfile::tempdir()?;
    let root = tmp_dir.path().join("src");
    tokio::fs::create_dir(&root).await?;
    tokio::fs::write(root.join("a.txt"), "0123456789").await?;
    let sub = root.join("sub");
    tokio::fs::create_dir(&sub).await?;
    tokio::fs::write(sub.join("b.txt"), "b").await?;
    Ok((tmp_dir, root))
}
