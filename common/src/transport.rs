//! External copy mechanism: a recursive `scp` invocation.

use anyhow::Context;

/// Recursively copy `src` to the remote destination spec via `scp -r`.
pub async fn scp(src: std::path::PathBuf, dst: std::ffi::OsString) -> anyhow::Result<()> {
    let status = tokio::process::Command::new("scp")
        .arg("-r")
        .arg(&src)
        .arg(&dst)
        .status()
        .await
        .with_context(|| format!("failed to run scp for {:?}", &src))?;
    if !status.success() {
        anyhow::bail!("scp {:?} -> {:?} exited with {}", &src, &dst, status);
    }
    Ok(())
}
