use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use eyre::{bail, WrapErr};
use std::io::{Cursor, Write};
use std::path::Path;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;

/// Zipped function package together with the digest Lambda reports for it
#[derive(Debug, Clone)]
pub struct Package {
    /// Base64-encoded SHA-256 of the archive, the CodeSha256 format
    pub digest: String,

    pub bytes: Vec<u8>,
}

impl Package {
    /// Archive a function directory into an in-memory zip, no
    /// intermediate file is written
    ///
    /// The zip crate has no async support, so the work runs on a
    /// blocking task.
    pub async fn from_dir(dir: &Path) -> eyre::Result<Package> {
        let dir = dir.to_path_buf();

        tokio::task::spawn_blocking(move || Package::from_dir_sync(&dir))
            .await
            .wrap_err("Failed to spawn the blocking task")?
    }

    pub fn from_dir_sync(dir: &Path) -> eyre::Result<Package> {
        let bytes = zip_dir(dir)?;
        let digest = digest(&bytes)?;

        Ok(Package { digest, bytes })
    }
}

/// Base64 of the raw SHA-256 bytes, matching what Lambda reports as
/// CodeSha256 for uploaded code
fn digest(bytes: &[u8]) -> eyre::Result<String> {
    let raw = hex::decode(sha256::digest(bytes)).wrap_err("Malformed digest")?;
    Ok(STANDARD.encode(raw))
}

fn zip_dir(dir: &Path) -> eyre::Result<Vec<u8>> {
    if !dir.is_dir() {
        bail!("Package directory {dir:?} does not exist");
    }

    // Fixed timestamp so identical contents produce identical archives
    let options = SimpleFileOptions::default().last_modified_time(zip::DateTime::default());

    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let mut count = 0usize;

    // Entries are walked in a stable order for the same reason
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.wrap_err("Failed to walk the package directory")?;
        let path = entry.path();

        if path == dir {
            continue;
        }

        let relative = path
            .strip_prefix(dir)
            .wrap_err("Entry outside of the package directory")?
            .to_string_lossy()
            .replace('\\', "/");

        if entry.file_type().is_dir() {
            zip.add_directory(format!("{relative}/"), options)
                .wrap_err("Could not add a directory to the ZIP file")?;
            continue;
        }

        zip.start_file(relative.as_str(), options)
            .wrap_err("Could not open ZIP file")?;

        let contents =
            std::fs::read(path).wrap_err_with(|| format!("Could not read {path:?}"))?;

        zip.write_all(&contents).wrap_err("Could not write to ZIP file")?;
        count += 1;
    }

    if count == 0 {
        bail!("Package directory {dir:?} has no files");
    }

    let cursor = zip.finish().wrap_err("Could not close ZIP file")?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fixture(files: &[(&str, &str)]) -> TempDir {
        let dir = tempfile::tempdir().unwrap();

        for (name, contents) in files {
            let path = dir.path().join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, contents).unwrap();
        }

        dir
    }

    #[test]
    fn same_contents_produce_the_same_digest() {
        let files = [
            ("bootstrap", "fn main() {}"),
            ("assets/greeting.txt", "hello"),
        ];
        let first = fixture(&files);
        let second = fixture(&files);

        assert_eq!(
            Package::from_dir_sync(first.path()).unwrap().digest,
            Package::from_dir_sync(second.path()).unwrap().digest,
        );
    }

    #[test]
    fn different_contents_produce_different_digests() {
        let first = fixture(&[("bootstrap", "fn main() {}")]);
        let second = fixture(&[("bootstrap", "fn main() { println!(); }")]);

        assert_ne!(
            Package::from_dir_sync(first.path()).unwrap().digest,
            Package::from_dir_sync(second.path()).unwrap().digest,
        );
    }

    #[test]
    fn digest_is_base64_of_a_sha256() {
        let dir = fixture(&[("bootstrap", "fn main() {}")]);
        let package = Package::from_dir_sync(dir.path()).unwrap();

        // 32 raw bytes always encode to 44 characters with one pad
        assert_eq!(package.digest.len(), 44);
        assert!(package.digest.ends_with('='));
    }

    #[test]
    fn rejects_an_empty_directory() {
        let dir = tempfile::tempdir().unwrap();

        assert!(Package::from_dir_sync(dir.path()).is_err());
    }

    #[test]
    fn rejects_a_missing_directory() {
        let dir = tempfile::tempdir().unwrap();

        assert!(Package::from_dir_sync(&dir.path().join("nope")).is_err());
    }
}
