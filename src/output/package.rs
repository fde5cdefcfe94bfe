//! ZIP packaging of a split run.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

use crate::error::{Error, Result};

/// Pack every file under `run_dir` into `archive`, then remove `run_dir`.
///
/// Entry names are relative to `run_dir` and use `/` separators.
pub fn package_run(run_dir: &Path, archive: &Path) -> Result<PathBuf> {
    let zip_err = |e: zip::result::ZipError| Error::ZipWrite {
        path: archive.to_path_buf(),
        source: e,
    };

    let mut files = Vec::new();
    collect_files(run_dir, &mut files)?;
    files.sort();

    let file = File::create(archive).map_err(|e| zip_err(e.into()))?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for path in &files {
        let name = entry_name(run_dir, path);
        debug!("Adding {name} to archive");
        writer.start_file(name, options).map_err(zip_err)?;
        let mut source = File::open(path)?;
        io::copy(&mut source, &mut writer)?;
    }
    writer.finish().map_err(zip_err)?;

    fs::remove_dir_all(run_dir)?;
    info!(
        "Packaged {} file(s) into {}",
        files.len(),
        archive.display()
    );
    Ok(archive.to_path_buf())
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(&path, files)?;
        } else {
            files.push(path);
        }
    }
    Ok(())
}

fn entry_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_entry_name_is_relative() {
        let name = entry_name(Path::new("/out/run"), Path::new("/out/run/Clockwise/a_cw.wav"));
        assert_eq!(name, "Clockwise/a_cw.wav");
    }

    #[test]
    fn test_package_run_archives_and_removes_dir() {
        let dir = TempDir::new().unwrap();
        let run = dir.path().join("batch_x");
        fs::create_dir_all(run.join("Clockwise")).unwrap();
        fs::create_dir_all(run.join("Anticlockwise")).unwrap();
        fs::write(run.join("Clockwise/a_cw.wav"), b"first").unwrap();
        fs::write(run.join("Anticlockwise/a_acw.wav"), b"second").unwrap();

        let archive = dir.path().join("processed_audio_x.zip");
        package_run(&run, &archive).unwrap();
        assert!(!run.exists());

        let mut zip = zip::ZipArchive::new(File::open(&archive).unwrap()).unwrap();
        assert_eq!(zip.len(), 2);
        let mut names: Vec<String> = zip.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(names, vec!["Anticlockwise/a_acw.wav", "Clockwise/a_cw.wav"]);

        let mut contents = String::new();
        io::Read::read_to_string(&mut zip.by_name("Clockwise/a_cw.wav").unwrap(), &mut contents)
            .unwrap();
        assert_eq!(contents, "first");
    }
}
