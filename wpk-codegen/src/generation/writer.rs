use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};
use serde_json::json;
use wpkernel_core::{File, FileSystem, Reporter, WriteResult};

/// Outcome of [`write_generated_files`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

/// Write queued files below `base` through the injected file system.
///
/// Parent directories are ensured first. PHP sources pass through
/// [`FileSystem::format_php`], TypeScript through [`FileSystem::format_ts`].
/// A file's header, when set, goes right after the `<?php` opening tag or
/// at the top of other files.
pub fn write_generated_files(
    files: &[File],
    reporter: &dyn Reporter,
    fs: &dyn FileSystem,
    base: &Path,
) -> Result<WriteSummary> {
    let mut summary = WriteSummary::default();

    for file in files {
        let target = base.join(file.path());
        if let Some(parent) = target.parent() {
            fs.ensure_directory(parent)
                .wrap_err_with(|| format!("failed to create {}", parent.display()))?;
        }

        let content = with_header(file.content(), file.rules().header);
        let content = match file.extension().as_deref() {
            Some("php") => fs.format_php(&target, content)?,
            Some("ts" | "tsx") => fs.format_ts(&target, content)?,
            _ => content,
        };

        let result = file
            .write(fs, base, &content)
            .wrap_err_with(|| format!("failed to write {}", target.display()))?;
        let context = json!({ "path": file.path().to_string_lossy() });
        match result {
            WriteResult::Written => {
                reporter.debug("Wrote generated file.", Some(&context));
                summary.written.push(file.path().to_path_buf());
            }
            WriteResult::Skipped => {
                reporter.debug("Skipped existing file.", Some(&context));
                summary.skipped.push(file.path().to_path_buf());
            }
        }
    }

    reporter.info(
        &format!("Wrote {} generated file(s).", summary.written.len()),
        Some(&json!({ "written": summary.written.len(), "skipped": summary.skipped.len() })),
    );
    Ok(summary)
}

fn with_header(content: &str, header: Option<&str>) -> String {
    let Some(header) = header else {
        return content.to_string();
    };
    match content.strip_prefix("<?php\n") {
        Some(rest) => format!("<?php\n{header}\n{rest}"),
        None => format!("{header}\n{content}"),
    }
}

#[cfg(test)]
mod tests {
    use wpkernel_core::{DiskFileSystem, FileRules, MemoryFileSystem, MemoryReporter, Overwrite};

    use super::*;

    #[test]
    fn test_formats_by_extension() {
        let fs = MemoryFileSystem::new();
        let reporter = MemoryReporter::new();
        let files = [
            File::new("Rest/JobController.php", "<?php\n"),
            File::new("types/job.ts", "export {};\n"),
            File::new("wpk-manifest.json", "{}\n"),
        ];

        let summary = write_generated_files(&files, &reporter, &fs, Path::new("out")).unwrap();

        assert_eq!(summary.written.len(), 3);
        assert_eq!(
            fs.formatted(),
            vec![
                PathBuf::from("out/Rest/JobController.php"),
                PathBuf::from("out/types/job.ts")
            ]
        );
        assert!(fs.directories().contains(Path::new("out/Rest")));
        assert_eq!(fs.get("out/wpk-manifest.json").as_deref(), Some("{}\n"));
    }

    #[test]
    fn test_header_follows_php_open_tag() {
        let fs = MemoryFileSystem::new();
        let file = File::new("plugin.php", "<?php\nrequire 'x.php';\n").with_rules(FileRules {
            overwrite: Overwrite::Always,
            header: Some("// Generated by wpk. Do not edit."),
        });

        write_generated_files(&[file], &MemoryReporter::new(), &fs, Path::new("")).unwrap();

        assert_eq!(
            fs.get("plugin.php").unwrap(),
            "<?php\n// Generated by wpk. Do not edit.\nrequire 'x.php';\n"
        );
    }

    #[test]
    fn test_writes_to_disk_and_skips_user_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.php"), "user").unwrap();
        let files = [
            File::new("index.php", "<?php\n").with_rules(FileRules {
                overwrite: Overwrite::IfMissing,
                header: None,
            }),
            File::new("Policy/Policy.php", "<?php\n"),
        ];

        let summary =
            write_generated_files(&files, &MemoryReporter::new(), &DiskFileSystem, dir.path())
                .unwrap();

        assert_eq!(summary.skipped, vec![PathBuf::from("index.php")]);
        assert_eq!(std::fs::read_to_string(dir.path().join("index.php")).unwrap(), "user");
        assert!(dir.path().join("Policy/Policy.php").is_file());
    }
}
