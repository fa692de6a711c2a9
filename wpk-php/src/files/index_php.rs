use std::path::PathBuf;

use wpkernel_core::GeneratedFile;

use super::{INDEX_PATH, output_path};
use crate::ast::build::{self, Result};
use crate::ast::{BinaryOp, PhpFile};
use crate::controller::GENERATED_HEADER;
use crate::printer::Printer;

/// `index.php`: map of generated class names to their files.
pub struct IndexPhp {
    file: PhpFile,
    output_dir: String,
}

impl IndexPhp {
    /// `entries` pairs fully qualified class names with paths relative to
    /// the output directory.
    pub fn new<I>(entries: I, output_dir: impl Into<String>) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let dir = build::name("__DIR__")?;
        let mut entries: Vec<(String, String)> = entries.into_iter().collect();
        entries.sort();

        let items = entries
            .into_iter()
            .map(|(class, path)| {
                build::keyed(
                    class,
                    build::binary(
                        BinaryOp::Concat,
                        crate::ast::Expr::ConstFetch { name: dir.clone() },
                        build::string(format!("/{path}")),
                    ),
                )
            })
            .collect();

        let file = PhpFile::new()
            .doc(build::doc([GENERATED_HEADER]))
            .strict_types()
            .stmt(build::ret(build::array(items)));
        Ok(Self {
            file,
            output_dir: output_dir.into(),
        })
    }
}

impl GeneratedFile for IndexPhp {
    fn path(&self) -> PathBuf {
        output_path(&self.output_dir, INDEX_PATH)
    }

    fn render(&self) -> String {
        Printer::new().print_file(&self.file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_map_is_sorted() {
        let index = IndexPhp::new(
            [
                (
                    "Acme\\Jobs\\Rest\\JobController".to_string(),
                    "Rest/JobController.php".to_string(),
                ),
                (
                    "Acme\\Jobs\\Policy\\Policy".to_string(),
                    "Policy/Policy.php".to_string(),
                ),
            ],
            ".generated/php",
        )
        .unwrap();

        assert_eq!(
            index.render(),
            "<?php\n/**\n * Generated by wpk. Do not edit.\n */\ndeclare(strict_types=1);\n\nreturn array(\n\t'Acme\\\\Jobs\\\\Policy\\\\Policy' => __DIR__ . '/Policy/Policy.php',\n\t'Acme\\\\Jobs\\\\Rest\\\\JobController' => __DIR__ . '/Rest/JobController.php',\n);\n"
        );
    }
}
