use wpkernel_core::php_namespace;

use crate::{IrMeta, IrPhpProject};

/// Directory generated PHP sources are autoloaded from.
pub const PHP_AUTOLOAD_DIR: &str = "inc/";
/// Output directory for generated PHP, relative to the plugin root.
pub const PHP_OUTPUT_DIR: &str = ".generated/php";

pub fn build_php_project(meta: &IrMeta) -> IrPhpProject {
    IrPhpProject {
        namespace: php_namespace(&meta.sanitized_namespace),
        autoload: PHP_AUTOLOAD_DIR.to_string(),
        output_dir: PHP_OUTPUT_DIR.to_string(),
    }
}
