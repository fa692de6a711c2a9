//! Files generated for a plugin.
//!
//! Every file lives below the IR's PHP output directory; paths returned by
//! [`GeneratedFile::path`](wpkernel_core::GeneratedFile::path) are relative
//! to the plugin root.

mod base_controller;
mod controller_php;
mod index_php;
mod manifest;
mod plugin_php;
mod policy;

pub use base_controller::BaseControllerPhp;
pub use controller_php::ControllerPhp;
pub use index_php::IndexPhp;
pub use manifest::{MANIFEST_FILE, Manifest, read_manifest_hash};
pub use plugin_php::PluginLoaderPhp;
pub use policy::PolicyPhp;

use std::path::PathBuf;

/// `{output_dir}/{relative}`
pub(crate) fn output_path(output_dir: &str, relative: &str) -> PathBuf {
    PathBuf::from(output_dir.trim_end_matches('/')).join(relative)
}

/// Path of a controller class below the output directory.
pub fn controller_relative_path(class_name: &str) -> String {
    format!("Rest/{class_name}.php")
}

pub const BASE_CONTROLLER_PATH: &str = "Rest/BaseController.php";
pub const POLICY_PATH: &str = "Policy/Policy.php";
pub const INDEX_PATH: &str = "index.php";
pub const PLUGIN_PATH: &str = "plugin.php";
