use std::path::PathBuf;

use wpkernel_core::GeneratedFile;

use super::{controller_relative_path, output_path};
use crate::controller::ResourceController;
use crate::printer::Printer;

/// `Rest/{Pascal}Controller.php`
pub struct ControllerPhp<'a> {
    pub controller: &'a ResourceController,
    pub output_dir: &'a str,
}

impl<'a> ControllerPhp<'a> {
    pub fn new(controller: &'a ResourceController, output_dir: &'a str) -> Self {
        Self {
            controller,
            output_dir,
        }
    }
}

impl GeneratedFile for ControllerPhp<'_> {
    fn path(&self) -> PathBuf {
        output_path(
            self.output_dir,
            &controller_relative_path(&self.controller.class_name),
        )
    }

    fn render(&self) -> String {
        Printer::new().print_file(&self.controller.file)
    }
}
