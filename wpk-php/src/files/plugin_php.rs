use std::path::PathBuf;

use wpkernel_core::GeneratedFile;

use super::{INDEX_PATH, PLUGIN_PATH, output_path};
use crate::ast::build::{self, Result};
use crate::ast::{BinaryOp, Expr, PhpFile, Stmt};
use crate::controller::GENERATED_HEADER;
use crate::printer::Printer;

/// `plugin.php`: autoloads the generated classes and registers every
/// controller's routes on `rest_api_init`.
pub struct PluginLoaderPhp {
    file: PhpFile,
    output_dir: String,
}

fn magic(name: &str) -> Result<Expr> {
    Ok(Expr::ConstFetch {
        name: build::name(name)?,
    })
}

fn namespaced(function: &str) -> Result<Expr> {
    Ok(build::binary(
        BinaryOp::Concat,
        magic("__NAMESPACE__")?,
        build::string(format!("\\{function}")),
    ))
}

impl PluginLoaderPhp {
    /// `controllers` are class names relative to the plugin namespace,
    /// such as `Rest\JobController`.
    pub fn new(
        namespace: &str,
        controllers: &[String],
        output_dir: impl Into<String>,
    ) -> Result<Self> {
        let class = build::variable("class")?;
        let class_map = build::variable("class_map")?;

        let autoload = build::function(
            "autoload",
            vec![build::typed_param("string", "class")?],
            vec![
                build::assign_stmt(
                    "class_map",
                    build::func_call(
                        "require",
                        vec![build::binary(
                            BinaryOp::Concat,
                            magic("__DIR__")?,
                            build::string(format!("/{INDEX_PATH}")),
                        )],
                    )?,
                )?,
                build::if_(
                    build::isset(vec![build::dim(class_map.clone(), class.clone())]),
                    vec![build::expr_stmt(build::func_call(
                        "require_once",
                        vec![build::dim(class_map, class)],
                    )?)],
                ),
            ],
        )?;

        let registrations = controllers
            .iter()
            .map(|controller| {
                Ok(build::expr_stmt(build::method_call(
                    build::new(controller, vec![])?,
                    "register_routes",
                    vec![],
                )?))
            })
            .collect::<Result<Vec<_>>>()?;
        let register = build::function("register_routes", vec![], registrations)?;

        let file = PhpFile::new()
            .doc(build::doc([
                GENERATED_HEADER,
                "",
                "Include this file from the plugin bootstrap.",
            ]))
            .strict_types()
            .namespace(build::name(namespace)?)
            .stmts([
                autoload,
                Stmt::blank(),
                register,
                Stmt::blank(),
                build::expr_stmt(build::func_call(
                    "spl_autoload_register",
                    vec![namespaced("autoload")?],
                )?),
                build::expr_stmt(build::func_call(
                    "add_action",
                    vec![build::string("rest_api_init"), namespaced("register_routes")?],
                )?),
            ]);
        Ok(Self {
            file,
            output_dir: output_dir.into(),
        })
    }
}

impl GeneratedFile for PluginLoaderPhp {
    fn path(&self) -> PathBuf {
        output_path(&self.output_dir, PLUGIN_PATH)
    }

    fn render(&self) -> String {
        Printer::new().print_file(&self.file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loader_registers_controllers() {
        let loader = PluginLoaderPhp::new(
            "Acme\\Jobs",
            &["Rest\\JobController".to_string()],
            ".generated/php",
        )
        .unwrap();
        let rendered = loader.render();

        assert!(rendered.contains("function autoload( string $class ) {\n"));
        assert!(rendered.contains("\t$class_map = require( __DIR__ . '/index.php' );\n"));
        assert!(rendered.contains("\t\trequire_once( $class_map[ $class ] );\n"));
        assert!(rendered.contains("\t( new Rest\\JobController() )->register_routes();\n"));
        assert!(rendered.contains("add_action( 'rest_api_init', __NAMESPACE__ . '\\\\register_routes' );\n"));
    }
}
