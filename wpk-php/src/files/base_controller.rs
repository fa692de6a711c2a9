use std::path::PathBuf;

use wpkernel_core::GeneratedFile;

use super::{BASE_CONTROLLER_PATH, output_path};
use crate::ast::build::{self, Result};
use crate::ast::{Class, PhpFile, Stmt};
use crate::controller::GENERATED_HEADER;
use crate::printer::Printer;

/// `Rest/BaseController.php`: route registration shared by every
/// controller.
pub struct BaseControllerPhp {
    file: PhpFile,
    output_dir: String,
}

fn base_controller_class() -> Result<Class> {
    let route = build::variable("route")?;
    let field = |key: &str| build::dim(route.clone(), build::string(key));

    let register = build::method("register_routes")?
        .returns("void")
        .body(vec![build::foreach(
            build::this_call("get_routes", vec![])?,
            None,
            route.clone(),
            vec![build::expr_stmt(build::func_call(
                "register_rest_route",
                vec![
                    field("namespace"),
                    field("route"),
                    build::array(vec![
                        build::keyed("methods", field("methods")),
                        build::keyed(
                            "callback",
                            build::array(vec![build::item(build::this()), build::item(field("callback"))]),
                        ),
                        build::keyed("permission_callback", build::string("__return_true")),
                        build::keyed("args", build::this_call("get_rest_args", vec![])?),
                    ]),
                ],
            )?)],
        )]);

    Ok(build::class("BaseController")?
        .abstract_()
        .doc(build::doc(["Registers the routes a resource controller declares."]))
        .method(
            build::method("get_routes")?
                .returns("array")
                .body(vec![build::ret(build::array(vec![]))]),
        )
        .method(
            build::method("get_rest_args")?
                .returns("array")
                .body(vec![build::ret(build::array(vec![]))]),
        )
        .method(register))
}

impl BaseControllerPhp {
    pub fn new(namespace: &str, output_dir: impl Into<String>) -> Result<Self> {
        let file = PhpFile::new()
            .doc(build::doc([GENERATED_HEADER]))
            .strict_types()
            .namespace(build::name(namespace)?)
            .stmt(Stmt::Class(base_controller_class()?));
        Ok(Self {
            file,
            output_dir: output_dir.into(),
        })
    }
}

impl GeneratedFile for BaseControllerPhp {
    fn path(&self) -> PathBuf {
        output_path(&self.output_dir, BASE_CONTROLLER_PATH)
    }

    fn render(&self) -> String {
        Printer::new().print_file(&self.file)
    }
}
