use super::{request, return_if_wp_error};
use crate::ast::Stmt;
use crate::ast::build::{self, Result};

/// `$permission = Policy::enforce( '{key}', $request );` with an early
/// return when the policy denies the request.
pub fn capability_guard(key: &str) -> Result<Vec<Stmt>> {
    Ok(vec![
        build::assign_stmt(
            "permission",
            build::static_call("Policy", "enforce", vec![build::string(key), request()?])?,
        )?,
        return_if_wp_error("permission")?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::Printer;

    #[test]
    fn test_capability_guard() {
        let printed = Printer::new().print_stmts(&capability_guard("job.create").unwrap());
        assert_eq!(
            printed,
            "$permission = Policy::enforce( 'job.create', $request );\nif ( is_wp_error( $permission ) ) {\n\treturn $permission;\n}\n"
        );
    }
}
