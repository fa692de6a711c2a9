use wpkernel_config::{ConfigFormat, LoadedConfig, parse_str};
use wpkernel_ir::{Ir, IrResource, build_ir};

pub const JOBS: &str = r#"
version = 1
namespace = "acme-jobs"

[resources.job]
name = "job"
schema = "auto"
identity = { type = "number", param = "id" }
storage = { mode = "wp-post", postType = "acme_job", statuses = ["draft", "publish"], meta = { department = { type = "string" }, tags = { type = "string", single = false } }, taxonomies = { location = { taxonomy = "acme_location", hierarchical = true } } }

[resources.job.routes]
list = { path = "/acme/v1/jobs", method = "GET" }
get = { path = "/acme/v1/jobs/:id", method = "GET" }
create = { path = "/acme/v1/jobs", method = "POST", capability = "job.create" }
update = { path = "/acme/v1/jobs/:id", method = "PUT", capability = "job.update" }
remove = { path = "/acme/v1/jobs/:id", method = "DELETE", capability = "job.delete" }

[resources.department]
name = "department"
storage = { mode = "wp-taxonomy", taxonomy = "acme_department" }
routes.list = { path = "/acme/v1/departments", method = "GET" }

[resources.draft]
name = "draft"
identity = { type = "string", param = "slug" }
storage = { mode = "transient" }

[resources.draft.routes]
get = { path = "/acme/v1/drafts/:slug", method = "GET" }
update = { path = "/acme/v1/drafts/:slug", method = "PUT" }
remove = { path = "/acme/v1/drafts/:slug", method = "DELETE" }

[resources.settings]
name = "settings"
storage = { mode = "wp-option", option = "acme_settings" }

[resources.settings.routes]
get = { path = "/acme/v1/settings", method = "GET" }
update = { path = "/acme/v1/settings", method = "PUT", capability = "settings.manage" }

[capabilities]
"job.create" = "edit_posts"
"job.update" = { capability = "edit_post", appliesTo = "object" }
"settings.manage" = "manage_options"
"#;

pub fn loaded(src: &str) -> LoadedConfig {
    let parsed = parse_str(src, ConfigFormat::Toml, "wpk.config.toml").unwrap();
    LoadedConfig::new(parsed.config, "wpk.config.toml").with_warnings(parsed.warnings)
}

pub fn jobs_ir() -> Ir {
    build_ir(&loaded(JOBS)).unwrap()
}

pub fn resource(ir: &Ir, name: &str) -> IrResource {
    ir.resource(name).unwrap().clone()
}
