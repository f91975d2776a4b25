pub mod apply;
pub mod dependencies;
pub mod lifecycle;
pub mod model;
pub mod namespace;
pub mod projects;
pub mod readiness;
pub mod record;
