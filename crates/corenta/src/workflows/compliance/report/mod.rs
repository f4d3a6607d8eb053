mod formatter;
pub mod views;

pub use formatter::{format_nit, render_company, render_compliance, render_compliance_steps};
