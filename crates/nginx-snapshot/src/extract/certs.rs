//! Certificate file references.

use std::path::PathBuf;

use crate::directive::Directive;
use crate::paths;

/// Directives whose first argument names a certificate file.
///
/// Private key directives are deliberately absent: keys are never collected.
pub const CERTIFICATE_DIRECTIVES: &[&str] = &[
    "ssl_certificate",
    "ssl_trusted_certificate",
    "ssl_client_certificate",
    "proxy_ssl_certificate",
    "proxy_ssl_trusted_certificate",
    "grpc_ssl_certificate",
];

/// Resolved certificate path for a certificate directive.
///
/// Returns `None` for variable paths and inline `data:` certificates.
pub fn certificate_path(directive: &Directive) -> Option<PathBuf> {
    let arg = directive.first_arg()?;
    if paths::is_variable(arg) || arg.starts_with("data:") {
        return None;
    }
    Some(paths::resolve(directive.source_dir(), arg))
}
