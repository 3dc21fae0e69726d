const fn unwrap_or_cargo_version(opt: Option<&'static str>) -> &'static str {
    match opt {
        Some(val) => val,
        None => env!("CARGO_PKG_VERSION"),
    }
}

/// Release version, overridable at build time through `PINGDOM_GITOPS_VERSION`.
pub const VERSION: &str = unwrap_or_cargo_version(option_env!("PINGDOM_GITOPS_VERSION"));

/// Sent as `User-Agent` on every Pingdom API call.
pub fn user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), VERSION)
}
