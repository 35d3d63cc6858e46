//! Startup banner.

use crate::config::Settings;
use crate::consts::{AUTHOR, HOMEPAGE, REPO};
use crate::downstream::TransportMode;

/// Print the startup banner. `key` is a fingerprint, never the secret.
pub fn print_banner(settings: &Settings, key: &str) {
    println!(
        r#"
   ╔═══════════════════════════════════════╗
   ║            C O U R I E R              ║
   ║    lessons in, answers out, on time   ║
   ╚═══════════════════════════════════════╝

   version    {}
   by         {}
   home       {}
   repo       {}
   port       {}
   transport  {}
   retrieval  {}
   business   {}
   prompt     {}
   api key    {}
"#,
        env!("CARGO_PKG_VERSION"),
        AUTHOR,
        HOMEPAGE,
        REPO,
        settings.port,
        transport_label(settings.transport),
        url_label(settings.retrieval_url.as_deref()),
        url_label(settings.business_url.as_deref()),
        url_label(settings.prompt_url.as_deref()),
        key,
    );
}

fn transport_label(mode: TransportMode) -> &'static str {
    match mode {
        TransportMode::Pooled => "pooled",
        TransportMode::Ephemeral => "ephemeral",
    }
}

fn url_label(url: Option<&str>) -> &str {
    url.unwrap_or("stub")
}
