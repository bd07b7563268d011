//! `livecard check`: report supportability for the configured host.

use crate::config::LivecardConfig;
use crate::serve_cmd::build_facade;

pub fn run_check(config: &LivecardConfig) {
    print!("{}", render_check(config));
}

fn render_check(config: &LivecardConfig) -> String {
    let facade = build_facade(config);
    let cap = &config.capability;
    let yes_no = |b: bool| if b { "yes" } else { "no" };
    format!(
        "host:              {} {}\n\
         requires:          {} >= {}\n\
         supported:         {}\n\
         after dismissal:   {} (>= {})\n",
        config.host_platform,
        config.host_version,
        cap.platform,
        cap.min_version,
        yes_no(facade.is_supported()),
        yes_no(cap.supports_after_dismissal(config.host_version)),
        cap.after_dismissal_min_version,
    )
}
