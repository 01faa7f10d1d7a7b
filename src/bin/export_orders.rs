extern crate kura_lib;

use std::env;

fn main() {
    let config = kura_lib::config::Config::new().expect("Failed to load service configuration. Please check your 'config' folder");

    // Prepare sentry integration
    let _sentry = kura_lib::sentry_integration::init(config.sentry.as_ref());

    env_logger::init();

    // view=history year=2025 month=10
    let params = env::args()
        .skip(1)
        .filter_map(|arg| {
            let mut it = arg.splitn(2, '=');
            match (it.next(), it.next()) {
                (Some(key), Some(value)) => Some((key.to_string(), value.to_string())),
                _ => None,
            }
        })
        .collect();

    kura_lib::start_orders_export(config, params);
}
