extern crate kura_lib;

fn main() {
    let config = kura_lib::config::Config::new().expect("Failed to load service configuration. Please check your 'config' folder");

    // Prepare sentry integration
    let _sentry = kura_lib::sentry_integration::init(config.sentry.as_ref());

    env_logger::init();

    kura_lib::start_server(config);
}
