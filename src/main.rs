use clap::Parser;
use git_migrate::{migrate_main, MigrateCli};
use std::process::exit;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = MigrateCli::parse();
    env_logger::builder()
        .filter_level(args.log_level())
        .format_target(false)
        .format_timestamp(None)
        .init();
    log::debug!(concat!(
        env!("CARGO_PKG_NAME"),
        " ",
        env!("CARGO_PKG_VERSION")
    ));
    match migrate_main(args).await {
        Ok(true) => {
            exit(0);
        }
        Ok(false) => {
            exit(1);
        }
        Err(e) => {
            eprintln!("{e}");
            exit(1);
        }
    };
}
