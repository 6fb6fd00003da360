use anyhow::Result;
use env_logger::{Builder, Env};
use log::error;

mod cli;
mod util;
mod cmd_init;
mod cmd_add;
mod cmd_check;
mod cmd_status;

fn init_logger() {
    // Уровень берём из RUST_LOG, иначе дефолт — info.
    // Пример: RUST_LOG=debug ./quiverbloom status --path ./f.bloom
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

fn main() {
    init_logger();

    if let Err(e) = run() {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = cli::Cli::parse_args();
    match cli.cmd {
        cli::Cmd::Init { common } =>
            cmd_init::exec(common),

        cli::Cmd::Add { common, key } =>
            cmd_add::exec(common, key),

        cli::Cmd::Check { common, key } =>
            cmd_check::exec(common, key),

        cli::Cmd::Status { common, json } =>
            cmd_status::exec(common, json),
    }
}
