mod commands;
mod data;
mod glob;
mod image;
mod options;
mod sprite_name;

use std::process;

use structopt::StructOpt;

use crate::options::{Options, Subcommand};

fn main() {
    let options = Options::from_args();

    let log_filter = match options.global.verbosity {
        0 => "info",
        1 => "info,spriter=debug,packtree=debug",
        _ => "trace",
    };

    env_logger::from_env(env_logger::Env::default().default_filter_or(log_filter))
        .format_module_path(false)
        .format_timestamp(None)
        .init();

    if let Err(err) = run(options) {
        log::error!("{:?}", err);
        process::exit(1);
    }
}

fn run(options: Options) -> anyhow::Result<()> {
    match options.command {
        Subcommand::Pack(pack_options) => commands::pack(pack_options)?,
        Subcommand::Unpack(unpack_options) => commands::unpack(unpack_options)?,
    }

    Ok(())
}
