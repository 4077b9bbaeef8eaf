use anyhow::{Context, Result};
use clap::Parser;
use log::debug;
use std::io;

use think_todo::cli::{self, Cli, Commands};
use think_todo::{config, server, shell, JsonFileSink, TaskStore};

fn main() -> Result<()> {
    let args = Cli::parse();
    config::init_logging(args.debug);

    let data_file = config::expand_home(&args.data_file);
    debug!("using task file {}", data_file.display());
    let sink = JsonFileSink::new(&data_file);
    let mut store = if args.recover {
        TaskStore::open_or_recover(sink)
    } else {
        TaskStore::open(sink).with_context(|| {
            format!(
                "cannot open {} (use --recover to start with an empty list)",
                data_file.display()
            )
        })?
    };

    match args.command {
        Commands::Task(command) => cli::execute(&mut store, command, &mut io::stdout().lock())?,
        Commands::Shell => shell::run(&mut store, io::stdin().lock(), io::stdout().lock())?,
        Commands::Serve { port } => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(server::start_server(store, port))?;
        }
    }
    Ok(())
}
