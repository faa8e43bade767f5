use std::io::{self, Write};
use std::process;

use log::error;
use rebind_io::FbxScene;
use rebind_tools::{pipeline, write_report, Cli};

fn main() {
    let cli = match Cli::parse_args(std::env::args_os()) {
        Ok(cli) => cli,
        Err(err) => err.exit(),
    };

    let env = env_logger::Env::default().default_filter_or(cli.default_log_filter());
    env_logger::Builder::from_env(env).init();

    let summary = match pipeline::run::<FbxScene>(&cli.run_config()) {
        Ok(summary) => summary,
        Err(err) => {
            error!("{}", err);
            process::exit(err.exit_code());
        }
    };

    if !cli.test {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        if let Err(err) = write_report(&mut out, &summary).and_then(|_| out.flush()) {
            error!("Failed to write report: {}", err);
            process::exit(1);
        }
    }
}
