use std::path::PathBuf;

use gamedeals_tui::app::RunOptions;

fn main() {
    let Some(opts) = handle_cli_flags() else {
        return;
    };

    if let Err(err) = gamedeals_tui::app::run_with(opts) {
        eprintln!("error: {err:?}");
        std::process::exit(1);
    }
}

/// Returns `None` when a flag was fully handled and the app should not start.
fn handle_cli_flags() -> Option<RunOptions> {
    let mut opts = RunOptions::default();
    let mut saw_flag = false;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => {
                println!("gamedeals-tui {}", gamedeals_tui::VERSION);
                saw_flag = true;
            }
            "--help" | "-h" => {
                println!(
                    "gamedeals-tui — Free game giveaways, deals and gaming news in the terminal.\n\n  --version, -V        Show version and exit\n  --help,    -h        Show this help message\n  --config <path>      Load configuration from <path>"
                );
                saw_flag = true;
            }
            "--config" => match args.next() {
                Some(path) => opts.config_file = Some(PathBuf::from(path)),
                None => {
                    eprintln!("error: --config requires a path");
                    std::process::exit(2);
                }
            },
            _ => {
                if let Some(path) = arg.strip_prefix("--config=") {
                    opts.config_file = Some(PathBuf::from(path));
                }
            }
        }
    }
    if saw_flag {
        None
    } else {
        Some(opts)
    }
}
