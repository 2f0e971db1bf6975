// src/main.rs
use esrb_scrape::{cli, log};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    log::init();

    let cmd = match cli::parse_args(std::env::args().skip(1)) {
        Ok(cmd) => cmd,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(cli::exit_code(&e));
        }
    };

    if let Err(e) = cli::run(cmd) {
        let code = cli::exit_code(&e);
        tracing::error!("{e}");
        eprintln!("Error: {:?}", color_eyre::eyre::Report::new(e));
        std::process::exit(code);
    }
    Ok(())
}
