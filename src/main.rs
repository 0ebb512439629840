use clap::Parser;
use ruuvitag_scanner::app::{Options, run_with_io};
use ruuvitag_scanner::radio::SystemRadio;
use std::panic::{self, PanicHookInfo};

/// Exit codes for the application
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_PANIC: i32 = 2;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Set up panic hook to ensure clean exit codes for process managers
    // (e.g., systemd) that monitor exit status
    panic::set_hook(Box::new(move |info: &PanicHookInfo| {
        eprintln!("Panic! {}", info);
        std::process::exit(EXIT_PANIC);
    }));

    let options = Options::parse();
    let radio = SystemRadio;

    let mut out = std::io::stdout();
    let mut err = std::io::stderr();

    match run_with_io(options, &radio, &mut out, &mut err).await {
        Ok(_) => std::process::exit(EXIT_SUCCESS),
        Err(why) => {
            eprintln!("error: {}", why);
            std::process::exit(EXIT_ERROR);
        }
    }
}
