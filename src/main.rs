//! # Multicall
//!
//! Sends batches of calls through a multicall aggregator.
use clap::Parser;
use multicall::cli::Args;

#[tokio::main]
async fn main() {
    // Enable backtraces unless a RUST_BACKTRACE value has already been explicitly provided.
    if std::env::var_os("RUST_BACKTRACE").is_none() {
        // SAFETY: no other threads read the environment yet.
        unsafe { std::env::set_var("RUST_BACKTRACE", "1") };
    }

    let args = Args::parse();
    if let Err(err) = args.run().await {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}
