use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    shopfront_cli::run().await
}
