use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    imessage_mcp::infra::logging::init();
    imessage_mcp::cli::run().await
}
