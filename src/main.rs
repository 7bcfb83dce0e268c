use std::process::ExitCode;

use fibcache::bootstrap::run;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = run().await {
        tracing::error!("fibcache error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}
