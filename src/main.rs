//! memmetric CLI entry point.

use memmetric::cli::{self, Cli};
use memmetric::core::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();
    cli::execute(cli).await
}
