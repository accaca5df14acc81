use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    docvec_cli::main_entry().await
}
