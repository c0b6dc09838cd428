#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    docsite::cli::run().await
}
