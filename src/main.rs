#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dust_relayer::run().await
}
