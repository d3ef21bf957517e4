#[tokio::main]
async fn main() -> anyhow::Result<()> {
    medquery_server::start().await
}
