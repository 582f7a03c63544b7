#[tokio::main]
async fn main() -> anyhow::Result<()> {
    habitflow_backend::run().await
}
