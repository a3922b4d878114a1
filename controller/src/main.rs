mod fetch;
mod host;
mod notify;
mod relay;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    host::run().await
}
