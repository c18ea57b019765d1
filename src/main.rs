#[tokio::main]
async fn main() -> std::io::Result<()> {
    flick_client::run_with_config().await
}
