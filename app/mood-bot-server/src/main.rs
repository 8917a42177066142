#[tokio::main]
async fn main() -> anyhow::Result<()> {
    mood_bot_app_lib::run().await
}
