#[tokio::main]
async fn main() -> Result<(), eyre::Report> {
    payout::run().await
}
