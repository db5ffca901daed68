#[tokio::main]
async fn main() {
    tapepivot::cli::run().await;
}
