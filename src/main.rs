#[tokio::main]
async fn main() {
    luach_board::run().await;
}
