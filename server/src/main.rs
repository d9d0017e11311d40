#[tokio::main]
async fn main() {
    petmap::start_server().await;
}
