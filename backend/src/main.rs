#[tokio::main]
async fn main() {
    symptom_checker::start_server().await;
}
