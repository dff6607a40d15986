#[tokio::main]
async fn main() {
    tienda_web::start_server().await;
}
