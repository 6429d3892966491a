//! FoodLink backend binary.
//!
//! Serves the auth, creator page, and analytics routes over HTTP.

#[tokio::main]
async fn main() {
    fl_core::log();
    fl_server::run().await.expect("server exited with error");
}
