#[tokio::main]
async fn main() {
    if let Err(err) = sicap_mcp::mcp::server::run_stdio().await {
        eprintln!("sicap-mcp: {}", err);
        std::process::exit(1);
    }
}
