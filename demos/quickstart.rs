use shopfront_http::{ApiClient, ClientConfig, RequestConfig};

#[derive(serde::Deserialize, Debug)]
struct Ticket {
    id: u64,
    status: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Optional: enable basic logging for the example
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    // Load configuration from a JSON file placed next to the binary
    let cfg = ClientConfig::from_file("config.json")?;
    let client = ApiClient::new(cfg)?;
    client.sign_in(std::env::var("SHOPFRONT_TOKEN")?, true);

    let tickets: Vec<Ticket> = client
        .send_json(RequestConfig::get("/service-orders").query([("status", "open")]))
        .await?;
    for ticket in &tickets {
        println!("#{} {}", ticket.id, ticket.status);
    }
    client
        .patch_json("/service-orders/1", &serde_json::json!({ "status": "ready" }))
        .await?;
    Ok(())
}
