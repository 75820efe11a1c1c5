//! Ask for free-text advice and a structured list of hospitals at the same time.
//!
//! ```bash
//! export GEMINI_API_KEY="your-api-key"
//! cargo run --example health_report -- "Lyon, France"
//! ```

use medigen::prelude::*;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Hospital {
    name: String,
    address: String,
    #[serde(default)]
    phone: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Hospitals {
    hospitals: Vec<Hospital>,
}

fn hospital_schema() -> ResponseSchema {
    ResponseSchema::object().required_property(
        "hospitals",
        ResponseSchema::array(
            ResponseSchema::object()
                .required_property("name", ResponseSchema::string())
                .required_property("address", ResponseSchema::string())
                .property("phone", ResponseSchema::string()),
        ),
    )
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing(&TracingConfig::default())?;

    let city = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Lyon, France".to_string());
    let client = GeminiClient::builder().build()?;

    let advice = RequestEnvelope::new(OutputMode::text_or("No advice available right now."))
        .with_instruction("You are a cautious health assistant. Keep answers under 80 words.")
        .with_text(format!("General advice for a traveller with a mild fever in {city}."));

    let (advice, hospitals) = futures::future::join(
        client.execute(&advice),
        client.generate_typed::<Hospitals>(
            format!("List up to three hospitals with an emergency department in {city}."),
            hospital_schema(),
        ),
    )
    .await;

    if let Some(text) = advice?.as_text() {
        println!("Advice:\n{text}\n");
    }
    for h in hospitals?.hospitals {
        println!(
            "- {} ({}){}",
            h.name,
            h.address,
            h.phone.map(|p| format!(", {p}")).unwrap_or_default()
        );
    }
    Ok(())
}
