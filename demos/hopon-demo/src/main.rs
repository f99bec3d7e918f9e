//! Walkthrough of the HopOn client SDK against a running backend.
//!
//! Run a local HopOn backend on port 8000 (or point `HOPON_API_URL`
//! elsewhere), then:
//!
//! ```text
//! cargo run -p hopon-demo
//! ```
//!
//! The demo initializes a session, signs in through the demo-login
//! endpoint, lists nearby events, joins and leaves the first one, and
//! signs out again — printing the session status at each step.

use hopon_client::{ClientError, HopOnClientBuilder};
use hopon_protocol::DemoLoginRequest;

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let base_url = std::env::var("HOPON_API_URL")
        .unwrap_or_else(|_| "http://localhost:8000".to_string());
    let store_path = std::env::temp_dir().join("hopon-demo-state.json");

    let client = HopOnClientBuilder::new()
        .base_url(&base_url)
        .store_path(&store_path)
        .build()?;

    let status = client.initialize().await;
    println!("session after startup: {status}");

    // Sign in without the OAuth provider (development helper).
    match client
        .session()
        .login_as_demo(&DemoLoginRequest::default())
        .await
    {
        Ok(()) => {
            let user = client.session().current_user();
            println!(
                "signed in as {}",
                user.map(|u| u.username).unwrap_or_else(|| "?".into())
            );
        }
        Err(error) => {
            println!("demo login unavailable ({error}), continuing as guest");
            client.session().set_guest_name("demo-visitor")?;
        }
    }

    let events = client.api().nearby_events(None).await?;
    println!("{} event(s) nearby", events.len());
    for event in events.iter().take(5) {
        println!(
            "  {}: {} at {} ({}/{} players)",
            event.id,
            event.name,
            event.location,
            event.current_players,
            event.max_players
        );
    }

    if let Some(event) = events.first() {
        let joined = client
            .join_event(event.id, client.session().guest_name().as_deref())
            .await?;
        println!(
            "joined {} ({}/{} players now)",
            event.name,
            joined.event.current_players,
            joined.event.max_players
        );

        client.leave_event(event.id).await?;
        println!("left {} again", event.name);
    }

    client.session().logout().await;
    println!("session after logout: {}", client.session().status());

    client.shutdown();
    Ok(())
}
