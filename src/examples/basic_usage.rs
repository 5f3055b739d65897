//! Basic Usage Example
//!
//! Direct calls and the builder chain against a running OstrichDB server.
//! Connection settings come from `ostrichdb.json` when present, otherwise
//! `http://localhost:8042` without a token.
//!
//! Run with: cargo run --example basic_usage

use ostrichdb_rs::{Client, ClientConfig, Record, SearchOptions, SortField, SortOrder};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("ostrichdb_rs=debug")
        .init();

    let config = ClientConfig::load("ostrichdb.json").unwrap_or_default();
    let client = Client::with_config(config)?;

    println!("Health: {:?}\n", client.health_check().await?);

    // Direct calls
    client.create_project("my-app").await?;
    client.create_collection("my-app", "users").await?;
    client
        .create_cluster("my-app", "users", "active-users")
        .await?;
    println!("✅ Project, collection and cluster created");

    for (name, ty, value) in [
        ("user-1-email", "STRING", "john@example.com"),
        ("user-1-age", "INTEGER", "28"),
        ("user-1-verified", "BOOLEAN", "true"),
    ] {
        client
            .create_record("my-app", "users", "active-users", name, ty, value)
            .await?;
    }
    println!("✅ Records created");

    let records = client
        .list_records("my-app", "users", "active-users")
        .await?;
    println!("📋 Records in cluster: {:?}", records);

    let emails = client
        .search_records(
            "my-app",
            "users",
            "active-users",
            &SearchOptions::new()
                .record_type("STRING")
                .value_contains("example.com"),
        )
        .await?;
    println!("🔍 Email records: {:?}", emails);

    let raw = client
        .get_record("my-app", "users", "active-users", "user-1-email")
        .await?;
    let email: Record = raw.parse()?;
    println!("📧 User email: {} ({})\n", email.value, email.record_type);

    // Builder chain
    let electronics = client
        .project("ecommerce")
        .collection("products")
        .cluster("electronics");
    client.project("ecommerce").create().await?;
    client.project("ecommerce").collection("products").create().await?;
    electronics.create().await?;

    electronics
        .record("laptop-name", "STRING", "MacBook Pro")
        .create()
        .await?;
    electronics
        .record("laptop-price", "INTEGER", "2499")
        .create()
        .await?;
    electronics
        .record("laptop-tags", "[]STRING", r#"["apple", "laptop"]"#)
        .create()
        .await?;

    let expensive = electronics
        .search_records(
            &SearchOptions::new()
                .record_type("INTEGER")
                .min_value("2000")
                .sort_by(SortField::Value)
                .sort_order(SortOrder::Desc),
        )
        .await?;
    println!("💰 Expensive items: {:?}", expensive);

    // Cleanup
    client.delete_project("my-app").await?;
    client.project("ecommerce").delete().await?;
    println!("✨ Example completed");

    Ok(())
}
