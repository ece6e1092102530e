use anyhow::Context;
use users_api_harness::configuration::get_configuration;
use users_api_harness::scenario::Scenario;
use users_api_harness::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("users_api_harness".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let configuration = get_configuration().context("Failed to read configuration.")?;
    let client = configuration
        .api
        .client()
        .context("Failed to build the users API client.")?;

    let report = Scenario::new(&client, &configuration.fixtures)
        .run()
        .await?;
    tracing::info!(
        completed_steps = report.completed().len(),
        "Users API scenario passed against {}",
        client.base_url()
    );
    Ok(())
}
