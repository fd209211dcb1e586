use anyhow::Result;
use waste_dashboard::{logging, web, Config, DataContext};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    logging::init_stdout();

    let config = Config::from_env();
    config.report_rejected();

    // Refuse to start without data
    let ctx = DataContext::load_table(&config)?;

    web::serve(&config, ctx).await
}
