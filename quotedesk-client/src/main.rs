use anyhow::Context;
use clap::{Parser, Subcommand};
use quotedesk_client::config::{get_config_path, ClientConfig};
use quotedesk_client::handlers::{analytics, attachments, tickets};
use quotedesk_client::helpers::logging::init_tracing;
use quotedesk_client::{HttpTicketApi, TicketApi, TicketStore};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "quotedesk", author, version, about, long_about = None)]
struct Args {
    #[arg(long, global = true)]
    log_file_path: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List monitor tickets matching the given filters
    Tickets(tickets::TicketsArgs),
    /// Poll the ticket list and print status counts until Ctrl+C
    Watch(tickets::FilterArgs),
    /// Upload quotation or CPO files to a ticket
    Upload(attachments::UploadArgs),
    /// Delete a quotation or CPO file
    Delete(attachments::DeleteArgs),
    /// Change the amount of a quotation file
    SetAmount(attachments::SetAmountArgs),
    SetStatus(tickets::SetStatusArgs),
    SetPriority(tickets::SetPriorityArgs),
    /// Employee KPIs, funnel and workload
    Analytics(analytics::AnalyticsArgs),
    /// Print the config file location
    Config {
        /// Also print the effective configuration
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let _log_guard = init_tracing(args.log_file_path.as_deref());

    let (config, config_path) = ClientConfig::load().context("Failed to load config")?;
    tracing::debug!("Loaded config from {}", config_path.display());

    let api: Arc<dyn TicketApi> =
        Arc::new(HttpTicketApi::new(&config.backend).context("Failed to build HTTP client")?);
    let store = Arc::new(TicketStore::new(Arc::clone(&api), config.list_query()));
    let timestamp_format = config.display.timestamp_format.as_str();

    match &args.command {
        Command::Tickets(cmd) => tickets::list(&store, &config, cmd).await,
        Command::Watch(cmd) => tickets::watch(store, &config, cmd).await,
        Command::Upload(cmd) => attachments::upload(store, timestamp_format, cmd).await,
        Command::Delete(cmd) => attachments::delete(store, timestamp_format, cmd).await,
        Command::SetAmount(cmd) => attachments::set_amount(store, timestamp_format, cmd).await,
        Command::SetStatus(cmd) => tickets::set_status(&store, cmd).await,
        Command::SetPriority(cmd) => tickets::set_priority(&store, cmd).await,
        Command::Analytics(cmd) => analytics::show(api.as_ref(), cmd).await,
        Command::Config { show } => {
            println!("{}", get_config_path().display());
            if *show {
                println!("{}", config.redacted().to_toml().context("Failed to render config")?);
            }
            Ok(())
        }
    }
}
