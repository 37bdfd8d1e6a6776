use std::io::{self, Write};

use airdesk_agents::{
    build_scraper_config, AirdeskConfig, AirlineAgent, ChatError, OpenAiCompletionClient,
};
use airdesk_core::{
    classify_query, detect_language, language_info, resolve_location, ChatMessage,
    FlightSearchParams, TravelClass,
};
use airdesk_flights::{FlightOfferProvider, FlightSearch};
use airdesk_observability::{init_tracing, AppMetrics};
use airdesk_retrieval::{HttpPageFetcher, KnowledgeScraper};
use anyhow::{anyhow, bail, Context, Result};
use chrono::{Duration, Local, NaiveDate};
use clap::{Parser, Subcommand};
use serde_json::json;

#[derive(Debug, Parser)]
#[command(name = "airdesk")]
#[command(about = "Airdesk customer assistant CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive conversation with the assistant.
    Chat,
    /// Single question, single answer.
    Ask { text: String },
    /// Show how a message would be routed.
    Classify { text: String },
    /// Print the system prompt assembled for a message.
    Prompt { text: String },
    /// Scrape the policy pages and print the knowledge base.
    Kb,
    Flights {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        return_date: Option<NaiveDate>,
        #[arg(long, default_value_t = 1)]
        adults: u8,
        #[arg(long, default_value_t = 0)]
        children: u8,
        #[arg(long, default_value_t = 0)]
        infants: u8,
        #[arg(long)]
        class: Option<String>,
    },
    /// Verify the completion API key with a minimal request.
    CheckKey,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing("airdesk_cli");
    let cli = Cli::parse();

    match cli.command {
        Command::Chat => run_chat(build_agent()?).await?,
        Command::Ask { text } => {
            let agent = build_agent()?;
            let reply = agent
                .handle_chat(&[ChatMessage::user(text)])
                .await
                .map_err(chat_failure)?;
            println!("{}", reply.response);
        }
        Command::Classify { text } => {
            let language = language_info(detect_language(&text));
            let classification = classify_query(&text);
            let payload = json!({
                "language": language,
                "classification": classification,
            });
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        Command::Prompt { text } => {
            let agent = build_agent()?;
            let turn = agent
                .prepare(&[ChatMessage::user(text)])
                .await
                .map_err(chat_failure)?;
            println!("{}", turn.system_prompt);
        }
        Command::Kb => {
            let config = build_scraper_config();
            let fetcher = HttpPageFetcher::new(config.request_timeout)?;
            let scraper = KnowledgeScraper::new(fetcher, config);
            let knowledge = scraper.get_knowledge_base().await;
            println!("{}", serde_json::to_string_pretty(&knowledge)?);
        }
        Command::Flights {
            from,
            to,
            date,
            return_date,
            adults,
            children,
            infants,
            class,
        } => {
            let origin = resolve_location(&from)
                .ok_or_else(|| anyhow!("unknown origin location: {from}"))?;
            let destination = resolve_location(&to)
                .ok_or_else(|| anyhow!("unknown destination location: {to}"))?;
            let departure = date.unwrap_or_else(|| Local::now().date_naive() + Duration::days(1));

            let mut params = FlightSearchParams::new(&origin, &destination, departure);
            params.return_date = return_date;
            params.adults = adults;
            params.children = children;
            params.infants = infants;
            if let Some(class) = class {
                params.travel_class =
                    TravelClass::parse(&class).context("invalid --class value")?;
            }

            let provider = FlightOfferProvider::from_env()?;
            if !provider.is_configured() {
                bail!("flight API credentials are not configured");
            }
            match provider.search(&params).await {
                Some(offers) => println!("{}", serde_json::to_string_pretty(&offers)?),
                None => println!("No flight offers found for {origin} -> {destination} on {departure}."),
            }
        }
        Command::CheckKey => {
            let config = AirdeskConfig::from_env()?;
            let client = OpenAiCompletionClient::new(config.openai)?;
            match client.probe().await {
                Ok(()) => println!("API key accepted (model {}).", client.model()),
                Err(err) => bail!("{}", err.user_message()),
            }
        }
    }

    Ok(())
}

async fn run_chat(agent: AirlineAgent) -> Result<()> {
    let mut history: Vec<ChatMessage> = Vec::new();

    println!("Airdesk chat mode. type 'exit' to quit.");

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }

        let message = line.trim();
        if message.eq_ignore_ascii_case("exit") || message.eq_ignore_ascii_case("quit") {
            break;
        }

        if message.is_empty() {
            continue;
        }

        history.push(ChatMessage::user(message));
        match agent.handle_chat(&history).await {
            Ok(reply) => {
                println!("\n{}\n", reply.response);
                history.push(ChatMessage::assistant(reply.response));
            }
            Err(err) => {
                history.pop();
                eprintln!("\n{}\n", err.user_message());
            }
        }
    }

    Ok(())
}

fn build_agent() -> Result<AirlineAgent> {
    let config = AirdeskConfig::from_env()?;
    AirlineAgent::from_config(&config, AppMetrics::shared())
}

fn chat_failure(err: ChatError) -> anyhow::Error {
    anyhow!("{} (status {})", err.user_message(), err.status_code())
}
