use std::io::Write;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::io::AsyncBufReadExt;

use mergetip::actions::ActionRouter;
use mergetip::client::{ConversationCache, SettlementError, SettlementExecutor};
use mergetip::config::{config, init_config, MergetipConfig};
use mergetip::extractor::ModelIntentExtractor;
use mergetip::github::OctocrabGatewayBuilder;
use mergetip::message::{ActionRequest, ConversationContext, ResponseMessage, Speaker};
use mergetip::telemetry::{generate_correlation_id, init_telemetry};

#[derive(Parser)]
#[command(name = "mergetip")]
#[command(about = "Chat-driven GitHub pull-request operations with on-merge token rewards")]
#[command(long_about = "Mergetip turns chat messages into GitHub pull-request operations: \
                       merging with a mergeability gate, issue creation, PR comments, and \
                       listings. When a merged PR names a wallet address and a reward amount \
                       was given, the reward is settled as a token transfer.")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat interactively over one conversation
    Chat {
        /// Conversation identifier
        #[arg(long, help = "Reuse a conversation id instead of generating a fresh one")]
        conversation: Option<String>,
    },
    /// Send a single message and print the response
    Send {
        /// The chat message
        message: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    init_telemetry()?;
    init_config()?;

    match cli.command {
        None => tokio::runtime::Runtime::new()?.block_on(chat_command(None)),
        Some(Commands::Chat { conversation }) => {
            tokio::runtime::Runtime::new()?.block_on(chat_command(conversation))
        }
        Some(Commands::Send { message }) => {
            tokio::runtime::Runtime::new()?.block_on(send_command(message))
        }
    }
}

fn build_router(
    cfg: &MergetipConfig,
) -> ActionRouter<ModelIntentExtractor, OctocrabGatewayBuilder> {
    let extractor = ModelIntentExtractor::new(
        cfg.extractor.endpoint.clone(),
        cfg.extractor.model.clone(),
        cfg.extractor.api_key.clone(),
    );
    ActionRouter::new(extractor, OctocrabGatewayBuilder, cfg.github.token.clone())
}

/// What the browser client sends: the configured repository and token ride
/// along with the message so extraction can see them.
fn augment_message(text: &str, cfg: &MergetipConfig) -> String {
    let mut outgoing = text.to_string();
    if let Some(repository) = &cfg.github.default_repository {
        outgoing.push_str(&format!(" my repository is {repository}"));
    }
    if let Some(token) = &cfg.github.token {
        outgoing.push_str(&format!(" and accessToken is {token}"));
    }
    outgoing
}

/// Settle any reward the response carries. The CLI has no wallet transport,
/// so settlement reports the pending reward instead of submitting it.
async fn report_settlement(settlement: &SettlementExecutor, response: &ResponseMessage) {
    let Some(instruction) = &response.metadata else {
        return;
    };
    match settlement.settle(None, instruction).await {
        Ok(transaction) => println!("Reward transfer submitted: {transaction}"),
        Err(SettlementError::WalletNotConnected) => println!(
            "Reward of {} to {} is pending: wallet not connected.",
            instruction.amount, instruction.recipient
        ),
        Err(e) => println!("Reward transfer failed: {e}"),
    }
}

async fn chat_command(conversation: Option<String>) -> Result<()> {
    let cfg = config()?;
    let router = build_router(cfg);
    let settlement = SettlementExecutor::with_decimals(
        cfg.reward.token_contract.clone(),
        cfg.reward.token_decimals,
    );
    let conversation_id = conversation.unwrap_or_else(generate_correlation_id);
    let mut context = ConversationContext::new(conversation_id.clone());
    let mut cache = ConversationCache::new();

    println!("mergetip chat — conversation {conversation_id}. Type 'exit' to quit.");
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "exit" || line == "quit" {
            break;
        }

        if let Err(e) = cache.submit(&conversation_id, line, Vec::new()) {
            tracing::warn!(error = %e, "submit rejected");
            continue;
        }
        let outgoing = augment_message(line, cfg);
        context.record(Speaker::User, outgoing.clone());
        let request = ActionRequest::new(outgoing, &context);

        let response = router.dispatch(&request).await;
        context.record(Speaker::System, response.text.clone());
        cache.reconcile(&conversation_id, vec![response.clone()]);

        println!("{}", response.text);
        report_settlement(&settlement, &response).await;
    }
    Ok(())
}

async fn send_command(message: String) -> Result<()> {
    let cfg = config()?;
    let router = build_router(cfg);
    let settlement = SettlementExecutor::with_decimals(
        cfg.reward.token_contract.clone(),
        cfg.reward.token_decimals,
    );
    let mut context = ConversationContext::new(generate_correlation_id());
    let outgoing = augment_message(&message, cfg);
    context.record(Speaker::User, outgoing.clone());
    let request = ActionRequest::new(outgoing, &context);

    let response = router.dispatch(&request).await;
    println!("{}", response.text);
    report_settlement(&settlement, &response).await;
    Ok(())
}
