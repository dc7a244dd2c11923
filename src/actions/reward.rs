// Reward instruction composition from pull-request narrative text.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::json;

use crate::message::RewardInstruction;

/// Tag prefixing the machine-readable transfer marker in merge commits.
pub const TRANSFER_MARKER_TAG: &str = "PROCESS_TRX";

static ADDRESS_PATTERN: OnceLock<Regex> = OnceLock::new();

fn address_pattern() -> &'static Regex {
    // Ethereum-like addresses, 40-64 hex characters.
    ADDRESS_PATTERN
        .get_or_init(|| Regex::new(r"0x[a-fA-F0-9]{40,64}").expect("address pattern compiles"))
}

/// First hex-address-shaped substring in the narrative text, case preserved.
///
/// Shape-only, first match wins, no checksum validation. The pull-request
/// author controls this text: attaching a reward amount pays whatever
/// address appears first, so callers decide whether that trust is acceptable.
pub fn extract_wallet_address(text: &str) -> Option<&str> {
    address_pattern().find(text).map(|m| m.as_str())
}

/// Assemble a reward instruction when the narrative text names a wallet and
/// a reward amount was supplied; otherwise none.
pub fn compose_reward(
    body: Option<&str>,
    reward_amount: Option<&str>,
) -> Option<RewardInstruction> {
    let recipient = extract_wallet_address(body?)?;
    let amount = reward_amount?;
    Some(RewardInstruction {
        recipient: recipient.to_string(),
        amount: amount.to_string(),
    })
}

/// Machine-readable marker carrying the reward context into commit history,
/// auditable independently of the chat transport.
pub fn commit_marker(instruction: &RewardInstruction) -> String {
    let payload = json!({
        "amount": instruction.amount,
        "recipient": instruction.recipient,
    });
    format!("{TRANSFER_MARKER_TAG}:::{payload}")
}

/// Commit message for the merge: the caller's message or the default, with
/// the transfer marker appended whenever a reward instruction exists.
pub fn merge_commit_message(
    pull_number: u64,
    custom: Option<&str>,
    instruction: Option<&RewardInstruction>,
) -> String {
    let base = custom
        .map(str::to_string)
        .unwrap_or_else(|| format!("Merge pull request #{pull_number}"));
    match instruction {
        Some(instruction) => format!("{base}, {}", commit_marker(instruction)),
        None => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str =
        "pay me at 0x044015e4766d36f6d31458fed9f292c3afafd08f1991b1f58f5a14826d7fa22a";

    #[test]
    fn first_address_wins_and_case_is_preserved() {
        let text = "send to 0xAbCdEf1234567890aBcDeF1234567890abcdef12 or \
                    0x1111111111111111111111111111111111111111";
        assert_eq!(
            extract_wallet_address(text),
            Some("0xAbCdEf1234567890aBcDeF1234567890abcdef12")
        );
    }

    #[test]
    fn short_hex_runs_are_not_addresses() {
        assert_eq!(extract_wallet_address("commit 0xdeadbeef"), None);
    }

    #[test]
    fn reward_needs_both_address_and_amount() {
        assert!(compose_reward(Some(BODY), None).is_none());
        assert!(compose_reward(Some("no address here"), Some("10")).is_none());
        assert!(compose_reward(None, Some("10")).is_none());

        let instruction = compose_reward(Some(BODY), Some("10")).unwrap();
        assert_eq!(
            instruction.recipient,
            "0x044015e4766d36f6d31458fed9f292c3afafd08f1991b1f58f5a14826d7fa22a"
        );
        assert_eq!(instruction.amount, "10");
    }

    #[test]
    fn marker_is_tagged_json() {
        let instruction = RewardInstruction {
            recipient: "0xabc".repeat(14),
            amount: "10".to_string(),
        };
        let marker = commit_marker(&instruction);
        assert!(marker.starts_with("PROCESS_TRX:::"));
        let payload: serde_json::Value =
            serde_json::from_str(marker.trim_start_matches("PROCESS_TRX:::")).unwrap();
        assert_eq!(payload["amount"], "10");
    }

    #[test]
    fn commit_message_defaults_and_embeds_marker() {
        assert_eq!(merge_commit_message(7, None, None), "Merge pull request #7");
        assert_eq!(
            merge_commit_message(7, Some("Ship it"), None),
            "Ship it"
        );

        let instruction = compose_reward(Some(BODY), Some("10")).unwrap();
        let message = merge_commit_message(7, None, Some(&instruction));
        assert!(message.starts_with("Merge pull request #7, PROCESS_TRX:::"));

        let custom = merge_commit_message(7, Some("Ship it"), Some(&instruction));
        assert!(custom.starts_with("Ship it, PROCESS_TRX:::"));
    }
}
