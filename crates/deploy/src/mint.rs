//! Mint orchestration: one flow per contract type.
//!
//! The synchronous and threshold flows are plain submit-confirm-read sequences.
//! The asynchronous flow races a completion-event poll against a fixed timeout;
//! whichever side finishes first wins and the losing future is dropped, so no
//! listener or poll loop outlives the wait.

use std::future::Future;
use std::time::Duration;

use alloy_core::primitives::U256;
use anyhow::{Context, Result};

use crate::contracts::{BasicNft, DynamicNft, MintedEvent, RandomNft, VrfCoordinatorMock};

/// Upper bound on waiting for the asynchronous mint to complete.
pub const MINT_WAIT_TIMEOUT: Duration = Duration::from_secs(300);

/// Threshold value passed to the dynamic NFT mint: 4000 ether-denominated
/// units, comfortably above the mock feed's 2000 reading, so the minted token
/// reports the "high" variant.
pub const DYNAMIC_HIGH_VALUE_WEI: u128 = 4_000_000_000_000_000_000_000;

/// Terminal outcome of the asynchronous mint flow.
///
/// `Requested -> (local: FulfillmentTriggered) -> Minted | TimedOut`.
/// `TimedOut` abandons local waiting only; the on-chain request is not rolled
/// back and may still complete later.
#[derive(Debug)]
pub enum RandomMintOutcome {
    Minted(MintedEvent),
    TimedOut,
}

/// Synchronous flow: mint, wait one confirmation, read back the token URI.
pub async fn mint_basic(nft: &BasicNft) -> Result<String> {
    let counter_before = nft.token_counter().await?;
    let receipt = nft.mint().await?;
    let token_uri = nft.token_uri(counter_before).await?;
    let owner = nft.owner_of(counter_before).await?;

    tracing::info!(
        token_id = %counter_before,
        %token_uri,
        %owner,
        block = receipt.block_number,
        "Basic NFT minted"
    );
    Ok(token_uri)
}

/// Asynchronous flow: request randomness, trigger the mock fulfillment on
/// local networks, then wait for the minted event or the timeout.
pub async fn mint_random(
    nft: &RandomNft,
    coordinator: Option<&VrfCoordinatorMock>,
) -> Result<RandomMintOutcome> {
    let fee = nft.mint_fee().await?;
    let request = nft.request_nft(fee).await?;
    tracing::info!(request_id = %request.request_id, %fee, "Randomness requested");

    if let Some(coordinator) = coordinator {
        // No oracle network exists locally; trigger the fulfillment ourselves.
        coordinator
            .fulfill_random_words(request.request_id, nft.address)
            .await
            .context("Failed to simulate randomness fulfillment")?;
        tracing::info!(request_id = %request.request_id, "Mock fulfillment triggered");
    }

    match first_of(MINT_WAIT_TIMEOUT, nft.wait_for_minted(request.block_number)).await {
        Some(minted) => {
            let minted = minted?;
            let token_uri = nft.token_uri(minted.token_id).await?;
            tracing::info!(
                token_id = %minted.token_id,
                breed = ?minted.breed,
                minter = %minted.minter,
                %token_uri,
                "Random NFT minted"
            );
            Ok(RandomMintOutcome::Minted(minted))
        }
        None => {
            tracing::warn!(
                timeout_secs = MINT_WAIT_TIMEOUT.as_secs(),
                request_id = %request.request_id,
                "Timed out waiting for the minted event; the on-chain request stays pending"
            );
            Ok(RandomMintOutcome::TimedOut)
        }
    }
}

/// Threshold flow: mint with a value parameter, wait one confirmation, read
/// back the token URI reporting the selected variant.
pub async fn mint_dynamic(nft: &DynamicNft, high_value: U256) -> Result<String> {
    let receipt = nft.mint(high_value).await?;
    let token_uri = nft.token_uri(U256::ZERO).await?;
    tracing::info!(
        %high_value,
        %token_uri,
        block = receipt.block_number,
        "Dynamic NFT minted"
    );
    Ok(token_uri)
}

/// Single-resolution race between a wait future and a deadline.
///
/// Returns `Some` with the future's output if it completes in time, `None` if
/// the deadline wins. The losing side is dropped either way.
async fn first_of<F: Future>(deadline: Duration, wait: F) -> Option<F::Output> {
    tokio::time::timeout(deadline, wait).await.ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_of_returns_completed_value() {
        let result = first_of(Duration::from_secs(1), async { 5 }).await;
        assert_eq!(result, Some(5));
    }

    #[tokio::test]
    async fn test_first_of_deadline_wins_over_pending_wait() {
        let result = first_of(Duration::from_millis(10), std::future::pending::<u64>()).await;
        assert_eq!(result, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_of_deadline_matches_mint_timeout() {
        // With virtual time, the full 5-minute bound elapses instantly.
        let result = first_of(MINT_WAIT_TIMEOUT, std::future::pending::<u64>()).await;
        assert_eq!(result, None);
    }
}
