//! Typed bindings for the contracts the harness deploys and drives.
//!
//! Each contract gets a thin handle owning a [`crate::rpc::ChainClient`], the
//! deployed address, and the caller identity. Calls are ABI-encoded by canonical
//! signature; events are decoded by signature topic, never by log position.

pub mod basic_nft;
pub mod dynamic_nft;
pub mod mocks;
pub mod random_nft;

pub use basic_nft::BasicNft;
pub use dynamic_nft::DynamicNft;
pub use mocks::{PriceFeedMock, VrfCoordinatorMock};
pub use random_nft::{Breed, MintRequest, MintedEvent, RandomNft, RandomNftCtor};
