pub mod models;
pub mod proposal;
pub mod workflow;

pub use models::{OfferAction, OfferPatch, OfferView};
pub use proposal::{Proposal, ProposalInput, Terms};
pub use workflow::OfferWorkflow;
