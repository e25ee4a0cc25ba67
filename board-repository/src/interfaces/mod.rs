//! This module defines and re-exports the interfaces for the board repository.
//! It serves as a central point for accessing traits related to data interaction.
mod content;
mod reports;
mod votes;

pub use content::ContentRepository;
pub use reports::ReportRepository;
pub use votes::VoteRepository;
