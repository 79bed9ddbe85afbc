//! Manual addressing: placeholders the user fills in one by one.

use super::{new_entry, AddressingMode, StrategyInput};
use crate::models::AddressPlanEntry;

pub(super) fn build(input: &StrategyInput) -> Vec<AddressPlanEntry> {
    input
        .requirements
        .iter()
        .map(|req| new_entry(req, AddressingMode::Manual))
        .collect()
}
