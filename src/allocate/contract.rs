use super::allocator::allocate_declaration;
use super::path::SlotPath;
use super::range::SlotCursor;
use super::{DeclarationTable, VariableReferences};
use crate::ast::{ContractDefinition, ContractResolver};
use crate::config::LayoutConfig;
use crate::errors::LayoutError;
use reth_tracing::tracing::{debug, warn};

/// Storage assigned to one contract's own state variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractStateInfo {
    pub variables: VariableReferences,
    /// Cursor after the contract's last variable; the next contract in the chain starts here
    pub cursor: SlotCursor,
}

/// Allocate the persistent state variables declared directly in `contract`, in source order.
pub fn contract_state_variables(
    contract: &ContractDefinition,
    cursor: SlotCursor,
    table: &DeclarationTable,
    config: &LayoutConfig,
) -> Result<ContractStateInfo, LayoutError> {
    let mut state = ContractStateInfo {
        variables: VariableReferences::new(),
        cursor,
    };

    let persistent = contract
        .nodes
        .iter()
        .filter(|node| node.variable().is_some_and(|v| v.is_persistent()));

    for node in persistent {
        let allocation = allocate_declaration(
            node,
            state.cursor,
            table,
            config.struct_alignment,
            &SlotPath::root(),
        )?;
        state.cursor = allocation.cursor;
        merge_references(&mut state.variables, allocation.variables, &contract.name);
    }

    debug!(
        target: "storage_layout::allocate",
        contract = %contract.name,
        variables = state.variables.len(),
        start = %cursor,
        end = %state.cursor,
        "allocated contract state"
    );
    Ok(state)
}

/// Allocate the state of `contract` including everything it inherits.
///
/// Ancestors are processed most-base first, each starting where the previous
/// one stopped. Ancestors the resolver does not know contribute nothing.
pub fn inherited_state_variables(
    contract: &ContractDefinition,
    contracts: &impl ContractResolver,
    table: &DeclarationTable,
    config: &LayoutConfig,
) -> Result<VariableReferences, LayoutError> {
    let (variables, _) = contract.linearized_base_contracts.iter().rev().try_fold(
        (VariableReferences::new(), SlotCursor::ZERO),
        |(mut variables, cursor), name| {
            let Some(base) = contracts.contract_node(name) else {
                warn!(
                    target: "storage_layout::allocate",
                    contract = %contract.name,
                    base = %name,
                    "no declaration data for base contract, skipping"
                );
                return Ok((variables, cursor));
            };
            let state = contract_state_variables(base, cursor, table, config)?;
            merge_references(&mut variables, state.variables, &contract.name);
            Ok::<_, LayoutError>((variables, state.cursor))
        },
    )?;
    Ok(variables)
}

/// Move `entries` into `variables`. Entries sharing an id (members of two
/// variables of the same struct type) replace the earlier ones.
fn merge_references(variables: &mut VariableReferences, entries: VariableReferences, contract: &str) {
    for (id, reference) in entries {
        let range = reference.pointer.storage;
        let label = reference.label();
        if let Some(previous) = variables.insert(id, reference) {
            warn!(
                target: "storage_layout::allocate",
                contract,
                id,
                previous = %previous.label(),
                previous_range = %previous.pointer.storage,
                kept = %label,
                %range,
                "declaration id allocated twice, keeping the later range"
            );
        }
    }
}
