use super::path::{PathSegment, SlotPath};
use super::range::{allocate_value, SlotCursor};
use super::{DeclarationTable, StoragePointer, VariableReference, VariableReferences};
use crate::ast::{AstId, Declaration};
use crate::config::StructAlignment;
use crate::errors::LayoutError;
use reth_tracing::tracing::{trace, warn};

/// Result of allocating one declaration: the advanced cursor and the new entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Allocation {
    pub cursor: SlotCursor,
    pub variables: VariableReferences,
}

/// Assign storage to `declaration` starting at `cursor`.
///
/// Elementary variables get one entry. Struct variables get one entry per
/// (transitively) elementary member, all threaded through the same cursor;
/// the struct variable itself gets none. Non-variable declarations are
/// ignored.
pub fn allocate_declaration(
    declaration: &Declaration,
    cursor: SlotCursor,
    table: &DeclarationTable,
    alignment: StructAlignment,
    path: &SlotPath,
) -> Result<Allocation, LayoutError> {
    let mut allocation = Allocation {
        cursor,
        variables: VariableReferences::new(),
    };
    let mut expanding = Vec::new();
    allocate_into(
        declaration,
        table,
        alignment,
        path,
        &mut expanding,
        &mut allocation,
    )?;
    Ok(allocation)
}

/// `expanding` holds the ids of the structs currently being laid out, innermost last.
fn allocate_into(
    declaration: &Declaration,
    table: &DeclarationTable,
    alignment: StructAlignment,
    path: &SlotPath,
    expanding: &mut Vec<AstId>,
    allocation: &mut Allocation,
) -> Result<(), LayoutError> {
    match declaration {
        Declaration::ElementaryVariable(variable) => {
            let (range, next) = allocate_value(allocation.cursor, variable.width);
            trace!(
                target: "storage_layout::allocate",
                id = variable.header.id,
                name = %variable.header.name,
                width = %variable.width,
                %range,
                "allocated value"
            );
            let reference = VariableReference {
                definition: variable.clone(),
                pointer: StoragePointer { storage: range },
                path: path.clone(),
            };
            if let Some(previous) = allocation.variables.insert(variable.header.id, reference) {
                warn!(
                    target: "storage_layout::allocate",
                    id = variable.header.id,
                    previous = %previous.pointer.storage,
                    %range,
                    "declaration allocated twice in one pass, keeping the later range"
                );
            }
            allocation.cursor = next;
        }
        Declaration::StructVariable(variable) => {
            if expanding.contains(&variable.struct_id) {
                return Err(LayoutError::RecursiveStruct(variable.struct_id));
            }
            let members = table.struct_members(variable.struct_id)?;
            if alignment == StructAlignment::SlotBoundary {
                allocation.cursor = allocation.cursor.align_to_slot();
            }
            let member_path = path.push(PathSegment {
                declaration: variable.header.id,
                label: variable.header.name.clone(),
                start: allocation.cursor.address(),
            });
            expanding.push(variable.struct_id);
            for member in members {
                allocate_into(member, table, alignment, &member_path, expanding, allocation)?;
            }
            expanding.pop();
            if alignment == StructAlignment::SlotBoundary {
                allocation.cursor = allocation.cursor.align_to_slot();
            }
        }
        _ => {}
    }
    Ok(())
}
