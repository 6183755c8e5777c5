//! Type classification and storage widths.
//!
//! The allocator never looks at type names itself: it receives declarations
//! that were already classified by a [`TypeSizer`] when the artifacts were
//! loaded. [`SolidityTypeSizer`] is the default, driven by the compiler's
//! `typeIdentifier` strings (`t_uint128`, `t_struct$_Pair_$12_storage`, ...).
//!
//! Some widths depend on other declarations: a user-defined value type is as
//! wide as its underlying type, and a static array of structs needs the size
//! of the struct. Those are looked up through [`TypeDefinitions`].

use crate::ast::AstId;
use crate::constants::{
    ADDRESS_LENGTH, EXTERNAL_FUNCTION_LENGTH, INTERNAL_FUNCTION_LENGTH, SLOT_SIZE,
};
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

/// Whether a value is stored inline with a known width or laid out member by member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeClass {
    /// Fixed-width value (including mappings and dynamic arrays, which own one slot)
    Elementary,
    /// Struct whose members are allocated individually
    Struct,
}

/// Type information attached to a variable declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDescriptor {
    /// Compiler type identifier, e.g. `t_uint256` or `t_struct$_S_$4_storage`
    pub type_identifier: String,
    /// Human readable type, e.g. `uint256` or `struct Vault.Position`
    pub type_string: String,
    /// Declaration a user-defined type name points at (struct, enum, contract, value type)
    pub referenced_declaration: Option<AstId>,
    /// Element type for arrays
    pub base: Option<Box<TypeDescriptor>>,
}

impl TypeDescriptor {
    /// Create a descriptor for a plain elementary type.
    pub fn elementary(type_identifier: &str, type_string: &str) -> Self {
        Self {
            type_identifier: type_identifier.to_string(),
            type_string: type_string.to_string(),
            ..Default::default()
        }
    }

    /// Length of a fixed-size array type, read from the trailing `[N]` of the type string.
    ///
    /// Returns `None` for dynamic arrays and non-array types.
    pub fn static_length(&self) -> Option<U256> {
        let mut ty = self.type_string.as_str();
        for location in [" storage ref", " storage pointer", " memory", " calldata"] {
            if let Some(stripped) = ty.strip_suffix(location) {
                ty = stripped;
                break;
            }
        }
        let inner = ty.strip_suffix(']')?;
        let open = inner.rfind('[')?;
        let digits = &inner[open + 1..];
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        U256::from_str_radix(digits, 10).ok()
    }

    /// Id of the user-defined type this descriptor names (struct, enum, value type).
    pub fn declaration_id(&self) -> Option<AstId> {
        self.referenced_declaration
            .or_else(|| declaration_id_from_identifier(&self.type_identifier))
    }
}

/// Extract the declaration id from identifiers like `t_struct$_Name_$12_storage`.
pub fn declaration_id_from_identifier(identifier: &str) -> Option<AstId> {
    let (_, rest) = identifier.split_once("$_")?;
    let (_, tail) = rest.rsplit_once("_$")?;
    let digits: String = tail.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// User-defined types that widths can depend on, looked up by declaration id.
pub trait TypeDefinitions {
    /// Storage size of a struct in bytes (a whole number of slots).
    fn struct_size(&self, id: AstId) -> Option<U256>;

    /// Underlying type of a user-defined value type.
    fn value_type(&self, id: AstId) -> Option<&TypeDescriptor>;
}

/// No definitions at all; every width that needs one is unknown.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDefinitions;

impl TypeDefinitions for NoDefinitions {
    fn struct_size(&self, _id: AstId) -> Option<U256> {
        None
    }

    fn value_type(&self, _id: AstId) -> Option<&TypeDescriptor> {
        None
    }
}

/// Pure classification and sizing of declared types.
pub trait TypeSizer {
    /// Classify a type as elementary or struct.
    fn type_class(&self, ty: &TypeDescriptor) -> TypeClass;

    /// Storage width in bytes of an elementary type.
    ///
    /// Returns `None` when the width depends on a definition `definitions` does not have.
    fn storage_size(&self, ty: &TypeDescriptor, definitions: &impl TypeDefinitions)
        -> Option<U256>;
}

/// Storage widths following the Solidity storage layout rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolidityTypeSizer;

impl TypeSizer for SolidityTypeSizer {
    fn type_class(&self, ty: &TypeDescriptor) -> TypeClass {
        if ty.type_identifier.starts_with("t_struct") {
            TypeClass::Struct
        } else {
            TypeClass::Elementary
        }
    }

    fn storage_size(
        &self,
        ty: &TypeDescriptor,
        definitions: &impl TypeDefinitions,
    ) -> Option<U256> {
        let id = ty.type_identifier.as_str();
        let bytes = |n: usize| Some(U256::from(n));

        if id == "t_bool" || id.starts_with("t_enum") {
            return bytes(1);
        }
        if id.starts_with("t_address") || id.starts_with("t_contract") {
            return bytes(ADDRESS_LENGTH);
        }
        if id.starts_with("t_function_internal") {
            return bytes(INTERNAL_FUNCTION_LENGTH);
        }
        if id.starts_with("t_function_external") {
            return bytes(EXTERNAL_FUNCTION_LENGTH);
        }
        if id.starts_with("t_userDefinedValueType") {
            let underlying = definitions.value_type(ty.declaration_id()?)?;
            return self.storage_size(underlying, definitions);
        }
        if id.starts_with("t_array") {
            return self.array_size(ty, definitions);
        }
        if let Some(bits) = id
            .strip_prefix("t_uint")
            .or_else(|| id.strip_prefix("t_int"))
        {
            return bytes(bits_to_bytes(bits));
        }
        if let Some(precision) = id
            .strip_prefix("t_ufixed")
            .or_else(|| id.strip_prefix("t_fixed"))
        {
            return bytes(bits_to_bytes(precision.split('x').next().unwrap_or_default()));
        }
        if let Some(len) = id.strip_prefix("t_bytes") {
            // `t_bytes_storage` and friends are dynamic and own a full slot
            return bytes(len.parse().unwrap_or(SLOT_SIZE));
        }

        // mappings, strings and anything unknown
        bytes(SLOT_SIZE)
    }
}

impl SolidityTypeSizer {
    /// Fixed-size arrays occupy whole slots; elements pack within them.
    fn array_size(&self, ty: &TypeDescriptor, definitions: &impl TypeDefinitions) -> Option<U256> {
        let slot_size = U256::from(SLOT_SIZE);
        let (Some(len), Some(base)) = (ty.static_length(), ty.base.as_deref()) else {
            return Some(slot_size);
        };
        let slots = match self.type_class(base) {
            // struct elements each start a new slot
            TypeClass::Struct => {
                let size = definitions.struct_size(base.declaration_id()?)?;
                len.saturating_mul(div_ceil(size, slot_size))
            }
            TypeClass::Elementary => {
                let width = self.storage_size(base, definitions)?.max(U256::from(1));
                if width <= slot_size {
                    div_ceil(len, slot_size / width)
                } else {
                    len.saturating_mul(div_ceil(width, slot_size))
                }
            }
        };
        Some(slots.max(U256::from(1)).saturating_mul(slot_size))
    }
}

fn div_ceil(value: U256, divisor: U256) -> U256 {
    let quotient = value / divisor;
    if (value % divisor).is_zero() {
        quotient
    } else {
        quotient + U256::from(1)
    }
}

fn bits_to_bytes(bits: &str) -> usize {
    bits.parse::<usize>().map(|b| b / 8).unwrap_or(SLOT_SIZE)
}
