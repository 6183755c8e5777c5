/// Width of one storage slot in bytes
pub const SLOT_SIZE: usize = 32;
/// Address and contract reference width in bytes
pub const ADDRESS_LENGTH: usize = 20;
/// Internal function pointer width in bytes (code offset pair)
pub const INTERNAL_FUNCTION_LENGTH: usize = 8;
/// External function pointer width in bytes (address + selector)
pub const EXTERNAL_FUNCTION_LENGTH: usize = 24;

/// Compiler AST node kinds the loader distinguishes
pub mod node_types {
    pub const SOURCE_UNIT: &str = "SourceUnit";
    pub const CONTRACT_DEFINITION: &str = "ContractDefinition";
    pub const VARIABLE_DECLARATION: &str = "VariableDeclaration";
    pub const STRUCT_DEFINITION: &str = "StructDefinition";
    pub const ENUM_DEFINITION: &str = "EnumDefinition";
    pub const USER_DEFINED_VALUE_TYPE_DEFINITION: &str = "UserDefinedValueTypeDefinition";
    pub const ARRAY_TYPE_NAME: &str = "ArrayTypeName";
}
