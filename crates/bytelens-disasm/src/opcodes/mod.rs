use std::borrow::Cow;

use once_cell::sync::Lazy;

/// How an opcode's operand is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpcodeCategory {
    /// No table lookup; the raw operand (if any) is shown as-is.
    Plain,
    Const,
    Name,
    JumpRelative,
    JumpAbsolute,
    Local,
    Compare,
    Free,
}

/// Comparison operators indexed by the operand of a compare opcode.
pub const COMPARE_OPS: &[&str] = &[
    "<",
    "<=",
    "==",
    "!=",
    ">",
    ">=",
    "in",
    "not in",
    "is",
    "is not",
    "exception match",
    "BAD",
];

/// Immutable opcode classification shared by the decoder, the jump target
/// collector and the operand resolver.
#[derive(Debug, Clone)]
pub struct OpcodeTable {
    names: [Option<&'static str>; 256],
    categories: [OpcodeCategory; 256],
    have_argument: u8,
    extended_arg: u8,
    compare_ops: &'static [&'static str],
}

impl OpcodeTable {
    /// Empty table: every opcode is unnamed and `Plain`.
    pub fn new(have_argument: u8, extended_arg: u8) -> Self {
        Self {
            names: [None; 256],
            categories: [OpcodeCategory::Plain; 256],
            have_argument,
            extended_arg,
            compare_ops: COMPARE_OPS,
        }
    }

    /// Registers a mnemonic and category for `opcode`.
    pub fn define(mut self, opcode: u8, name: &'static str, category: OpcodeCategory) -> Self {
        self.names[opcode as usize] = Some(name);
        self.categories[opcode as usize] = category;
        self
    }

    pub fn with_compare_ops(mut self, ops: &'static [&'static str]) -> Self {
        self.compare_ops = ops;
        self
    }

    /// Wordcode table with byte-addressed jumps (CPython 3.8 numbering).
    pub fn cpython_38() -> Self {
        use OpcodeCategory::*;
        let plain: &[(u8, &'static str)] = &[
            (1, "POP_TOP"),
            (2, "ROT_TWO"),
            (3, "ROT_THREE"),
            (4, "DUP_TOP"),
            (5, "DUP_TOP_TWO"),
            (6, "ROT_FOUR"),
            (9, "NOP"),
            (10, "UNARY_POSITIVE"),
            (11, "UNARY_NEGATIVE"),
            (12, "UNARY_NOT"),
            (15, "UNARY_INVERT"),
            (16, "BINARY_MATRIX_MULTIPLY"),
            (17, "INPLACE_MATRIX_MULTIPLY"),
            (19, "BINARY_POWER"),
            (20, "BINARY_MULTIPLY"),
            (22, "BINARY_MODULO"),
            (23, "BINARY_ADD"),
            (24, "BINARY_SUBTRACT"),
            (25, "BINARY_SUBSCR"),
            (26, "BINARY_FLOOR_DIVIDE"),
            (27, "BINARY_TRUE_DIVIDE"),
            (28, "INPLACE_FLOOR_DIVIDE"),
            (29, "INPLACE_TRUE_DIVIDE"),
            (50, "GET_AITER"),
            (51, "GET_ANEXT"),
            (52, "BEFORE_ASYNC_WITH"),
            (53, "BEGIN_FINALLY"),
            (54, "END_ASYNC_FOR"),
            (55, "INPLACE_ADD"),
            (56, "INPLACE_SUBTRACT"),
            (57, "INPLACE_MULTIPLY"),
            (59, "INPLACE_MODULO"),
            (60, "STORE_SUBSCR"),
            (61, "DELETE_SUBSCR"),
            (62, "BINARY_LSHIFT"),
            (63, "BINARY_RSHIFT"),
            (64, "BINARY_AND"),
            (65, "BINARY_XOR"),
            (66, "BINARY_OR"),
            (67, "INPLACE_POWER"),
            (68, "GET_ITER"),
            (69, "GET_YIELD_FROM_ITER"),
            (70, "PRINT_EXPR"),
            (71, "LOAD_BUILD_CLASS"),
            (72, "YIELD_FROM"),
            (73, "GET_AWAITABLE"),
            (75, "INPLACE_LSHIFT"),
            (76, "INPLACE_RSHIFT"),
            (77, "INPLACE_AND"),
            (78, "INPLACE_XOR"),
            (79, "INPLACE_OR"),
            (81, "WITH_CLEANUP_START"),
            (82, "WITH_CLEANUP_FINISH"),
            (83, "RETURN_VALUE"),
            (84, "IMPORT_STAR"),
            (85, "SETUP_ANNOTATIONS"),
            (86, "YIELD_VALUE"),
            (87, "POP_BLOCK"),
            (88, "END_FINALLY"),
            (89, "POP_EXCEPT"),
            // argument-bearing from here on
            (92, "UNPACK_SEQUENCE"),
            (94, "UNPACK_EX"),
            (102, "BUILD_TUPLE"),
            (103, "BUILD_LIST"),
            (104, "BUILD_SET"),
            (105, "BUILD_MAP"),
            (130, "RAISE_VARARGS"),
            (131, "CALL_FUNCTION"),
            (132, "MAKE_FUNCTION"),
            (133, "BUILD_SLICE"),
            (141, "CALL_FUNCTION_KW"),
            (142, "CALL_FUNCTION_EX"),
            (144, "EXTENDED_ARG"),
            (145, "LIST_APPEND"),
            (146, "SET_ADD"),
            (147, "MAP_ADD"),
            (149, "BUILD_LIST_UNPACK"),
            (150, "BUILD_MAP_UNPACK"),
            (151, "BUILD_MAP_UNPACK_WITH_CALL"),
            (152, "BUILD_TUPLE_UNPACK"),
            (153, "BUILD_SET_UNPACK"),
            (155, "FORMAT_VALUE"),
            (156, "BUILD_CONST_KEY_MAP"),
            (157, "BUILD_STRING"),
            (158, "BUILD_TUPLE_UNPACK_WITH_CALL"),
            (161, "CALL_METHOD"),
            (163, "POP_FINALLY"),
        ];
        let classified: &[(u8, &'static str, OpcodeCategory)] = &[
            (90, "STORE_NAME", Name),
            (91, "DELETE_NAME", Name),
            (93, "FOR_ITER", JumpRelative),
            (95, "STORE_ATTR", Name),
            (96, "DELETE_ATTR", Name),
            (97, "STORE_GLOBAL", Name),
            (98, "DELETE_GLOBAL", Name),
            (100, "LOAD_CONST", Const),
            (101, "LOAD_NAME", Name),
            (106, "LOAD_ATTR", Name),
            (107, "COMPARE_OP", Compare),
            (108, "IMPORT_NAME", Name),
            (109, "IMPORT_FROM", Name),
            (110, "JUMP_FORWARD", JumpRelative),
            (111, "JUMP_IF_FALSE_OR_POP", JumpAbsolute),
            (112, "JUMP_IF_TRUE_OR_POP", JumpAbsolute),
            (113, "JUMP_ABSOLUTE", JumpAbsolute),
            (114, "POP_JUMP_IF_FALSE", JumpAbsolute),
            (115, "POP_JUMP_IF_TRUE", JumpAbsolute),
            (116, "LOAD_GLOBAL", Name),
            (122, "SETUP_FINALLY", JumpRelative),
            (124, "LOAD_FAST", Local),
            (125, "STORE_FAST", Local),
            (126, "DELETE_FAST", Local),
            (135, "LOAD_CLOSURE", Free),
            (136, "LOAD_DEREF", Free),
            (137, "STORE_DEREF", Free),
            (138, "DELETE_DEREF", Free),
            (143, "SETUP_WITH", JumpRelative),
            (148, "LOAD_CLASSDEREF", Free),
            (154, "SETUP_ASYNC_WITH", JumpRelative),
            (160, "LOAD_METHOD", Name),
            (162, "CALL_FINALLY", JumpRelative),
        ];

        let mut table = Self::new(90, 144);
        for &(op, name) in plain {
            table = table.define(op, name, Plain);
        }
        for &(op, name, category) in classified {
            table = table.define(op, name, category);
        }
        table
    }

    pub fn have_argument(&self) -> u8 {
        self.have_argument
    }

    pub fn extended_arg(&self) -> u8 {
        self.extended_arg
    }

    pub fn takes_argument(&self, opcode: u8) -> bool {
        opcode >= self.have_argument
    }

    pub fn category(&self, opcode: u8) -> OpcodeCategory {
        self.categories[opcode as usize]
    }

    /// Mnemonic for `opcode`; unknown opcodes render as `<N>`.
    pub fn mnemonic(&self, opcode: u8) -> Cow<'static, str> {
        match self.names[opcode as usize] {
            Some(name) => Cow::Borrowed(name),
            None => Cow::Owned(format!("<{}>", opcode)),
        }
    }

    pub fn compare_ops(&self) -> &'static [&'static str] {
        self.compare_ops
    }
}

/// Shared built-in table.
pub static CPYTHON_38: Lazy<OpcodeTable> = Lazy::new(OpcodeTable::cpython_38);
