/*!
 * Bytelens Types
 *
 * Modelo de dados das unidades de código desmontadas pela workspace
 */

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::utils::{py_float_str, py_repr_bytes, py_repr_str};

/// Número de linha no código-fonte
pub type LineNumber = i64;

/// Valor do pool de constantes de uma unidade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Constant {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    Tuple(Vec<Constant>),
    FrozenSet(Vec<Constant>),
    Ellipsis,
    /// Unidade aninhada (corpo de função, classe, compreensão...)
    Code(Arc<CodeObject>),
}

impl Constant {
    /// Representação canônica do valor, com aspas para textos
    pub fn repr(&self) -> String {
        match self {
            Constant::Str(s) => py_repr_str(s),
            other => other.to_string(),
        }
    }

    /// Unidade aninhada contida nesta constante, se houver
    pub fn as_code(&self) -> Option<&Arc<CodeObject>> {
        match self {
            Constant::Code(code) => Some(code),
            _ => None,
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::None => write!(f, "None"),
            Constant::Bool(true) => write!(f, "True"),
            Constant::Bool(false) => write!(f, "False"),
            Constant::Int(v) => write!(f, "{}", v),
            Constant::Float(v) => write!(f, "{}", py_float_str(*v)),
            Constant::Str(s) => write!(f, "{}", s),
            Constant::Bytes(b) => write!(f, "{}", py_repr_bytes(b)),
            Constant::Tuple(items) => {
                let parts: Vec<String> = items.iter().map(Constant::repr).collect();
                if parts.len() == 1 {
                    write!(f, "({},)", parts[0])
                } else {
                    write!(f, "({})", parts.join(", "))
                }
            }
            Constant::FrozenSet(items) => {
                if items.is_empty() {
                    return write!(f, "frozenset()");
                }
                let parts: Vec<String> = items.iter().map(Constant::repr).collect();
                write!(f, "frozenset({{{}}})", parts.join(", "))
            }
            Constant::Ellipsis => write!(f, "Ellipsis"),
            Constant::Code(code) => write!(f, "{}", code),
        }
    }
}

fn default_name() -> String {
    "<module>".to_string()
}

fn default_filename() -> String {
    "<unknown>".to_string()
}

/// Unidade de código compilada (módulo, função, classe)
///
/// Produzida por um desserializador externo e consumida somente para leitura.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeObject {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_filename")]
    pub filename: String,
    /// Linha do código-fonte da primeira instrução
    pub first_line: LineNumber,
    /// Bytes das instruções (2 bytes por instrução)
    pub code: Vec<u8>,
    pub constants: Vec<Constant>,
    pub names: Vec<String>,
    pub local_names: Vec<String>,
    pub cell_names: Vec<String>,
    pub free_names: Vec<String>,
    /// Tabela de linhas codificada em pares (incremento de byte, incremento de linha)
    pub line_table: Vec<u8>,
}

impl Default for CodeObject {
    fn default() -> Self {
        Self {
            name: default_name(),
            filename: default_filename(),
            first_line: 1,
            code: Vec::new(),
            constants: Vec::new(),
            names: Vec::new(),
            local_names: Vec::new(),
            cell_names: Vec::new(),
            free_names: Vec::new(),
            line_table: Vec::new(),
        }
    }
}

impl CodeObject {
    /// Cria uma unidade vazia com nome e bytecode
    pub fn new(name: impl Into<String>, code: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            code,
            ..Self::default()
        }
    }

    /// Nome de variável de célula ou livre no espaço de índices concatenado
    pub fn cell_or_free_name(&self, index: usize) -> Option<&str> {
        if index < self.cell_names.len() {
            self.cell_names.get(index).map(String::as_str)
        } else {
            self.free_names
                .get(index - self.cell_names.len())
                .map(String::as_str)
        }
    }

    /// Tamanho do espaço de índices de variáveis de célula + livres
    pub fn cell_and_free_len(&self) -> usize {
        self.cell_names.len() + self.free_names.len()
    }
}

impl fmt::Display for CodeObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<code object {}, file \"{}\", line {}>",
            self.name, self.filename, self.first_line
        )
    }
}
