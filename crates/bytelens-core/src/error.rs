use thiserror::Error;

/// Tabela de metadados consultada durante a resolução de operandos
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Constants,
    Names,
    LocalNames,
    CellAndFreeNames,
    CompareOps,
}

impl std::fmt::Display for TableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableKind::Constants => write!(f, "constants"),
            TableKind::Names => write!(f, "names"),
            TableKind::LocalNames => write!(f, "local_names"),
            TableKind::CellAndFreeNames => write!(f, "cell_names+free_names"),
            TableKind::CompareOps => write!(f, "compare_ops"),
        }
    }
}

/// Erros comuns da biblioteca Bytelens
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Sequência de instruções com tamanho inválido ou operando estendido demais
    #[error("Bytecode malformado em `{unit}` no offset {offset}: {reason}")]
    MalformedStream {
        unit: String,
        offset: usize,
        reason: String,
    },

    /// Operando aponta para além do fim de uma tabela da unidade
    #[error("Índice {index} fora da tabela {table} (tamanho {len}) em `{unit}` no offset {offset}")]
    IndexOutOfRange {
        unit: String,
        offset: usize,
        table: TableKind,
        index: u32,
        len: usize,
    },

    /// Entrada não é uma unidade de código válida
    #[error("Entrada não suportada: {0}")]
    UnsupportedInput(String),

    /// Aninhamento de unidades além do limite configurado
    #[error("Aninhamento excede a profundidade máxima {max_depth} em `{unit}`")]
    NestingTooDeep { unit: String, max_depth: usize },

    /// Erro de decodificação de dados
    #[error("Erro de decodificação: {0}")]
    Decode(String),
}

/// Tipo de resultado usado em toda a biblioteca
pub type Result<T> = std::result::Result<T, Error>;
