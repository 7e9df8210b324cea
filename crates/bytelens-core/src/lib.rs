/*!
 * Bytelens Core
 *
 * Tipos e utilitários compartilhados para a workspace Bytelens
 */

pub mod types;
pub mod traits;
pub mod utils;
pub mod error;

// Re-exportações públicas
pub use error::{Error, Result, TableKind};
pub use types::*;
