/*!
 * Bytelens Traits
 *
 * Traits comuns usados nas fronteiras da workspace Bytelens
 */

use crate::error::Result;
use crate::types::CodeObject;

/// Trait para desserializadores de unidades de código
///
/// Recebe os bytes já sem o cabeçalho do contêiner.
pub trait CodeDeserializer {
    /// Converte bytes em uma unidade de código
    fn deserialize(&self, bytes: &[u8]) -> Result<CodeObject>;
}

impl<D: CodeDeserializer + ?Sized> CodeDeserializer for &D {
    fn deserialize(&self, bytes: &[u8]) -> Result<CodeObject> {
        (**self).deserialize(bytes)
    }
}
