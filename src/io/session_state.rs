use log::warn;

use crate::io::store::StoreError;
use crate::io::substrate::Substrate;
use crate::ops::undo::UndoBuffer;

/// Substrate key holding the pending undo slot for the document under `key`
pub fn undo_key(key: &str) -> String {
    format!("{}.undo", key)
}

/// Read the persisted undo slot. Missing or malformed data reads as empty.
pub fn read_undo<S: Substrate>(substrate: &S, key: &str) -> UndoBuffer {
    let undo_key = undo_key(key);
    let bytes = match substrate.get(&undo_key) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return UndoBuffer::Empty,
        Err(e) => {
            warn!("could not read undo slot key={}: {}", undo_key, e);
            return UndoBuffer::Empty;
        }
    };
    serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        warn!("undo slot is malformed key={}: {}", undo_key, e);
        UndoBuffer::Empty
    })
}

/// Persist the undo slot. An empty slot removes the key.
pub fn write_undo<S: Substrate>(
    substrate: &mut S,
    key: &str,
    undo: &UndoBuffer,
) -> Result<(), StoreError> {
    let undo_key = undo_key(key);
    if undo.is_empty() {
        substrate.remove(&undo_key)?;
        return Ok(());
    }
    let bytes = serde_json::to_vec_pretty(undo)?;
    substrate.set(&undo_key, &bytes)?;
    Ok(())
}
