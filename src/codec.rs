// src/codec.rs — store file format
//
// Формат файла (LE), записи подряд, без разделителей и терминатора:
//   u32 key_len | key bytes | u32 value_len | value bytes
//
// Политика:
// - Пустой файл = пустое хранилище.
// - Конец потока ровно на границе записи = нормальный EOF.
// - Конец внутри префикса длины или тела (в т.ч. длина больше остатка) = Invalid.
// - Повтор ключа = Invalid (ни первая, ни последняя версия не выигрывает).
// - Ключи/значения хранятся как есть (сырые байты), без перекодирования.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{DecodeError, KvError, Result};
use crate::store::Store;

/// Size of one length prefix.
pub const LEN_PREFIX: usize = 4;

/// Exact number of bytes `encode` will produce for `store`.
pub fn encoded_len(store: &Store) -> usize {
    store
        .iter()
        .map(|(k, v)| 2 * LEN_PREFIX + k.len() + v.len())
        .sum()
}

/// Encode the whole store. Records follow the store's key order.
pub fn encode(store: &Store) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(encoded_len(store));
    for (k, v) in store.iter() {
        put_field(&mut out, k)?;
        put_field(&mut out, v)?;
    }
    Ok(out)
}

fn put_field(out: &mut Vec<u8>, field: &[u8]) -> Result<()> {
    let len = u32::try_from(field.len()).map_err(|_| KvError::RecordTooLarge { len: field.len() })?;
    let mut prefix = [0u8; LEN_PREFIX];
    LittleEndian::write_u32(&mut prefix, len);
    out.extend_from_slice(&prefix);
    out.extend_from_slice(field);
    Ok(())
}

/// Decode a complete file image. Never returns a partially populated store.
pub fn decode(buf: &[u8]) -> std::result::Result<Store, DecodeError> {
    let mut store = Store::new();
    let mut off = 0usize;
    while off < buf.len() {
        let record_off = off;
        let (key, next) = take_field(buf, off, "key length", "key")?;
        let (val, next) = take_field(buf, next, "value length", "value")?;
        if store.contains_key(key) {
            return Err(DecodeError::DuplicateKey {
                offset: record_off,
                key: key.to_vec(),
            });
        }
        store.insert(key.to_vec(), val.to_vec());
        off = next;
    }
    Ok(store)
}

/// Read `[u32 len][len bytes]` at `off`; returns the body and the offset past it.
fn take_field<'a>(
    buf: &'a [u8],
    off: usize,
    len_what: &'static str,
    body_what: &'static str,
) -> std::result::Result<(&'a [u8], usize), DecodeError> {
    let left = buf.len() - off;
    if left < LEN_PREFIX {
        return Err(DecodeError::Truncated {
            offset: off,
            what: len_what,
            needed: LEN_PREFIX,
            available: left,
        });
    }
    let len = LittleEndian::read_u32(&buf[off..off + LEN_PREFIX]) as usize;

    let body = off + LEN_PREFIX;
    let available = buf.len() - body;
    if len > available {
        return Err(DecodeError::Truncated {
            offset: body,
            what: body_what,
            needed: len,
            available,
        });
    }
    Ok((&buf[body..body + len], body + len))
}
