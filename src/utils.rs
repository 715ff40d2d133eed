use crate::traits::{Numeric, Precision};

/// decode little endian bytes holding values of `precision` into floats
///
/// returns `None` if the byte count is not a multiple of the value size
pub(crate) fn le_bytes_to_floats(bytes: &[u8], precision: Precision) -> Option<Vec<f64>> {
    match precision {
        Precision::Float32 => cast_all::<f32>(bytes),
        Precision::Float64 => cast_all::<f64>(bytes),
        Precision::Int32 => cast_all::<i32>(bytes),
        Precision::Int64 => cast_all::<i64>(bytes),
        Precision::UInt8 => cast_all::<u8>(bytes),
    }
}

fn cast_all<NUM: Numeric>(bytes: &[u8]) -> Option<Vec<f64>> {
    if bytes.len() % NUM::SIZE != 0 {
        return None;
    }

    bytes
        .chunks_exact(NUM::SIZE)
        .map(|chunk| num_traits::cast::<NUM, f64>(NUM::from_le_slice(chunk)))
        .collect()
}
