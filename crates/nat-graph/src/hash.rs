use nat_core::NodeId;

/// Maps a node identifier to a bucket in `[0, capacity)`.
///
/// Uses the MurmurHash3 64-bit finalizer so that runs of small consecutive
/// identifiers land in well separated buckets. `capacity` must be non-zero.
pub fn bucket_index(id: NodeId, capacity: usize) -> usize {
    debug_assert!(capacity > 0);
    (mix64(id.as_raw() as u64) % capacity as u64) as usize
}

fn mix64(mut x: u64) -> u64 {
    x ^= x >> 33;
    x = x.wrapping_mul(0xff51_afd7_ed55_8ccd);
    x ^= x >> 33;
    x = x.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    x ^= x >> 33;
    x
}
