//! Wraparound index arithmetic shared by the network list and the key grid.

/// Move `index` one slot in the direction of `delta` inside `0..len`,
/// wrapping at both ends. Only the sign of `delta` matters.
///
/// An empty range always yields 0.
pub fn wrap_step(index: usize, delta: i8, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    match delta.signum() {
        -1 => (index % len + len - 1) % len,
        1 => (index + 1) % len,
        _ => index,
    }
}
