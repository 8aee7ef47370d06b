/// Cut `reply` to `max_chars` characters and append `marker` when it is
/// longer than that. Counts `char`s, so multi-byte text never splits.
pub fn truncate_reply(reply: &str, max_chars: usize, marker: &str) -> String {
    match reply.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => {
            let mut out = String::with_capacity(byte_idx + marker.len());
            out.push_str(&reply[..byte_idx]);
            out.push_str(marker);
            out
        }
        None => reply.to_string(),
    }
}
