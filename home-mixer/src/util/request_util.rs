//! Request utilities

use std::time::{SystemTime, UNIX_EPOCH};

/// Builds a per-request id as `"{unix_millis}-{viewer_id}"`, unique enough
/// for log correlation without a coordinating counter.
pub fn generate_request_id(viewer_id: u64) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    format!("{millis}-{viewer_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embeds_the_viewer_id() {
        let id = generate_request_id(42);
        assert!(id.ends_with("-42"));
    }
}
