use comfy_table::{presets, Table};

pub fn create_table(headers: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL);
    table.set_header(headers);
    table
}

/// Marker shown next to the store's active profile.
pub fn active_marker(active: Option<&str>, name: &str) -> &'static str {
    if active == Some(name) {
        "✓"
    } else {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_marker() {
        assert_eq!(active_marker(Some("work"), "work"), "✓");
        assert_eq!(active_marker(Some("work"), "home"), "");
        assert_eq!(active_marker(None, "work"), "");
    }
}
