/// Placeholder shown when a log fetch returns nothing visible.
pub const NO_LOGS: &str = "No logs available";

// --- Log viewer state ---

pub struct LogViewState {
    pub container_id: String,
    pub container_name: String,
    pub lines: Vec<String>,
    pub scroll_offset: usize, // 0 = at bottom (following)
    pub auto_follow: bool,
    pub search_mode: bool,    // true when typing a search query
    pub search_query: String, // current search text
    pub fetched_at: Option<String>,
}

impl LogViewState {
    pub fn new(container_id: String, container_name: String) -> Self {
        Self {
            container_id,
            container_name,
            lines: Vec::new(),
            scroll_offset: 0,
            auto_follow: true,
            search_mode: false,
            search_query: String::new(),
            fetched_at: None,
        }
    }

    /// Replace the buffer with a freshly fetched tail.
    pub fn replace(&mut self, text: &str, fetched_at: String) {
        self.lines = text.lines().map(str::to_string).collect();
        let max_offset = self.lines.len().saturating_sub(1);
        if self.scroll_offset > max_offset {
            self.scroll_offset = max_offset;
        }
        self.fetched_at = Some(fetched_at);
    }

    /// Lines matching the current search (all lines when no search).
    pub fn visible_lines(&self) -> Vec<&String> {
        if self.search_query.is_empty() {
            return self.lines.iter().collect();
        }
        let query = self.search_query.to_lowercase();
        self.lines
            .iter()
            .filter(|l| l.to_lowercase().contains(&query))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_clamps_scroll_offset() {
        let mut state = LogViewState::new("abc123".into(), "web".into());
        state.scroll_offset = 50;
        state.replace("one\ntwo\nthree", "12:00:00".into());
        assert_eq!(state.lines.len(), 3);
        assert_eq!(state.scroll_offset, 2);
        assert_eq!(state.fetched_at.as_deref(), Some("12:00:00"));
    }

    #[test]
    fn visible_lines_filters_case_insensitively() {
        let mut state = LogViewState::new("abc123".into(), "web".into());
        state.replace("GET /health\nERROR boom\nerror again", "t".into());
        state.search_query = "error".into();
        let lines = state.visible_lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "ERROR boom");
    }
}
