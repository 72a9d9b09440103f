/// App-level view state
#[derive(Clone, Debug, PartialEq)]
pub enum AppView {
    Status,                     // single-stack status view
    Grid,                       // all-stacks card grid
    MemberLogs(String, String), // (container_id, container_name)
}

/// Selection within the current list (members in the status view, cards in the grid).
#[derive(Clone, Debug, Default)]
pub struct SelectionState {
    pub selected_index: usize,
    pub total_rows: usize,
}

impl SelectionState {
    /// Keep the selection in range after the list changed.
    pub fn set_total(&mut self, total: usize) {
        self.total_rows = total;
        if self.selected_index >= total {
            self.selected_index = total.saturating_sub(1);
        }
    }

    pub fn move_by(&mut self, delta: isize) -> bool {
        if self.total_rows == 0 {
            return false;
        }
        let next = self
            .selected_index
            .saturating_add_signed(delta)
            .min(self.total_rows - 1);
        let moved = next != self.selected_index;
        self.selected_index = next;
        moved
    }
}
