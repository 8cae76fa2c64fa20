use super::types::TaskStatus;

impl TaskStatus {
    /// Whether moving from `self` to `dst` follows the expected lifecycle.
    /// Writing the same status again counts as valid.
    pub fn can_transition_to(&self, dst: &TaskStatus) -> bool {
        let valid_states: &[TaskStatus] = match self {
            TaskStatus::Pending => &[
                TaskStatus::Pending,
                TaskStatus::Running,
                TaskStatus::Terminated,
            ],
            TaskStatus::Running => &[TaskStatus::Running, TaskStatus::Terminated],
            TaskStatus::Terminated => &[TaskStatus::Terminated],
        };

        valid_states.contains(dst)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Terminated)
    }
}
