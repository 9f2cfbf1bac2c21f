use serde::{Deserialize, Serialize};

/// Status value that closes a task; anything else counts as open.
pub const COMPLETED_STATUS: &str = "Completed";

/// Display class for a task's calendar marker.
///
/// The store is free-form about priority labels; anything that is not
/// "high" (case-insensitive) gets the default marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityClass {
    High,
    Med,
}

impl PriorityClass {
    pub fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("high") {
            PriorityClass::High
        } else {
            PriorityClass::Med
        }
    }

    /// CSS class carried by the calendar indicator.
    pub fn css_class(self) -> &'static str {
        match self {
            PriorityClass::High => "indicator-high",
            PriorityClass::Med => "indicator-med",
        }
    }
}

/// A single to-do entry as supplied by the hosting task store.
///
/// Read-only on this side: the store owns creation, mutation and the
/// `/edit` / `/delete` routes. Due dates are taken verbatim; a malformed
/// value flows through as an opaque bucket key rather than an error.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Task {
    /// Store identifier, used to address the external edit/delete routes
    pub id: String,

    /// Short title shown on the calendar
    pub subject: String,

    /// Free-form details (not shown on the grid)
    #[serde(default)]
    pub description: String,

    /// Due date in YYYY-MM-DD format
    pub due_date: String,

    /// Priority label ("High", "Medium", "Low", ...)
    #[serde(default = "default_priority")]
    pub priority: String,

    /// Workflow status; see [`COMPLETED_STATUS`]
    #[serde(default = "default_status")]
    pub status: String,
}

fn default_priority() -> String {
    "Medium".to_string()
}

fn default_status() -> String {
    "Pending".to_string()
}

impl Task {
    pub fn new(id: String, subject: String, due_date: String, priority: String, status: String) -> Self {
        Self {
            id,
            subject,
            description: String::new(),
            due_date,
            priority,
            status,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == COMPLETED_STATUS
    }

    pub fn priority_class(&self) -> PriorityClass {
        PriorityClass::parse(&self.priority)
    }
}

/// Link target for the store's edit route.
pub fn edit_href(id: &str) -> String {
    format!("/edit/{id}")
}

/// Link target for the store's delete route.
pub fn delete_href(id: &str) -> String {
    format!("/delete/{id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_task(priority: &str, status: &str) -> Task {
        Task::new(
            "6740aa".to_string(),
            "Algebra revision".to_string(),
            "2024-06-10".to_string(),
            priority.to_string(),
            status.to_string(),
        )
    }

    #[test]
    fn test_priority_high_case_insensitive() {
        assert_eq!(PriorityClass::parse("High"), PriorityClass::High);
        assert_eq!(PriorityClass::parse("HIGH"), PriorityClass::High);
        assert_eq!(PriorityClass::parse("high"), PriorityClass::High);
    }

    #[test]
    fn test_priority_everything_else_is_med() {
        assert_eq!(PriorityClass::parse("Medium"), PriorityClass::Med);
        assert_eq!(PriorityClass::parse("Low"), PriorityClass::Med);
        assert_eq!(PriorityClass::parse("urgent"), PriorityClass::Med);
        assert_eq!(PriorityClass::parse(""), PriorityClass::Med);
    }

    #[test]
    fn test_priority_css_class() {
        assert_eq!(PriorityClass::High.css_class(), "indicator-high");
        assert_eq!(PriorityClass::Med.css_class(), "indicator-med");
    }

    #[test]
    fn test_is_completed() {
        assert!(make_task("High", "Completed").is_completed());
        assert!(!make_task("High", "Pending").is_completed());
        assert!(!make_task("High", "completed").is_completed());
    }

    #[test]
    fn test_task_priority_class() {
        assert_eq!(make_task("High", "Pending").priority_class(), PriorityClass::High);
        assert_eq!(make_task("Low", "Pending").priority_class(), PriorityClass::Med);
    }

    #[test]
    fn test_route_references() {
        assert_eq!(edit_href("6740aa"), "/edit/6740aa");
        assert_eq!(delete_href("6740aa"), "/delete/6740aa");
    }

    #[test]
    fn test_task_deserialization_defaults() {
        let json = r#"{"id":"1","subject":"Report","due_date":"2024-06-10"}"#;
        let task: Task = serde_json::from_str(json).unwrap();

        assert_eq!(task.priority, "Medium");
        assert_eq!(task.status, "Pending");
        assert!(task.description.is_empty());
    }

    #[test]
    fn test_task_roundtrip_serialization() {
        let original = make_task("High", "Pending");
        let json = serde_json::to_string(&original).unwrap();
        let deserialized: Task = serde_json::from_str(&json).unwrap();

        assert_eq!(original, deserialized);
    }
}
