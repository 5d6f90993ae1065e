/// Cross-platform notification support
/// Currently only implements macOS notifications

#[cfg(target_os = "macos")]
use std::process::Command;

/// Send a notification when a subtask's scheduled time is approaching
pub fn notify_reminder(subtask_title: &str, minutes_left: i64) {
    #[cfg(target_os = "macos")]
    {
        let script = format!(
            r#"display notification "'{}' is coming up in {} min" with title "Taskdeck - Reminder""#,
            subtask_title.replace('"', "\\\""),
            minutes_left
        );

        let _ = Command::new("osascript")
            .arg("-e")
            .arg(&script)
            .output();
    }

    #[cfg(not(target_os = "macos"))]
    {
        // No-op on other platforms; the in-app toast still shows
        let _ = (subtask_title, minutes_left);
    }
}
