use chrono::{DateTime, Local};

const TIMESTAMP_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

/// Builds the backup file name for a save at `now`.
///
/// The timestamp is human readable; characters that are awkward in file
/// names (`/`, `:` and spaces) become `_`.
pub fn backup_file_name(prefix: &str, now: DateTime<Local>) -> String {
    let stamp = now.format(TIMESTAMP_FORMAT).to_string();
    format!("{prefix}{}.xml", sanitize_stamp(&stamp))
}

fn sanitize_stamp(stamp: &str) -> String {
    stamp.replace(['/', ':', ' '], "_")
}

#[cfg(test)]
mod tests {
    use super::backup_file_name;
    use chrono::{Local, TimeZone};

    #[test]
    fn backup_name_has_no_path_hostile_characters() {
        let now = Local
            .with_ymd_and_hms(2026, 10, 16, 9, 5, 7)
            .single()
            .expect("unambiguous local time");
        let name = backup_file_name("tasks_backup_", now);
        assert_eq!(name, "tasks_backup_10_16_2026_09_05_07.xml");
        assert!(!name.contains('/'));
        assert!(!name.contains(':'));
    }
}
