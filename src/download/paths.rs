use chrono::{DateTime, Local, TimeZone};

/// Clean a filename by removing characters that are invalid on common
/// filesystems: `/`, `\`, `:`, `*`, `?`, `"`, `<`, `>`, `|`.
pub(crate) fn clean_filename(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
        .collect()
}

/// Split a filename at its last dot. Dots that only lead the name never
/// start an extension, so `.bashrc` and `..data` stay whole.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(dot) if name[..dot].chars().any(|c| c != '.') => name.split_at(dot),
        _ => (name, ""),
    }
}

/// Upload timestamp as local wall-clock time, clamping values outside the
/// representable range to the epoch. Fractional seconds are truncated.
pub(crate) fn local_time(timestamp: f64) -> DateTime<Local> {
    Local
        .timestamp_opt(timestamp as i64, 0)
        .single()
        .unwrap_or_else(|| DateTime::from(std::time::UNIX_EPOCH))
}

/// Compose the destination filename for a downloaded file:
/// `<YYYYMMDD_HHMMSS>-<stem>_by_<user><ext>`.
///
/// Upload time plus uploader plus original name is near-unique, and the
/// composition is deterministic, so a re-run recomputes the same path and
/// overwrites in place instead of duplicating.
pub(crate) fn local_filename(uploaded: &DateTime<Local>, original: &str, user: &str) -> String {
    let clean = clean_filename(original);
    let (stem, ext) = split_extension(&clean);
    format!(
        "{}-{}_by_{}{}",
        uploaded.format("%Y%m%d_%H%M%S"),
        stem,
        clean_filename(user),
        ext
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noon() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 1, 12, 30, 5).unwrap()
    }

    #[test]
    fn clean_filename_strips_reserved_characters() {
        assert_eq!(clean_filename("budget: draft?.xls"), "budget draft.xls");
        assert_eq!(clean_filename("a/b\\c*d?e\"f<g>h|i"), "abcdefghi");
        assert_eq!(clean_filename("normal.jpg"), "normal.jpg");
    }

    #[test]
    fn filename_is_timestamp_stem_user_extension() {
        assert_eq!(
            local_filename(&noon(), "report.pdf", "alice"),
            "20240301_123005-report_by_alice.pdf"
        );
    }

    #[test]
    fn only_the_last_extension_moves_to_the_end() {
        assert_eq!(
            local_filename(&noon(), "archive.tar.gz", "bob"),
            "20240301_123005-archive.tar_by_bob.gz"
        );
    }

    #[test]
    fn dotfiles_keep_their_whole_name() {
        assert_eq!(
            local_filename(&noon(), ".bashrc", "carol"),
            "20240301_123005-.bashrc_by_carol"
        );
    }

    #[test]
    fn extensionless_names_get_no_trailing_dot() {
        assert_eq!(
            local_filename(&noon(), "README", "dave"),
            "20240301_123005-README_by_dave"
        );
    }

    #[test]
    fn hostile_names_and_users_are_cleaned() {
        // Separators vanish and the leading dots cannot form an extension.
        assert_eq!(
            local_filename(&noon(), "../../etc/passwd", "eve:|"),
            "20240301_123005-....etcpasswd_by_eve"
        );
    }

    #[test]
    fn local_time_truncates_fractional_seconds() {
        let expected = Local.timestamp_opt(1443295987, 0).unwrap();
        assert_eq!(local_time(1443295987.000004), expected);
        assert_eq!(local_time(1443295987.9), expected);
    }

    #[test]
    fn out_of_range_timestamps_clamp_to_the_epoch() {
        assert_eq!(
            local_time(f64::MAX),
            DateTime::<Local>::from(std::time::UNIX_EPOCH)
        );
    }

    #[test]
    fn composition_is_deterministic() {
        let a = local_filename(&noon(), "pic.png", "frank");
        let b = local_filename(&noon(), "pic.png", "frank");
        assert_eq!(a, b);
    }
}
