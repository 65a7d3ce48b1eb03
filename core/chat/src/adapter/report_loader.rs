//! レポート CSV とシステムプロンプトの読み込み

use crate::domain::Priming;
use common::error::Error;
use common::ports::outbound::FileSystem;
use std::path::Path;

/// CSV を読み、各行をカンマ区切りで連結したテキストにする
pub fn load_report_csv(fs: &dyn FileSystem, path: &Path) -> Result<String, Error> {
    let body = fs.read_to_string(path)?;
    let rows = parse_csv_rows(body.trim_start_matches('\u{feff}'));
    Ok(rows
        .iter()
        .map(|row| row.join(","))
        .collect::<Vec<_>>()
        .join("\n"))
}

/// システムプロンプトをそのまま読む
pub fn load_prompt(fs: &dyn FileSystem, path: &Path) -> Result<String, Error> {
    fs.read_to_string(path)
}

/// プロンプトとレポートから Priming を作る
pub fn load_priming(
    fs: &dyn FileSystem,
    prompt_path: &Path,
    csv_path: &Path,
) -> Result<Priming, Error> {
    let prompt = load_prompt(fs, prompt_path)?;
    let report = load_report_csv(fs, csv_path)?;
    Ok(Priming::new(prompt, report))
}

/// RFC 4180 相当の最小パーサ（引用符・"" エスケープ・引用内改行に対応）
pub fn parse_csv_rows(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            ',' => row.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
            }
            _ => field.push(c),
        }
    }
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::adapter::StdFileSystem;

    #[test]
    fn test_parse_simple_rows() {
        let rows = parse_csv_rows("a,b,c\n1,2,3\n");
        assert_eq!(rows, vec![vec!["a", "b", "c"], vec!["1", "2", "3"]]);
    }

    #[test]
    fn test_parse_quoted_fields() {
        let rows = parse_csv_rows("name,note\r\n\"Fork, bamboo\",\"said \"\"hi\"\"\"\r\n");
        assert_eq!(rows[1], vec!["Fork, bamboo", "said \"hi\""]);
    }

    #[test]
    fn test_parse_no_trailing_newline_and_empty_fields() {
        let rows = parse_csv_rows("a,,c\nx,y,");
        assert_eq!(rows, vec![vec!["a", "", "c"], vec!["x", "y", ""]]);
    }

    #[test]
    fn test_parse_newline_inside_quotes() {
        let rows = parse_csv_rows("\"line1\nline2\",b\n");
        assert_eq!(rows, vec![vec!["line1\nline2", "b"]]);
    }

    #[test]
    fn test_load_priming_from_files() {
        let tmp = tempfile::tempdir().unwrap();
        let csv = tmp.path().join("report.csv");
        let prompt = tmp.path().join("prompt.txt");
        std::fs::write(&csv, "\u{feff}product,units\n\"Spoon, wood\",12\n").unwrap();
        std::fs::write(&prompt, "You are a business analyst.").unwrap();

        let fs = StdFileSystem;
        assert_eq!(
            load_report_csv(&fs, &csv).unwrap(),
            "product,units\nSpoon, wood,12"
        );
        let priming = load_priming(&fs, &prompt, &csv).unwrap();
        let [user, _] = priming.anchor_turns();
        assert!(user.content().starts_with("You are a business analyst.\n\n## Business Report Data:"));
        assert!(user.content().contains("Spoon, wood,12"));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = load_report_csv(&StdFileSystem, &tmp.path().join("none.csv")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
