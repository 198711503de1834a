//! JSON output formatting

use std::io;

use crate::scanner::ScanReport;

pub fn to_json(reports: &[ScanReport]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(reports)
}

/// Print scan reports as a pretty-printed JSON array to stdout.
pub fn print_json(reports: &[ScanReport]) -> io::Result<()> {
    let json = to_json(reports).map_err(io::Error::other)?;
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::Buckets;
    use std::path::PathBuf;

    #[test]
    fn test_report_shape() {
        let report = ScanReport {
            basedir: PathBuf::from("/tmp/base"),
            everything_included: false,
            files: Buckets {
                included: vec!["a.txt".to_string()],
                excluded: vec!["b.log".to_string()],
                ..Default::default()
            },
            directories: Buckets::default(),
        };

        let json = to_json(&[report]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["basedir"], "/tmp/base");
        assert_eq!(value[0]["everything_included"], false);
        assert_eq!(value[0]["files"]["included"][0], "a.txt");
        assert_eq!(value[0]["files"]["excluded"][0], "b.log");
        assert!(value[0]["directories"]["not_included"].as_array().unwrap().is_empty());
    }
}
