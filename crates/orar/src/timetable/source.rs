//! Metadata extraction from timetable URLs.

use super::types::UrlMetadata;
use crate::error::OrarError;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

// e.g. /files/orar/2025-1/tabelar/INFO3.html
static PATH_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/orar/(\d{4})-(\d)/tabelar/([^/]+)\.html?$").unwrap()
});
static CODE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(.*?)(\d+)$").unwrap());

/// Derives academic year, semester, specialization and year of study from a URL.
///
/// Pure: the same URL always gives the same metadata.
pub fn extract_url_metadata(url: &str) -> Result<UrlMetadata, OrarError> {
    let source_error = |message: &str| OrarError::SourceFormat {
        url: url.to_string(),
        message: message.to_string(),
    };

    let parsed = Url::parse(url).map_err(|e| source_error(&e.to_string()))?;
    let caps = PATH_REGEX
        .captures(parsed.path())
        .ok_or_else(|| source_error("path does not match /orar/{YEAR}-{SEMESTER}/tabelar/{CODE}.html"))?;

    let start_year: u32 = caps[1]
        .parse()
        .map_err(|_| source_error("invalid academic year"))?;
    let semester: u8 = caps[2]
        .parse()
        .map_err(|_| source_error("invalid semester"))?;
    if !(1..=2).contains(&semester) {
        return Err(source_error("semester must be 1 or 2"));
    }

    let code = &caps[3];
    let code_caps = CODE_REGEX
        .captures(code)
        .ok_or_else(|| source_error("timetable code has no year of study"))?;
    let specialization = code_caps[1].to_string();
    if specialization.is_empty() {
        return Err(source_error("timetable code has no specialization"));
    }
    let year_of_study: u8 = code_caps[2]
        .parse()
        .map_err(|_| source_error("invalid year of study"))?;

    Ok(UrlMetadata {
        academic_year: format!("{}-{}", start_year, start_year + 1),
        semester,
        specialization,
        year_of_study,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://www.cs.ubbcluj.ro/files/orar/2025-1/tabelar/INFO3.html";

    #[test]
    fn test_extracts_metadata() {
        let meta = extract_url_metadata(URL).unwrap();
        assert_eq!(meta.academic_year, "2025-2026");
        assert_eq!(meta.semester, 1);
        assert_eq!(meta.specialization, "INFO");
        assert_eq!(meta.year_of_study, 3);
        assert_eq!(meta.default_group(), "INFO3");
    }

    #[test]
    fn test_extraction_is_pure() {
        assert_eq!(extract_url_metadata(URL).unwrap(), extract_url_metadata(URL).unwrap());
    }

    #[test]
    fn test_second_semester_multi_letter_code() {
        let meta =
            extract_url_metadata("https://www.cs.ubbcluj.ro/files/orar/2024-2/tabelar/MIE12.html")
                .unwrap();
        assert_eq!(meta.academic_year, "2024-2025");
        assert_eq!(meta.semester, 2);
        assert_eq!(meta.specialization, "MIE");
        assert_eq!(meta.year_of_study, 12);
    }

    #[test]
    fn test_rejects_foreign_urls() {
        for url in [
            "https://www.cs.ubbcluj.ro/files/orar/2025-1/grafic/INFO3.html",
            "https://www.cs.ubbcluj.ro/files/orar/2025-3/tabelar/INFO3.html",
            "https://www.cs.ubbcluj.ro/files/orar/2025-1/tabelar/INFO.html",
            "https://www.cs.ubbcluj.ro/files/orar/2025-1/tabelar/3.html",
            "orar/2025-1/tabelar/INFO3.html",
        ] {
            let err = extract_url_metadata(url).unwrap_err();
            assert!(matches!(err, OrarError::SourceFormat { .. }), "{url}");
        }
    }
}
