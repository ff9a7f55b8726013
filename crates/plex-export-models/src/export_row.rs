use serde::{Deserialize, Serialize};

/// Column names Letterboxd expects in an import CSV, in order.
pub const CSV_HEADER: [&str; 6] = [
    "Title",
    "Year",
    "WatchedDate",
    "tmdbID",
    "imdbID",
    "LetterboxdURI",
];

const BOXD_SHORTLINK_BASE: &str = "https://boxd.it/";

/// One row of the Letterboxd import CSV.
///
/// Enrichment fields degrade to empty strings rather than being omitted, so
/// a row always has all six columns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportRow {
    pub title: String,
    pub year: Option<u32>,
    pub watched_date: String,
    pub tmdb_id: String,
    pub imdb_id: String,
    pub letterboxd_uri: String,
}

impl ExportRow {
    /// Render the row as CSV fields, matching [`CSV_HEADER`] order.
    pub fn to_record(&self) -> [String; 6] {
        [
            self.title.clone(),
            self.year.map(|y| y.to_string()).unwrap_or_default(),
            self.watched_date.clone(),
            self.tmdb_id.clone(),
            self.imdb_id.clone(),
            self.letterboxd_uri.clone(),
        ]
    }
}

/// Derive the boxd.it short link from an IMDB id.
///
/// Letterboxd resolves `https://boxd.it/<digits>` where `<digits>` is the
/// IMDB id with its two-letter prefix stripped ("tt1375666" -> "1375666").
/// An empty id yields an empty URI.
pub fn letterboxd_uri(imdb_id: &str) -> String {
    match imdb_id.get(2..) {
        Some(rest) if !rest.is_empty() => format!("{}{}", BOXD_SHORTLINK_BASE, rest),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letterboxd_uri_from_imdb_id() {
        assert_eq!(letterboxd_uri("tt1234567"), "https://boxd.it/1234567");
        assert_eq!(letterboxd_uri("tt1375666"), "https://boxd.it/1375666");
    }

    #[test]
    fn test_letterboxd_uri_empty_id() {
        assert_eq!(letterboxd_uri(""), "");
    }

    #[test]
    fn test_letterboxd_uri_short_id() {
        // Nothing left after the prefix - no link to build
        assert_eq!(letterboxd_uri("tt"), "");
        assert_eq!(letterboxd_uri("t"), "");
    }

    #[test]
    fn test_to_record_populated() {
        let row = ExportRow {
            title: "Inception".to_string(),
            year: Some(2010),
            watched_date: "2021-05-01".to_string(),
            tmdb_id: "27205".to_string(),
            imdb_id: "tt1375666".to_string(),
            letterboxd_uri: letterboxd_uri("tt1375666"),
        };

        assert_eq!(
            row.to_record(),
            [
                "Inception",
                "2010",
                "2021-05-01",
                "27205",
                "tt1375666",
                "https://boxd.it/1375666"
            ]
        );
    }

    #[test]
    fn test_to_record_degraded() {
        let row = ExportRow {
            title: "Ghost Movie".to_string(),
            year: None,
            watched_date: String::new(),
            tmdb_id: String::new(),
            imdb_id: String::new(),
            letterboxd_uri: String::new(),
        };

        assert_eq!(row.to_record(), ["Ghost Movie", "", "", "", "", ""]);
    }
}
