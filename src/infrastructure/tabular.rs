//! Delimited-text reading shared by the dataset loader and batch uploads

use csv::{Reader, ReaderBuilder, StringRecord, Trim};

use crate::domain::DomainError;

const CANDIDATE_DELIMITERS: [u8; 3] = [b',', b';', b'\t'];

/// Pick the delimiter that occurs most often in the header line.
///
/// Ties and headers without any candidate fall back to a comma.
pub fn sniff_delimiter(data: &[u8]) -> u8 {
    let header = data
        .split(|b| *b == b'\n')
        .next()
        .unwrap_or_default();

    CANDIDATE_DELIMITERS
        .into_iter()
        .map(|candidate| {
            let count = header.iter().filter(|b| **b == candidate).count();
            (candidate, count)
        })
        .fold((b',', 0), |best, current| if current.1 > best.1 { current } else { best })
        .0
}

/// Build a lenient reader: ragged records are passed through so the caller
/// can reject them one by one
pub fn open_reader(data: &[u8]) -> Reader<&[u8]> {
    ReaderBuilder::new()
        .delimiter(sniff_delimiter(data))
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(data)
}

/// Read the header row, stripping a UTF-8 byte order mark
pub fn read_headers(reader: &mut Reader<&[u8]>) -> Result<Vec<String>, DomainError> {
    let headers = reader
        .headers()
        .map_err(|e| DomainError::schema(format!("Failed to read header row: {}", e)))?;

    if headers.is_empty() || headers.iter().all(str::is_empty) {
        return Err(DomainError::schema("Input has no header row"));
    }

    Ok(headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if i == 0 {
                h.trim_start_matches('\u{feff}').to_string()
            } else {
                h.to_string()
            }
        })
        .collect())
}

/// Owned cells of one record
pub fn record_cells(record: &StringRecord) -> Vec<String> {
    record.iter().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_delimiter() {
        assert_eq!(sniff_delimiter(b"a,b,c\n1,2,3"), b',');
        assert_eq!(sniff_delimiter(b"\"fixed acidity\";\"pH\"\n7.4;3.5"), b';');
        assert_eq!(sniff_delimiter(b"a\tb\tc"), b'\t');
        assert_eq!(sniff_delimiter(b"single"), b',');
        assert_eq!(sniff_delimiter(b""), b',');
    }

    #[test]
    fn test_reader_handles_semicolons_and_bom() {
        let data = "\u{feff}\"fixed acidity\";\"pH\"\n7.4;3.51\n".as_bytes();
        let mut reader = open_reader(data);

        let headers = read_headers(&mut reader).unwrap();
        assert_eq!(headers, vec!["fixed acidity", "pH"]);

        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(record_cells(&record), vec!["7.4", "3.51"]);
    }

    #[test]
    fn test_empty_input_has_no_headers() {
        let mut reader = open_reader(b"");
        assert!(read_headers(&mut reader).is_err());
    }
}
